use super::*;
use rand::Rng;

/// Draws `min(amount, keys.len())` keys uniformly at random without replacement.
pub fn sample<R>(rng: &mut R, keys: &[Key], amount: usize) -> Vec<Key>
where
    R: Rng + ?Sized,
{
    let amount = amount.min(keys.len());
    rand::seq::index::sample(rng, keys.len(), amount)
        .into_iter()
        .map(|i| keys[i])
        .collect()
}
