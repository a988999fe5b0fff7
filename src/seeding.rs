//! k-means++ with medoid refinement.
//!
//! Centers are seeded by D² sampling: the first proportional to weight, each
//! later one proportional to `w * d(x, C)^2`. Points are opaque, so the Lloyd
//! step moves each center to the member of its cluster, or keeps the center
//! itself, that minimizes the weighted distance to the rest of the cluster.
use super::*;
use rand::SeedableRng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::SmallRng;

/// k-means++ seeding followed by a fixed number of refinement rounds.
///
/// Each call draws from a fresh generator seeded with `seed`, so the answer is
/// a function of the input alone.
#[derive(Debug, Clone, Copy)]
pub struct KMeansPlusPlus {
    iterations: usize,
    seed: u64,
}

impl KMeansPlusPlus {
    pub fn new(iterations: usize, seed: u64) -> Self {
        Self { iterations, seed }
    }

    /// D² seeding order of the first `k` centers.
    pub fn seeding<P, M>(&self, metric: &M, points: &[Weighted<'_, P>], k: usize) -> Vec<usize>
    where
        P: Point,
        M: Metric<P>,
    {
        let ref mut rng = SmallRng::seed_from_u64(self.seed);
        let n = points.len();
        let mut nearest = vec![Energy::INFINITY; n];
        let mut chosen = vec![false; n];
        let mut centers = Vec::with_capacity(k.min(n));
        while centers.len() < k.min(n) {
            let mass = (0..n)
                .map(|i| match (chosen[i], nearest[i].is_finite()) {
                    (true, _) => 0.,
                    (false, false) => points[i].1,
                    (false, true) => points[i].1 * nearest[i] * nearest[i],
                })
                .collect::<Vec<Energy>>();
            let next = match WeightedIndex::new(&mass) {
                Ok(distribution) => distribution.sample(rng),
                Err(_) => match (0..n).find(|&i| !chosen[i]) {
                    Some(i) => i,
                    None => break,
                },
            };
            chosen[next] = true;
            centers.push(next);
            let ref center = points[next].0;
            for (j, (x, _)) in points.iter().enumerate() {
                nearest[j] = nearest[j].min(metric.distance(x, center));
            }
        }
        centers
    }

    /// One assignment and medoid update. Centers stay distinct.
    fn refine<P, M>(&self, metric: &M, points: &[Weighted<'_, P>], centers: &[usize]) -> Vec<usize>
    where
        P: Point,
        M: Metric<P>,
    {
        use rayon::iter::IntoParallelRefIterator;
        use rayon::iter::ParallelIterator;
        let owners = points
            .par_iter()
            .map(|(x, _)| {
                centers
                    .iter()
                    .map(|&c| metric.distance(x, points[c].0))
                    .enumerate()
                    .fold((0, Energy::INFINITY), |(j, d), (i, e)| match e < d {
                        true => (i, e),
                        false => (j, d),
                    })
                    .0
            })
            .collect::<Vec<usize>>();
        let mut clusters = vec![Vec::new(); centers.len()];
        for (i, owner) in owners.into_iter().enumerate() {
            clusters[owner].push(i);
        }
        let mut taken = vec![false; points.len()];
        let mut next = Vec::with_capacity(centers.len());
        for (&center, members) in centers.iter().zip(clusters.iter()) {
            let spread = |c: usize| {
                members
                    .iter()
                    .map(|&m| points[m].1 * metric.distance(points[m].0, points[c].0))
                    .sum::<Energy>()
            };
            let medoid = std::iter::once(center)
                .chain(members.iter().copied())
                .filter(|&c| !taken[c])
                .map(|c| (c, spread(c)))
                .fold(None, |best, (c, s)| match best {
                    Some((_, b)) if b <= s => best,
                    _ => Some((c, s)),
                })
                .map_or(center, |(c, _)| c);
            taken[medoid] = true;
            next.push(medoid);
        }
        next
    }
}

impl Default for KMeansPlusPlus {
    fn default() -> Self {
        Self::new(KMEANS_ITERATIONS, DEFAULT_SEED)
    }
}

impl Estimator for KMeansPlusPlus {
    fn estimate<P, M>(
        &self,
        metric: &M,
        points: &[Weighted<'_, P>],
        k: usize,
    ) -> Result<Estimate, ClusterError>
    where
        P: Point,
        M: Metric<P>,
    {
        admissible(points, k)?;
        if points.len() <= k {
            return Ok(Estimate {
                medians: (0..points.len()).collect(),
                cost: 0.,
            });
        }
        let mut medians = self.seeding(metric, points, k);
        for _ in 0..self.iterations {
            medians = self.refine(metric, points, &medians);
        }
        let cost = evaluate(metric, points, &medians);
        log::trace!("{:<32}{:>8}{:>12.4}", "kmeans++", medians.len(), cost);
        Ok(Estimate { medians, cost })
    }
}
