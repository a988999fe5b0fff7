use super::*;

/// A point paired with the multiplicity it stands for.
pub type Weighted<'a, P> = (&'a P, Energy);

/// Output of a static estimator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Estimate {
    /// Indices into the estimator's input, in selection order.
    pub medians: Vec<usize>,
    /// Weighted sum of distances from each input point to its nearest median.
    pub cost: Energy,
}

/// Static k-median subroutine invoked on small sampled subsets.
///
/// Implementations must be deterministic for a given input so that seeded runs
/// reproduce. Empty input and `k == 0` are rejected with
/// [`ClusterError::Estimator`].
pub trait Estimator: Sync {
    fn estimate<P, M>(
        &self,
        metric: &M,
        points: &[Weighted<'_, P>],
        k: usize,
    ) -> Result<Estimate, ClusterError>
    where
        P: Point,
        M: Metric<P>;
}

/// Rejects inputs no estimator can cluster.
pub fn admissible<P>(points: &[Weighted<'_, P>], k: usize) -> Result<(), ClusterError> {
    if points.is_empty() {
        return Err(ClusterError::Estimator("empty point set".into()));
    }
    if k == 0 {
        return Err(ClusterError::Estimator("k must be positive".into()));
    }
    Ok(())
}

/// Weighted cost of serving `points` from `medians`.
pub fn evaluate<P, M>(metric: &M, points: &[Weighted<'_, P>], medians: &[usize]) -> Energy
where
    P: Point,
    M: Metric<P>,
{
    use rayon::iter::IntoParallelRefIterator;
    use rayon::iter::ParallelIterator;
    points
        .par_iter()
        .map(|(x, w)| {
            medians
                .iter()
                .map(|&j| metric.distance(x, points[j].0))
                .fold(Energy::INFINITY, Energy::min)
                * w
        })
        .sum()
}
