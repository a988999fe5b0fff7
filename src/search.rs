use super::*;

/// Single-swap local search for weighted k-median (Arya et al.).
///
/// Starts from the [`OnlineMedian`] answer and repeatedly accepts the first
/// swap of one median for one non-median that lowers cost by more than a
/// factor of `epsilon / k`, until no such swap exists or the swap budget runs out.
#[derive(Debug, Clone, Copy)]
pub struct LocalSearch {
    epsilon: Energy,
    iterations: usize,
}

impl LocalSearch {
    pub fn new(epsilon: Energy, iterations: usize) -> Self {
        Self {
            epsilon,
            iterations,
        }
    }

    /// Cost of `medians` against a precomputed distance matrix.
    fn cost(table: &[Vec<Energy>], weights: &[Energy], medians: &[usize]) -> Energy {
        table
            .iter()
            .zip(weights)
            .map(|(row, w)| {
                medians
                    .iter()
                    .map(|&j| row[j])
                    .fold(Energy::INFINITY, Energy::min)
                    * w
            })
            .sum()
    }

    /// First improving swap, if any.
    fn swap(
        &self,
        table: &[Vec<Energy>],
        weights: &[Energy],
        medians: &[usize],
        cost: Energy,
    ) -> Option<(Vec<usize>, Energy)> {
        let threshold = cost * (1. - self.epsilon / medians.len() as Energy);
        for out in 0..medians.len() {
            for candidate in (0..table.len()).filter(|c| !medians.contains(c)) {
                let mut trial = medians.to_vec();
                trial[out] = candidate;
                let next = Self::cost(table, weights, &trial);
                if next < threshold {
                    return Some((trial, next));
                }
            }
        }
        None
    }
}

impl Default for LocalSearch {
    fn default() -> Self {
        Self::new(LOCAL_SEARCH_EPSILON, LOCAL_SEARCH_ITERATIONS)
    }
}

impl Estimator for LocalSearch {
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
        use rayon::iter::IntoParallelRefIterator;
        use rayon::iter::ParallelIterator;
        let seed = OnlineMedian.estimate(metric, points, k)?;
        if seed.medians.len() == points.len() {
            return Ok(seed);
        }
        let table = points
            .par_iter()
            .map(|(x, _)| points.iter().map(|(y, _)| metric.distance(x, y)).collect())
            .collect::<Vec<Vec<Energy>>>();
        let weights = points.iter().map(|(_, w)| *w).collect::<Vec<Energy>>();
        let mut medians = seed.medians;
        let mut cost = Self::cost(&table, &weights, &medians);
        for i in 0..self.iterations {
            match self.swap(&table, &weights, &medians, cost) {
                Some((next, c)) => {
                    medians = next;
                    cost = c;
                }
                None => {
                    log::trace!("{:<32}{:>8}{:>12.4}", "local search stable", i, cost);
                    break;
                }
            }
        }
        Ok(Estimate { medians, cost })
    }
}
