//! Mettu-Plaxton online median.
//!
//! Medians are chosen one at a time. The next median is the point whose
//! isolated ball carries the most value, where the value of `B(x, r)` is
//! `sum_{y in B(x, r)} w_y (r - d(x, y))` and the isolation radius of `x` is
//! its distance to the medians chosen so far, divided by [`MP_GAMMA`]. Before
//! any median exists the radius is the distance to the farthest point.
//!
//! Because selection never revisits earlier choices, the answer for `k` is a
//! prefix of the answer for `k + 1`, so cost is non-increasing in `k`.
use super::*;

/// Mettu-Plaxton online median estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnlineMedian;

/// Distances from one center to every input point, sorted, with running
/// sums of weight and weighted distance for O(log n) ball values.
struct Ball {
    distances: Vec<Energy>,
    mass: Vec<Energy>,
    moment: Vec<Energy>,
}

impl Ball {
    fn new<P, M>(metric: &M, points: &[Weighted<'_, P>], center: &P) -> Self
    where
        P: Point,
        M: Metric<P>,
    {
        let mut pairs = points
            .iter()
            .map(|(x, w)| (metric.distance(center, x), *w))
            .collect::<Vec<(Energy, Energy)>>();
        pairs.sort_by(|(a, _), (b, _)| a.total_cmp(b));
        let mut mass = Vec::with_capacity(pairs.len());
        let mut moment = Vec::with_capacity(pairs.len());
        let (mut m, mut d) = (0., 0.);
        for (distance, weight) in pairs.iter() {
            m += weight;
            d += weight * distance;
            mass.push(m);
            moment.push(d);
        }
        Self {
            distances: pairs.into_iter().map(|(d, _)| d).collect(),
            mass,
            moment,
        }
    }

    /// Distance to the farthest point.
    fn radius(&self) -> Energy {
        self.distances.last().copied().unwrap_or(0.)
    }

    /// Value of the ball of radius `r` around this center.
    fn value(&self, r: Energy) -> Energy {
        match self.distances.partition_point(|d| *d <= r) {
            0 => 0.,
            c => r * self.mass[c - 1] - self.moment[c - 1],
        }
    }
}

impl OnlineMedian {
    /// Selection order of the first `k` medians, plus each point's distance
    /// to its nearest selected median.
    pub fn order<P, M>(
        &self,
        metric: &M,
        points: &[Weighted<'_, P>],
        k: usize,
    ) -> (Vec<usize>, Vec<Energy>)
    where
        P: Point,
        M: Metric<P>,
    {
        use rayon::iter::IntoParallelRefIterator;
        use rayon::iter::ParallelIterator;
        let n = points.len();
        let balls = points
            .par_iter()
            .map(|(x, _)| Ball::new(metric, points, x))
            .collect::<Vec<Ball>>();
        let mut nearest = vec![Energy::INFINITY; n];
        let mut chosen = vec![false; n];
        let mut medians = Vec::with_capacity(k.min(n));
        while medians.len() < k.min(n) {
            let first = medians.is_empty();
            let next = (0..n)
                .filter(|&i| !chosen[i])
                .map(|i| match first {
                    true => (i, balls[i].value(balls[i].radius())),
                    false => (i, balls[i].value(nearest[i] / MP_GAMMA)),
                })
                // ties go to the later ball
                .fold(None, |best, (i, v)| match best {
                    Some((_, b)) if b > v => best,
                    _ => Some((i, v)),
                });
            let Some((i, _)) = next else { break };
            chosen[i] = true;
            medians.push(i);
            let ref center = points[i].0;
            for (j, (x, _)) in points.iter().enumerate() {
                nearest[j] = nearest[j].min(metric.distance(x, center));
            }
        }
        (medians, nearest)
    }
}

impl Estimator for OnlineMedian {
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
        let (medians, nearest) = self.order(metric, points, k);
        let cost = nearest
            .iter()
            .zip(points)
            .map(|(d, (_, w))| d * w)
            .sum::<Energy>();
        log::trace!("{:<32}{:>8}{:>12.4}", "online median", medians.len(), cost);
        Ok(Estimate { medians, cost })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(xs: &[Energy]) -> Vec<Weighted<'_, Energy>> {
        xs.iter().map(|x| (x, 1.)).collect()
    }

    #[test]
    fn separates_two_pairs() {
        let xs = [0., 1., 10., 11.];
        let ref points = unit(&xs);
        let estimate = OnlineMedian.estimate(&Absolute, points, 2).unwrap();
        assert_eq!(estimate.medians.len(), 2);
        assert!((estimate.cost - 2.).abs() < 1e-5);
        let a = xs[estimate.medians[0]];
        let b = xs[estimate.medians[1]];
        assert!((a < 5.) != (b < 5.), "both medians on one side: {} {}", a, b);
    }

    #[test]
    fn prefixes_are_nested() {
        use rand::Rng;
        use rand::SeedableRng;
        let ref mut rng = rand::rngs::SmallRng::seed_from_u64(7);
        let xs = (0..64)
            .map(|_| rng.random_range(0. ..100.))
            .collect::<Vec<Energy>>();
        let ref points = unit(&xs);
        let (long, _) = OnlineMedian.order(&Absolute, points, 8);
        for k in 1..8 {
            let (short, _) = OnlineMedian.order(&Absolute, points, k);
            assert_eq!(short[..], long[..k]);
        }
    }

    #[test]
    fn cost_non_increasing_in_k() {
        use rand::Rng;
        use rand::SeedableRng;
        let ref mut rng = rand::rngs::SmallRng::seed_from_u64(11);
        let xs = (0..48)
            .map(|_| rng.random_range(-50. ..50.))
            .collect::<Vec<Energy>>();
        let points = xs
            .iter()
            .map(|x| (x, rng.random_range(1. ..4.)))
            .collect::<Vec<Weighted<'_, Energy>>>();
        let costs = (1..=12)
            .map(|k| OnlineMedian.estimate(&Absolute, &points, k).unwrap().cost)
            .collect::<Vec<_>>();
        for w in costs.windows(2) {
            assert!(w[1] <= w[0] + 1e-4, "cost increased: {} -> {}", w[0], w[1]);
        }
    }

    #[test]
    fn ties_pick_the_later_ball() {
        let xs = [0., 10.];
        let (medians, _) = OnlineMedian.order(&Absolute, &unit(&xs), 1);
        assert_eq!(medians, vec![1]);
    }

    #[test]
    fn small_inputs_open_every_point() {
        let xs = [3., 9.];
        let estimate = OnlineMedian.estimate(&Absolute, &unit(&xs), 5).unwrap();
        assert_eq!(estimate.medians.len(), 2);
        assert_eq!(estimate.cost, 0.);
    }

    #[test]
    fn rejects_empty_input() {
        let xs: [Energy; 0] = [];
        assert!(OnlineMedian.estimate(&Absolute, &unit(&xs), 2).is_err());
    }
}
