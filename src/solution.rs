use super::*;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Cached approximate solution of one layer.
///
/// Facilities are chosen by the static estimator on the layer's sample; every
/// member of the layer is then assigned to its nearest facility. The cost is
/// the sum of those assignment distances and is kept current as members come
/// and go between rebuilds.
#[derive(Debug, Clone, Default)]
pub struct Solution {
    facilities: Vec<Key>,
    weights: Vec<usize>,
    members: BTreeMap<Key, Neighbor>,
    cost: Energy,
}

impl Solution {
    /// Estimates facilities on `sample` and assigns every key in `members`.
    pub fn fit<P, M, E>(
        space: &Space<P>,
        metric: &M,
        estimator: &E,
        sample: &[Key],
        members: &BTreeSet<Key>,
        k: usize,
    ) -> Result<Self, ClusterError>
    where
        P: Point,
        M: Metric<P>,
        E: Estimator,
    {
        use rayon::iter::IntoParallelIterator;
        use rayon::iter::ParallelIterator;
        let points = sample
            .iter()
            .map(|&key| (space.point(key), 1.))
            .collect::<Vec<Weighted<'_, P>>>();
        let estimate = estimator.estimate(metric, &points, k)?;
        let facilities = estimate
            .medians
            .iter()
            .map(|&i| sample[i])
            .collect::<Vec<Key>>();
        let mut solution = Self {
            weights: vec![0; facilities.len()],
            facilities,
            members: BTreeMap::new(),
            cost: 0.,
        };
        let assigned = members
            .iter()
            .copied()
            .collect::<Vec<Key>>()
            .into_par_iter()
            .map(|key| (key, solution.nearest(space, metric, space.point(key))))
            .collect::<Vec<(Key, Neighbor)>>();
        for (key, neighbor) in assigned {
            solution.admit(key, neighbor);
        }
        Ok(solution)
    }

    pub fn cost(&self) -> Energy {
        self.cost
    }
    pub fn facilities(&self) -> &[Key] {
        &self.facilities
    }
    pub fn weights(&self) -> &[usize] {
        &self.weights
    }
    pub fn len(&self) -> usize {
        self.members.len()
    }
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
    pub fn is_facility(&self, key: Key) -> bool {
        self.facilities.contains(&key)
    }
    pub fn neighbor(&self, key: Key) -> Option<Neighbor> {
        self.members.get(&key).copied()
    }

    /// Facilities paired with the number of members they serve.
    pub fn coreset(&self) -> impl Iterator<Item = (Key, usize)> + '_ {
        self.facilities
            .iter()
            .copied()
            .zip(self.weights.iter().copied())
            .filter(|(_, w)| *w > 0)
    }

    /// Nearest facility to `point`.
    pub fn nearest<P, M>(&self, space: &Space<P>, metric: &M, point: &P) -> Neighbor
    where
        P: Point,
        M: Metric<P>,
    {
        self.facilities
            .iter()
            .map(|&f| metric.distance(point, space.point(f)))
            .enumerate()
            .fold((0, Energy::INFINITY), |(j, d), (i, x)| match x < d {
                true => (i, x),
                false => (j, d),
            })
    }

    /// Assigns a new member to its nearest facility.
    pub fn assign<P, M>(&mut self, space: &Space<P>, metric: &M, key: Key)
    where
        P: Point,
        M: Metric<P>,
    {
        let neighbor = self.nearest(space, metric, space.point(key));
        self.admit(key, neighbor);
    }

    /// Removes a member's contribution.
    pub fn unassign(&mut self, key: Key) -> Option<Neighbor> {
        let (j, d) = self.members.remove(&key)?;
        self.weights[j] -= 1;
        self.cost = (self.cost - d).max(0.);
        Some((j, d))
    }

    fn admit(&mut self, key: Key, (j, d): Neighbor) {
        self.weights[j] += 1;
        self.cost += d;
        self.members.insert(key, (j, d));
    }
}
