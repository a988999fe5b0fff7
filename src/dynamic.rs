//! Dynamic Mettu-Plaxton structure.
//!
//! Live points are partitioned into layers by age. Level 0 takes every
//! insertion; when level `i` outgrows `floor(beta * s * 2^i)` its newest
//! `s * 2^i` points stay and the rest cascade into level `i + 1`. Deletions
//! that starve an intermediate level merge it with the level above, and an
//! emptied top level is destroyed, so depth stays logarithmic in the number
//! of live points. Each layer answers cost queries from a cache fitted on a
//! sample of `s = floor(alpha * k)` of its points, so a rebuild touches only
//! the layers whose size window was crossed.
use super::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::cell::Cell;
use std::time::Duration;
use std::time::Instant;

/// Approximate k-median clustering under insertions and deletions.
///
/// Single-threaded: every call runs to completion, including any rebuild it
/// triggers. Callers sharing an instance across threads must serialize access.
pub struct DynamicMP<P, M, E = OnlineMedian> {
    params: Parameters,
    metric: M,
    estimator: E,
    space: Space<P>,
    layers: Vec<Layer>,
    rng: SmallRng,
    stats: Stats,
    queries: Cell<usize>,
    query_time: Cell<Duration>,
}

impl<P, M> DynamicMP<P, M, OnlineMedian>
where
    P: Point,
    M: Metric<P>,
{
    pub fn new(params: Parameters, metric: M) -> Result<Self, ClusterError> {
        Self::with_estimator(params, metric, OnlineMedian)
    }
}

impl<P, M, E> DynamicMP<P, M, E>
where
    P: Point,
    M: Metric<P>,
    E: Estimator,
{
    pub fn with_estimator(params: Parameters, metric: M, estimator: E) -> Result<Self, ClusterError> {
        params.validate()?;
        let samples = params.samples();
        let bottom = Layer::empty(0, Bounds::new(samples, params.beta, 0, true), samples);
        log::debug!(
            "{:<32}k={} alpha={} beta={} samples={}",
            "dynamic mp",
            params.k,
            params.alpha,
            params.beta,
            samples
        );
        Ok(Self {
            rng: SmallRng::seed_from_u64(params.seed),
            params,
            metric,
            estimator,
            space: Space::default(),
            layers: vec![bottom],
            stats: Stats::default(),
            queries: Cell::new(0),
            query_time: Cell::new(Duration::ZERO),
        })
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }
    pub fn metric(&self) -> &M {
        &self.metric
    }
    pub fn estimator(&self) -> &E {
        &self.estimator
    }
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
    /// Number of layers.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }
    /// Total live points, summed over layers.
    pub fn size(&self) -> usize {
        self.layers.iter().map(Layer::len).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.space.is_empty()
    }
    pub fn contains(&self, key: Key) -> bool {
        self.space.contains(key)
    }
    pub fn point(&self, key: Key) -> Option<&P> {
        self.space.get(key)
    }
    /// Level currently holding `key`.
    pub fn owner(&self, key: Key) -> Option<usize> {
        match self.space.contains(key) {
            true => self.layers.iter().position(|layer| layer.contains(key)),
            false => None,
        }
    }
    pub fn stats(&self) -> Stats {
        Stats {
            queries: self.queries.get(),
            query_time: self.query_time.get(),
            ..self.stats
        }
    }

    /// Adds a point under a fresh key. Fails with [`ClusterError::Duplicate`]
    /// if the key is live.
    ///
    /// An estimator failure after the point is stored still leaves it live
    /// and counted; the affected layers stay unsettled until [`Self::repair`]
    /// succeeds, which every later update attempts first.
    pub fn insert(&mut self, key: Key, point: P) -> Result<(), ClusterError> {
        let start = Instant::now();
        let fresh = !self.space.contains(key);
        let result = self.place(key, point);
        self.stats.update_time += start.elapsed();
        if fresh && self.space.contains(key) {
            self.stats.inserts += 1;
        }
        result
    }

    /// Removes a point and hands it back. Fails with
    /// [`ClusterError::NotFound`] if the key is not live.
    ///
    /// If the repair after removal fails, the point is already gone: it is
    /// dropped, counted as deleted, and the error is returned instead.
    pub fn delete(&mut self, key: Key) -> Result<P, ClusterError> {
        let start = Instant::now();
        let live = self.space.contains(key);
        let result = self.remove(key);
        self.stats.update_time += start.elapsed();
        if live && !self.space.contains(key) {
            self.stats.deletes += 1;
        }
        result
    }

    /// Settles every layer left mid-repair by an earlier estimator failure.
    /// A no-op when all layers are settled.
    pub fn repair(&mut self) -> Result<(), ClusterError> {
        let mut level = 0;
        while level < self.layers.len() {
            let layer = &self.layers[level];
            match layer.status() {
                Status::Overflowing => self.split(level)?,
                Status::Underflowing => self.settle(level)?,
                Status::Empty if level > 0 || layer.solution().is_none() => self.settle(level)?,
                _ => {}
            }
            level += 1;
        }
        Ok(())
    }

    pub fn apply(&mut self, update: Update<P>) -> Result<(), ClusterError> {
        match update {
            Update::Insert(key, point) => self.insert(key, point),
            Update::Delete(key) => self.delete(key).map(|_| ()),
        }
    }

    /// Structure-wide cost estimate for `k` centers, combined per
    /// [`Parameters::combination`]. Fails with [`ClusterError::Unsettled`]
    /// while a layer awaits [`Self::repair`].
    pub fn approximate_cost(&self, k: usize) -> Result<Energy, ClusterError> {
        let start = Instant::now();
        let result = self.combine(k);
        self.tick(start);
        result
    }

    /// [`Self::approximate_cost`] at the configured `k`.
    pub fn cost(&self) -> Result<Energy, ClusterError> {
        self.approximate_cost(self.params.k)
    }

    /// Keys of `k` centers chosen over the weighted union of every layer's
    /// facilities.
    pub fn centers(&self, k: usize) -> Result<Vec<Key>, ClusterError> {
        let start = Instant::now();
        let result = self
            .joint(k)
            .map(|(keys, estimate)| estimate.medians.iter().map(|&i| keys[i]).collect());
        self.tick(start);
        result
    }
}

/// Repairs.
impl<P, M, E> DynamicMP<P, M, E>
where
    P: Point,
    M: Metric<P>,
    E: Estimator,
{
    fn place(&mut self, key: Key, point: P) -> Result<(), ClusterError> {
        self.repair()?;
        self.space.insert(key, point)?;
        let context = Context {
            space: &self.space,
            metric: &self.metric,
            estimator: &self.estimator,
            k: self.params.k,
        };
        if let Err(e) = self.layers[0].insert(key, &context) {
            self.space.remove(key)?;
            return Err(e);
        }
        log::trace!("{:<32}{:>12}", "inserted", key);
        let mut level = 0;
        while self.layers[level].status() == Status::Overflowing {
            self.split(level)?;
            level += 1;
        }
        self.refresh(0)
    }

    fn remove(&mut self, key: Key) -> Result<P, ClusterError> {
        self.repair()?;
        let level = self.owner(key).ok_or(ClusterError::NotFound(key))?;
        self.layers[level].delete(key)?;
        let point = self.space.remove(key)?;
        log::trace!("{:<32}{:>12}{:>4}", "deleted", key, level);
        self.settle(level)?;
        Ok(point)
    }

    /// Keeps the newest `ideal` points of an overflowing level and cascades
    /// the rest into the level above, creating it if needed.
    fn split(&mut self, level: usize) -> Result<(), ClusterError> {
        let keep = self.layers[level].bounds().ideal;
        let evicted = self.layers[level].evict(keep, &self.space);
        if level + 1 == self.layers.len() {
            let samples = self.params.samples();
            let bounds = Bounds::new(samples, self.params.beta, level + 1, true);
            self.layers.push(Layer::empty(level + 1, bounds, samples));
            self.rebound();
            log::debug!("{:<32}{:>4}", "created layer", level + 1);
        }
        log::debug!(
            "{:<32}{:>4}{:>10}{:>10}",
            "splitting layer",
            level,
            keep,
            evicted.len()
        );
        self.layers[level + 1].absorb(evicted);
        self.stats.splits += 1;
        self.rebuild(level)?;
        let above = &self.layers[level + 1];
        if !above.bounds().overflows(above.len()) {
            self.rebuild(level + 1)?;
        }
        Ok(())
    }

    /// Restores bounds and cache validity after a deletion at `level`.
    fn settle(&mut self, level: usize) -> Result<(), ClusterError> {
        let mut level = level;
        while level < self.layers.len() {
            let top = level + 1 == self.layers.len();
            let layer = &self.layers[level];
            if top && level > 0 && layer.is_empty() {
                self.layers.pop();
                self.rebound();
                log::debug!("{:<32}{:>4}", "destroyed layer", level);
                break;
            }
            if !top && layer.starved() {
                self.merge(level)?;
                level += 1;
                continue;
            }
            if layer.status() == Status::Underflowing || layer.solution().is_none() {
                self.rebuild(level)?;
            }
            return self.refresh(level);
        }
        Ok(())
    }

    /// Merges a starved level with the level above. The union is re-split
    /// newest first: all of it stays at `level` if it fits, otherwise `level`
    /// keeps its ideal share and the remainder goes back up.
    fn merge(&mut self, level: usize) -> Result<(), ClusterError> {
        let mut keys = self.layers[level].drain();
        keys.extend(self.layers[level + 1].drain());
        self.space.newest_first(&mut keys);
        let bounds = self.layers[level].bounds();
        let rest = match keys.len() > bounds.upper {
            true => keys.split_off(bounds.ideal),
            false => Vec::new(),
        };
        log::debug!(
            "{:<32}{:>4}{:>10}{:>10}",
            "merging layer",
            level,
            keys.len(),
            rest.len()
        );
        self.layers[level].absorb(keys);
        self.layers[level + 1].absorb(rest);
        self.stats.merges += 1;
        self.rebuild(level)?;
        self.rebuild(level + 1)
    }

    /// Rebuilds `level` if it has absorbed its refresh budget of updates.
    fn refresh(&mut self, level: usize) -> Result<(), ClusterError> {
        match self.layers[level].expired(self.params.refresh) {
            true => self.rebuild(level),
            false => Ok(()),
        }
    }

    fn rebuild(&mut self, level: usize) -> Result<(), ClusterError> {
        let context = Context {
            space: &self.space,
            metric: &self.metric,
            estimator: &self.estimator,
            k: self.params.k,
        };
        self.stats.rebuilds += 1;
        self.layers[level].rebuild(&context, &mut self.rng)
    }

    /// Recomputes every layer's size window after the top level changed.
    fn rebound(&mut self) {
        let depth = self.layers.len();
        let samples = self.params.samples();
        for (level, layer) in self.layers.iter_mut().enumerate() {
            layer.rebound(Bounds::new(samples, self.params.beta, level, level + 1 == depth));
        }
    }
}

/// Queries.
impl<P, M, E> DynamicMP<P, M, E>
where
    P: Point,
    M: Metric<P>,
    E: Estimator,
{
    fn combine(&self, k: usize) -> Result<Energy, ClusterError> {
        if k == 0 {
            return Err(ClusterError::InvalidParameter("k must be positive".into()));
        }
        let local = self
            .layers
            .iter()
            .map(Layer::cost)
            .sum::<Result<Energy, ClusterError>>()?;
        match self.params.combination {
            Combination::Sum => Ok(local),
            Combination::Union => Ok(local + self.joint(k)?.1.cost),
        }
    }

    /// Clusters the weighted union of every layer's facilities into `k`
    /// centers. Returns the facility keys alongside indices into them.
    fn joint(&self, k: usize) -> Result<(Vec<Key>, Estimate), ClusterError> {
        if k == 0 {
            return Err(ClusterError::InvalidParameter("k must be positive".into()));
        }
        let mut coreset = Vec::new();
        for layer in self.layers.iter() {
            layer.cost()?;
            if let Some(solution) = layer.solution() {
                coreset.extend(solution.coreset());
            }
        }
        if coreset.is_empty() {
            return Ok((Vec::new(), Estimate::default()));
        }
        let points = coreset
            .iter()
            .map(|&(key, w)| (self.space.point(key), w as Energy))
            .collect::<Vec<Weighted<'_, P>>>();
        let estimate = self.estimator.estimate(&self.metric, &points, k)?;
        let keys = coreset.into_iter().map(|(key, _)| key).collect();
        Ok((keys, estimate))
    }

    fn tick(&self, start: Instant) {
        self.queries.set(self.queries.get() + 1);
        self.query_time.set(self.query_time.get() + start.elapsed());
    }

    /// Checks every structural invariant: each live point in exactly one
    /// layer, sizes inside their windows, strict age order between levels,
    /// and settled caches fitted on intact samples.
    pub fn audit(&self) -> anyhow::Result<()> {
        use std::collections::BTreeSet;
        let samples = self.params.samples();
        let depth = self.layers.len();
        anyhow::ensure!(depth >= 1, "no layers");
        anyhow::ensure!(
            self.size() == self.space.len(),
            "layers hold {} points, space holds {}",
            self.size(),
            self.space.len()
        );
        for key in self.space.keys() {
            let owners = self.layers.iter().filter(|l| l.contains(key)).count();
            anyhow::ensure!(owners == 1, "point {} held by {} layers", key, owners);
        }
        for (level, layer) in self.layers.iter().enumerate() {
            let n = layer.len();
            let bounds = Bounds::new(samples, self.params.beta, level, level + 1 == depth);
            anyhow::ensure!(layer.level() == level, "layer {} at index {}", layer.level(), level);
            anyhow::ensure!(layer.bounds() == bounds, "stale bounds at level {}", level);
            anyhow::ensure!(n <= bounds.upper, "level {} overflows: {}", level, n);
            anyhow::ensure!(n >= bounds.lower, "level {} underflows: {}", level, n);
            anyhow::ensure!(
                matches!(layer.status(), Status::Empty | Status::Populated),
                "level {} unsettled: {:?}",
                level,
                layer.status()
            );
            let sample = layer.sample().iter().copied().collect::<BTreeSet<Key>>();
            anyhow::ensure!(sample.len() == layer.sample().len(), "level {} resampled a point", level);
            anyhow::ensure!(sample.len() == samples.min(n), "level {} sample size {}", level, sample.len());
            anyhow::ensure!(sample.iter().all(|&k| layer.contains(k)), "level {} samples a stranger", level);
            let solution = layer.solution().ok_or_else(|| anyhow::anyhow!("level {} has no cache", level))?;
            anyhow::ensure!(solution.len() == n, "level {} assigns {} of {}", level, solution.len(), n);
            anyhow::ensure!(
                solution.facilities().iter().all(|f| sample.contains(f)),
                "level {} opens an unsampled facility",
                level
            );
        }
        for pair in self.layers.windows(2) {
            let newer = pair[0].keys().filter_map(|k| self.space.stamp(k)).min();
            let older = pair[1].keys().filter_map(|k| self.space.stamp(k)).max();
            if let (Some(newer), Some(older)) = (newer, older) {
                anyhow::ensure!(newer > older, "age order broken above level {}", pair[0].level());
            }
        }
        anyhow::ensure!(
            depth == 1 || !self.layers[depth - 1].is_empty(),
            "empty top layer"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn structure(k: usize) -> DynamicMP<Energy, Absolute> {
        DynamicMP::new(Parameters::new(k).alpha(2.).beta(2.).seed(7), Absolute).unwrap()
    }

    fn close(a: Energy, b: Energy) -> bool {
        (a - b).abs() <= 1e-4 * (1. + b.abs())
    }

    #[test]
    fn two_pairs_on_a_line() {
        let mut mp = structure(2);
        for (key, x) in [0., 1., 10., 11.].into_iter().enumerate() {
            mp.insert(key as Key, x).unwrap();
        }
        assert_eq!(mp.size(), 4);
        assert_eq!(mp.depth(), 1);
        assert!(close(mp.approximate_cost(2).unwrap(), 2.));
        let mut centers = mp.centers(2).unwrap();
        centers.sort();
        assert_eq!(centers, vec![0, 3]);
        assert_eq!(mp.delete(1), Ok(1.));
        assert_eq!(mp.delete(3), Ok(11.));
        assert_eq!(mp.size(), 2);
        assert!(close(mp.approximate_cost(2).unwrap(), 0.));
        mp.audit().unwrap();
    }

    #[test]
    fn empty_structure_costs_nothing() {
        let mp = structure(3);
        assert_eq!(mp.size(), 0);
        assert_eq!(mp.approximate_cost(3), Ok(0.));
        assert_eq!(mp.centers(3), Ok(Vec::new()));
        mp.audit().unwrap();
    }

    #[test]
    fn rejects_duplicates_missing_and_zero_k() {
        let mut mp = structure(2);
        mp.insert(1, 5.).unwrap();
        assert_eq!(mp.insert(1, 6.), Err(ClusterError::Duplicate(1)));
        assert_eq!(mp.point(1), Some(&5.));
        assert_eq!(mp.delete(9), Err(ClusterError::NotFound(9)));
        assert!(matches!(
            mp.approximate_cost(0),
            Err(ClusterError::InvalidParameter(_))
        ));
        assert_eq!(mp.size(), 1);
        assert_eq!(mp.stats().inserts, 1);
        assert_eq!(mp.stats().deletes, 0);
    }

    #[test]
    fn rejects_invalid_parameters() {
        let params = Parameters::new(2).beta(1.);
        assert!(DynamicMP::<Energy, Absolute>::new(params, Absolute).is_err());
    }

    #[test]
    fn random_updates_preserve_invariants() {
        for (beta, refresh) in [(2., 1.), (1.5, 0.5), (3., 0.)] {
            let params = Parameters::new(2).alpha(2.).beta(beta).refresh(refresh).seed(11);
            let mut mp = DynamicMP::new(params, Absolute).unwrap();
            let ref mut rng = rand::rngs::SmallRng::seed_from_u64(3);
            let mut live = Vec::<Key>::new();
            let mut next = 0 as Key;
            for _ in 0..1500 {
                if live.is_empty() || rng.random_bool(0.6) {
                    mp.insert(next, rng.random_range(0. ..100.)).unwrap();
                    live.push(next);
                    next += 1;
                } else {
                    let key = live.swap_remove(rng.random_range(0..live.len()));
                    mp.delete(key).unwrap();
                }
                assert_eq!(mp.size(), live.len());
                mp.audit().unwrap();
            }
            assert!(mp.stats().splits > 0);
            assert!(mp.approximate_cost(2).unwrap() >= 0.);
        }
    }

    #[test]
    fn kmeans_estimator_preserves_invariants() {
        let params = Parameters::new(3).alpha(2.).beta(2.).seed(19);
        let mut mp = DynamicMP::with_estimator(params, Absolute, KMeansPlusPlus::default()).unwrap();
        let ref mut rng = rand::rngs::SmallRng::seed_from_u64(23);
        let mut live = Vec::<Key>::new();
        for key in 0..600 {
            if live.is_empty() || rng.random_bool(0.65) {
                mp.insert(key, rng.random_range(0. ..100.)).unwrap();
                live.push(key);
            } else {
                mp.delete(live.swap_remove(rng.random_range(0..live.len()))).unwrap();
            }
            mp.audit().unwrap();
        }
        assert_eq!(mp.size(), live.len());
        assert!(mp.approximate_cost(3).unwrap() >= 0.);
        assert!(mp.centers(3).unwrap().len() <= 3);
    }

    #[test]
    fn draining_collapses_to_one_layer() {
        let mut mp = structure(2);
        let ref mut rng = rand::rngs::SmallRng::seed_from_u64(5);
        let mut live = (0..400).collect::<Vec<Key>>();
        for &key in live.iter() {
            mp.insert(key, rng.random_range(0. ..50.)).unwrap();
        }
        assert!(mp.depth() > 1);
        while !live.is_empty() {
            let key = live.swap_remove(rng.random_range(0..live.len()));
            mp.delete(key).unwrap();
            mp.audit().unwrap();
        }
        assert!(mp.stats().merges > 0);
        assert!(mp.is_empty());
        assert_eq!(mp.depth(), 1);
        assert_eq!(mp.approximate_cost(2), Ok(0.));
    }

    #[test]
    fn insert_then_delete_without_split_is_identity() {
        let mut mp = structure(2);
        for key in 0..5 {
            mp.insert(key, key as Energy).unwrap();
        }
        let owners = (0..5).map(|k| mp.owner(k)).collect::<Vec<_>>();
        mp.insert(100, 42.).unwrap();
        mp.delete(100).unwrap();
        assert_eq!((0..5).map(|k| mp.owner(k)).collect::<Vec<_>>(), owners);
        assert_eq!(mp.size(), 5);
        assert!(!mp.contains(100));
        mp.audit().unwrap();
    }

    #[test]
    fn cost_non_increasing_in_k() {
        let mut mp = structure(4);
        let ref mut rng = rand::rngs::SmallRng::seed_from_u64(13);
        for key in 0..300 {
            mp.insert(key, rng.random_range(0. ..1000.)).unwrap();
        }
        let costs = (1..=12)
            .map(|k| mp.approximate_cost(k).unwrap())
            .collect::<Vec<Energy>>();
        for pair in costs.windows(2) {
            assert!(pair[1] <= pair[0] * (1. + 1e-4) + 1e-3, "{:?}", costs);
        }
        assert_eq!(mp.stats().queries, 12);
    }

    #[test]
    fn depth_is_logarithmic() {
        let mut mp = structure(2);
        let n = 2000;
        for key in 0..n {
            mp.insert(key, (key % 97) as Energy).unwrap();
        }
        let s = mp.parameters().samples();
        let bound = ((n as f32 / s as f32).log2().ceil() as usize) + 3;
        assert!(mp.depth() <= bound, "depth {} > {}", mp.depth(), bound);
        mp.audit().unwrap();
    }

    #[test]
    fn older_points_sit_higher() {
        let mut mp = structure(2);
        for key in 0..100 {
            mp.insert(key, key as Energy).unwrap();
        }
        assert_eq!(mp.owner(99), Some(0));
        assert_eq!(mp.owner(0), Some(mp.depth() - 1));
        let owners = (0..100).map(|k| mp.owner(k).unwrap()).collect::<Vec<_>>();
        assert!(owners.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn sum_with_local_search() {
        let params = Parameters::new(2)
            .alpha(2.)
            .beta(2.)
            .combination(Combination::Sum);
        let mut mp = DynamicMP::with_estimator(params, Absolute, LocalSearch::default()).unwrap();
        for (key, x) in [0., 1., 10., 11.].into_iter().enumerate() {
            mp.insert(key as Key, x).unwrap();
        }
        assert!(close(mp.cost().unwrap(), 2.));
        for key in 4..40 {
            mp.insert(key, (key % 13) as Energy).unwrap();
        }
        mp.audit().unwrap();
        let local = mp
            .layers()
            .iter()
            .map(|l| l.cost().unwrap())
            .sum::<Energy>();
        assert!(close(mp.cost().unwrap(), local));
    }

    #[test]
    fn sliding_window_through_apply() {
        let ref mut rng = rand::rngs::SmallRng::seed_from_u64(17);
        let points = (0..300)
            .map(|_| vec![rng.random_range(0. ..10.), rng.random_range(0. ..10.)])
            .collect::<Vec<Vec<Energy>>>();
        let mut mp = DynamicMP::new(Parameters::new(3), LpNorm::default()).unwrap();
        for update in SlidingWindow::new(points, 50) {
            mp.apply(update).unwrap();
        }
        mp.audit().unwrap();
        assert_eq!(mp.size(), 50);
        assert_eq!(mp.stats().inserts, 300);
        assert_eq!(mp.stats().deletes, 250);
        assert!((0..250).all(|k| !mp.contains(k)));
        assert_eq!(mp.centers(3).unwrap().len(), 3);
    }

    /// Online median that can be switched off to fail every call.
    #[derive(Default)]
    struct Outage {
        down: std::sync::atomic::AtomicBool,
    }

    impl Outage {
        fn set(&self, down: bool) {
            self.down.store(down, std::sync::atomic::Ordering::Relaxed);
        }
    }

    impl Estimator for Outage {
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
            match self.down.load(std::sync::atomic::Ordering::Relaxed) {
                true => Err(ClusterError::Estimator("offline".into())),
                false => OnlineMedian.estimate(metric, points, k),
            }
        }
    }

    #[test]
    fn estimator_failure_never_loses_a_point() {
        let params = Parameters::new(2).alpha(2.).beta(2.).refresh(0.);
        let mut mp = DynamicMP::with_estimator(params, Absolute, Outage::default()).unwrap();
        for key in 0..8 {
            mp.insert(key, key as Energy).unwrap();
        }
        mp.estimator().set(true);
        assert!(matches!(mp.insert(8, 8.), Err(ClusterError::Estimator(_))));
        assert!(mp.contains(8));
        assert_eq!(mp.size(), 9);
        assert_eq!(mp.stats().inserts, 9);
        assert!(matches!(mp.cost(), Err(ClusterError::Unsettled(_))));
        assert!(matches!(mp.insert(8, 8.), Err(ClusterError::Estimator(_))));
        assert_eq!(mp.size(), 9);
        mp.estimator().set(false);
        assert_eq!(mp.insert(8, 8.), Err(ClusterError::Duplicate(8)));
        mp.audit().unwrap();
        assert!(mp.cost().unwrap() >= 0.);
        assert_eq!(mp.stats().inserts, 9);
    }

    #[test]
    fn failed_delete_repairs_on_next_call() {
        let params = Parameters::new(2).alpha(2.).beta(2.).refresh(0.);
        let mut mp = DynamicMP::with_estimator(params, Absolute, Outage::default()).unwrap();
        for key in 0..6 {
            mp.insert(key, key as Energy).unwrap();
        }
        let sampled = mp.layers()[0].sample()[0];
        mp.estimator().set(true);
        assert!(matches!(mp.delete(sampled), Err(ClusterError::Estimator(_))));
        assert!(!mp.contains(sampled));
        assert_eq!(mp.size(), 5);
        assert_eq!(mp.stats().deletes, 1);
        assert!(mp.audit().is_err());
        mp.estimator().set(false);
        mp.insert(100, 3.5).unwrap();
        mp.audit().unwrap();
        assert_eq!(mp.size(), 6);
        let rebuilds = mp.stats().rebuilds;
        mp.repair().unwrap();
        assert_eq!(mp.stats().rebuilds, rebuilds);
    }
}
