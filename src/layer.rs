//! One level of the dynamic decomposition.
//!
//! A layer owns a set of live keys, a uniform sample of them drawn without
//! replacement, and a [`Solution`] fitted on that sample. Updates keep the
//! cached solution current where they can and otherwise report, through
//! [`Status`], the repair the owning structure has to make.
use super::*;
use rand::Rng;
use std::collections::BTreeSet;

/// Lifecycle of a layer between owner interventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Holds no points.
    Empty,
    /// Within bounds with a valid cache. Only settled layers answer queries.
    Populated,
    /// Holds more points than its level allows; the owner must split it.
    Overflowing,
    /// Below its level's lower bound, or its sample lost a member and the
    /// cache is invalid; the owner must merge or rebuild it.
    Underflowing,
}

/// Everything a layer borrows from its owner for one operation.
pub struct Context<'a, P, M, E> {
    pub space: &'a Space<P>,
    pub metric: &'a M,
    pub estimator: &'a E,
    pub k: usize,
}

/// A single level holding a subset of the live points.
#[derive(Debug, Clone)]
pub struct Layer {
    level: usize,
    bounds: Bounds,
    /// Target sample size, `floor(alpha * k)`.
    samples: usize,
    points: BTreeSet<Key>,
    sample: Vec<Key>,
    /// `None` while the sample that produced it is no longer intact.
    solution: Option<Solution>,
    /// Incremental updates absorbed since the last rebuild.
    since: usize,
    /// Size at the last rebuild.
    built: usize,
}

impl Layer {
    /// A layer with no points and a trivially valid cache.
    pub fn empty(level: usize, bounds: Bounds, samples: usize) -> Self {
        Self {
            level,
            bounds,
            samples,
            points: BTreeSet::new(),
            sample: Vec::new(),
            solution: Some(Solution::default()),
            since: 0,
            built: 0,
        }
    }

    /// Takes ownership of `points`, samples them and fits the cache.
    pub fn new<P, M, E, R>(
        level: usize,
        bounds: Bounds,
        samples: usize,
        points: BTreeSet<Key>,
        context: &Context<'_, P, M, E>,
        rng: &mut R,
    ) -> Result<Self, ClusterError>
    where
        P: Point,
        M: Metric<P>,
        E: Estimator,
        R: Rng + ?Sized,
    {
        let mut layer = Self::empty(level, bounds, samples);
        layer.absorb(points);
        layer.rebuild(context, rng)?;
        Ok(layer)
    }

    pub fn level(&self) -> usize {
        self.level
    }
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
    pub fn len(&self) -> usize {
        self.points.len()
    }
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
    pub fn contains(&self, key: Key) -> bool {
        self.points.contains(&key)
    }
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.points.iter().copied()
    }
    pub fn sample(&self) -> &[Key] {
        &self.sample
    }
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    pub fn status(&self) -> Status {
        let n = self.len();
        if n == 0 {
            Status::Empty
        } else if self.bounds.overflows(n) {
            Status::Overflowing
        } else if self.bounds.underflows(n)
            || self.solution.is_none()
            || self.sample.len() < self.samples.min(n)
        {
            Status::Underflowing
        } else {
            Status::Populated
        }
    }

    /// Fewer points than the level's lower bound allows.
    pub fn starved(&self) -> bool {
        self.bounds.underflows(self.len())
    }

    /// Absorbed enough incremental updates since the last rebuild that the
    /// sample no longer represents the layer. `refresh == 0` never expires.
    pub fn expired(&self, refresh: f32) -> bool {
        refresh > 0. && self.since >= ((refresh * self.built as f32).ceil() as usize).max(1)
    }

    /// Cached cost of serving this layer's points from its facilities. O(1).
    pub fn cost(&self) -> Result<Energy, ClusterError> {
        match (self.status(), self.solution.as_ref()) {
            (Status::Empty, _) => Ok(0.),
            (Status::Populated, Some(solution)) => Ok(solution.cost()),
            _ => Err(ClusterError::Unsettled(self.level)),
        }
    }

    /// Adds `key`. While the sample is short, which only happens while the
    /// sample is all of the layer, the point joins it and the cache is refit.
    /// Otherwise the point is assigned to its nearest cached facility.
    pub fn insert<P, M, E>(
        &mut self,
        key: Key,
        context: &Context<'_, P, M, E>,
    ) -> Result<Status, ClusterError>
    where
        P: Point,
        M: Metric<P>,
        E: Estimator,
    {
        if !self.points.insert(key) {
            return Err(ClusterError::Duplicate(key));
        }
        if self.sample.len() < self.samples.min(self.len()) {
            let mut sample = self.sample.clone();
            sample.push(key);
            let fit = Solution::fit(
                context.space,
                context.metric,
                context.estimator,
                &sample,
                &self.points,
                context.k,
            );
            match fit {
                Ok(solution) => {
                    self.sample = sample;
                    self.solution = Some(solution);
                }
                Err(e) => {
                    self.points.remove(&key);
                    return Err(e);
                }
            }
        } else if let Some(solution) = self.solution.as_mut() {
            solution.assign(context.space, context.metric, key);
        }
        self.since += 1;
        Ok(self.status())
    }

    /// Removes `key`. Losing a sampled point invalidates the cache;
    /// any other point just leaves the cached cost.
    pub fn delete(&mut self, key: Key) -> Result<Status, ClusterError> {
        if !self.points.remove(&key) {
            return Err(ClusterError::NotFound(key));
        }
        match self.sample.iter().position(|k| *k == key) {
            Some(i) => {
                self.sample.swap_remove(i);
                self.solution = None;
            }
            None => {
                if let Some(solution) = self.solution.as_mut() {
                    solution.unassign(key);
                }
            }
        }
        self.since += 1;
        Ok(self.status())
    }

    /// Redraws the sample from the current points and refits the cache.
    pub fn rebuild<P, M, E, R>(
        &mut self,
        context: &Context<'_, P, M, E>,
        rng: &mut R,
    ) -> Result<(), ClusterError>
    where
        P: Point,
        M: Metric<P>,
        E: Estimator,
        R: Rng + ?Sized,
    {
        let keys = self.points.iter().copied().collect::<Vec<Key>>();
        self.sample = sample(rng, &keys, self.samples);
        self.solution = None;
        self.solution = match keys.is_empty() {
            true => Some(Solution::default()),
            false => Some(Solution::fit(
                context.space,
                context.metric,
                context.estimator,
                &self.sample,
                &self.points,
                context.k,
            )?),
        };
        self.since = 0;
        self.built = keys.len();
        log::debug!(
            "{:<32}{:>4}{:>10}{:>12.4}",
            "rebuilt layer",
            self.level,
            self.len(),
            self.solution.as_ref().map_or(0., Solution::cost)
        );
        Ok(())
    }

    /// Adds keys without touching the cache, which becomes invalid until the
    /// next rebuild.
    pub fn absorb(&mut self, keys: impl IntoIterator<Item = Key>) {
        let before = self.len();
        self.points.extend(keys);
        if self.len() > before {
            self.solution = None;
        }
    }

    /// Keeps the `keep` newest points and hands back the rest, oldest last.
    /// The cache becomes invalid until the next rebuild.
    pub fn evict<P>(&mut self, keep: usize, space: &Space<P>) -> Vec<Key> {
        let mut keys = self.drain();
        space.newest_first(&mut keys);
        let evicted = keys.split_off(keep.min(keys.len()));
        self.absorb(keys);
        evicted
    }

    /// Removes every point. The cache becomes invalid until the next rebuild.
    pub fn drain(&mut self) -> Vec<Key> {
        self.sample.clear();
        self.solution = None;
        std::mem::take(&mut self.points).into_iter().collect()
    }

    /// Replaces the size window, e.g. when this layer stops or starts being top.
    pub fn rebound(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }
}
