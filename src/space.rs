use super::*;
use std::collections::BTreeMap;

/// The live points of the metric space, keyed by caller identity.
///
/// Each point carries the stamp of its insertion so that layers can tell
/// newer points from older ones during splits and merges.
#[derive(Debug, Clone)]
pub struct Space<P> {
    points: BTreeMap<Key, (P, Stamp)>,
    clock: Stamp,
}

impl<P> Default for Space<P> {
    fn default() -> Self {
        Self {
            points: BTreeMap::new(),
            clock: 0,
        }
    }
}

impl<P> Space<P> {
    pub fn len(&self) -> usize {
        self.points.len()
    }
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
    pub fn contains(&self, key: Key) -> bool {
        self.points.contains_key(&key)
    }
    pub fn get(&self, key: Key) -> Option<&P> {
        self.points.get(&key).map(|(p, _)| p)
    }
    pub fn stamp(&self, key: Key) -> Option<Stamp> {
        self.points.get(&key).map(|(_, s)| *s)
    }
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.points.keys().copied()
    }

    /// Point behind a key that a layer holds.
    ///
    /// Layers only ever hold live keys, so a miss is a broken invariant.
    pub fn point(&self, key: Key) -> &P {
        self.get(key).expect("layer keys are live")
    }

    /// Adds a point and returns its stamp.
    pub fn insert(&mut self, key: Key, point: P) -> Result<Stamp, ClusterError> {
        if self.contains(key) {
            return Err(ClusterError::Duplicate(key));
        }
        self.clock += 1;
        self.points.insert(key, (point, self.clock));
        Ok(self.clock)
    }

    pub fn remove(&mut self, key: Key) -> Result<P, ClusterError> {
        self.points
            .remove(&key)
            .map(|(p, _)| p)
            .ok_or(ClusterError::NotFound(key))
    }

    /// Orders keys newest first.
    pub fn newest_first(&self, keys: &mut [Key]) {
        keys.sort_by_key(|k| std::cmp::Reverse(self.stamp(*k).unwrap_or(0)));
    }
}
