use super::*;

/// A single mutation of the dynamic point set.
#[derive(Debug, Clone, PartialEq)]
pub enum Update<P> {
    Insert(Key, P),
    Delete(Key),
}

impl<P> Update<P> {
    pub fn key(&self) -> Key {
        match self {
            Self::Insert(key, _) => *key,
            Self::Delete(key) => *key,
        }
    }
    pub fn is_insert(&self) -> bool {
        matches!(self, Self::Insert(..))
    }
}

/// Update stream in the sliding-window model.
///
/// Point `i` is inserted under key `i`. Once `window` points are live, every
/// insertion is preceded by deleting the point that falls out of the window,
/// so at most `window` points are ever live. The window is at least one.
pub struct SlidingWindow<P> {
    window: usize,
    inserts: std::iter::Enumerate<std::vec::IntoIter<P>>,
    pending: Option<(Key, P)>,
}

impl<P> SlidingWindow<P> {
    pub fn new(points: Vec<P>, window: usize) -> Self {
        Self {
            window: window.max(1),
            inserts: points.into_iter().enumerate(),
            pending: None,
        }
    }
    pub fn window(&self) -> usize {
        self.window
    }
}

impl<P> Iterator for SlidingWindow<P> {
    type Item = Update<P>;
    fn next(&mut self) -> Option<Self::Item> {
        if let Some((key, point)) = self.pending.take() {
            return Some(Update::Insert(key, point));
        }
        let (i, point) = self.inserts.next()?;
        match i.checked_sub(self.window) {
            Some(expired) => {
                self.pending = Some((i as Key, point));
                Some(Update::Delete(expired as Key))
            }
            None => Some(Update::Insert(i as Key, point)),
        }
    }
}
