/// Size window for one level of the decomposition.
///
/// Level `i` aims for `ideal = s * 2^i` points and may hold up to
/// `floor(beta * ideal)`. Intermediate levels must keep at least
/// `ceil(ideal / beta)`; level 0 may shrink to nothing and the top level only
/// has to stay non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub ideal: usize,
    pub lower: usize,
    pub upper: usize,
}

impl Bounds {
    pub fn new(samples: usize, beta: f32, level: usize, top: bool) -> Self {
        let ideal = samples << level;
        let upper = (beta * ideal as f32).floor() as usize;
        let lower = match (level, top) {
            (0, _) => 0,
            (_, true) => 1,
            (_, false) => (ideal as f32 / beta).ceil() as usize,
        };
        Self {
            ideal,
            lower,
            upper: upper.max(ideal),
        }
    }
    pub fn overflows(&self, n: usize) -> bool {
        n > self.upper
    }
    pub fn underflows(&self, n: usize) -> bool {
        n < self.lower
    }
}
