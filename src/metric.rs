//! Distance functions over points.
use super::*;

/// A distance function on `P`.
///
/// Implementations must be symmetric, satisfy the triangle inequality and
/// return zero on identical inputs. The metric is shared by every layer and
/// may be called from several threads at once, so it must be side-effect free.
pub trait Metric<P>: Sync {
    fn distance(&self, a: &P, b: &P) -> Energy;
}

/// The real line, `d(x, y) = |x - y|`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Absolute;

impl Metric<Energy> for Absolute {
    fn distance(&self, a: &Energy, b: &Energy) -> Energy {
        (a - b).abs()
    }
}

/// The Lp norm on float vectors.
///
/// Vectors of mismatched dimension are compared over their common prefix.
#[derive(Debug, Clone, Copy)]
pub struct LpNorm {
    p: i32,
}

impl LpNorm {
    pub fn new(p: i32) -> Result<Self, ClusterError> {
        if p < 1 {
            return Err(ClusterError::InvalidParameter(format!(
                "Lp norm needs p >= 1, got {}",
                p
            )));
        }
        Ok(Self { p })
    }
    pub fn p(&self) -> i32 {
        self.p
    }
}

impl Default for LpNorm {
    fn default() -> Self {
        Self { p: 2 }
    }
}

impl Metric<Vec<Energy>> for LpNorm {
    fn distance(&self, a: &Vec<Energy>, b: &Vec<Energy>) -> Energy {
        match self.p {
            1 => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
            2 => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<Energy>()
                .sqrt(),
            p => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y).abs().powi(p))
                .sum::<Energy>()
                .powf(1. / p as Energy),
        }
    }
}
