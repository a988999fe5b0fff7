use super::*;

/// Errors surfaced by the dynamic structure and its estimators.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterError {
    /// Insert of a key that is already live.
    Duplicate(Key),
    /// Delete of a key that is not live.
    NotFound(Key),
    /// Rejected construction or query parameter.
    InvalidParameter(String),
    /// The static estimator rejected its input.
    Estimator(String),
    /// Query against a layer whose cached solution is invalid.
    Unsettled(usize),
}

impl std::fmt::Display for ClusterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate(key) => write!(f, "duplicate point: {}", key),
            Self::NotFound(key) => write!(f, "point not found: {}", key),
            Self::InvalidParameter(s) => write!(f, "invalid parameter: {}", s),
            Self::Estimator(s) => write!(f, "estimator failure: {}", s),
            Self::Unsettled(level) => write!(f, "layer {} is mid-rebuild", level),
        }
    }
}

impl std::error::Error for ClusterError {}
