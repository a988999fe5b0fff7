use super::*;

/// Construction-time configuration of a [`DynamicMP`].
///
/// `k`, `alpha` and `beta` shape the layer decomposition; the remaining fields
/// tune refresh, reproducibility and how layer caches combine into one cost.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Parameters {
    pub k: usize,
    pub alpha: f32,
    pub beta: f32,
    pub refresh: f32,
    pub seed: u64,
    pub combination: Combination,
}

impl Parameters {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }
    pub fn beta(mut self, beta: f32) -> Self {
        self.beta = beta;
        self
    }
    pub fn refresh(mut self, refresh: f32) -> Self {
        self.refresh = refresh;
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
    pub fn combination(mut self, combination: Combination) -> Self {
        self.combination = combination;
        self
    }

    /// Points drawn into each layer's sample, `floor(alpha * k)`.
    pub fn samples(&self) -> usize {
        (self.alpha * self.k as f32).floor() as usize
    }

    pub fn validate(&self) -> Result<(), ClusterError> {
        let invalid = |s: String| -> Result<(), ClusterError> {
            Err(ClusterError::InvalidParameter(s))
        };
        if self.k < 1 {
            return invalid(format!("k must be positive, got {}", self.k));
        }
        if !self.alpha.is_finite() || self.alpha < 1. {
            return invalid(format!("alpha must be >= 1, got {}", self.alpha));
        }
        if !self.beta.is_finite() || self.beta <= 1. {
            return invalid(format!("beta must be > 1, got {}", self.beta));
        }
        if !self.refresh.is_finite() || self.refresh < 0. {
            return invalid(format!("refresh must be >= 0, got {}", self.refresh));
        }
        Ok(())
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
            refresh: DEFAULT_REFRESH,
            seed: DEFAULT_SEED,
            combination: Combination::default(),
        }
    }
}
