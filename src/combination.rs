/// How per-layer cached costs combine into one structure-wide estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Combination {
    /// Sum of layer costs plus the cost of re-clustering the weighted union of
    /// every layer's facilities into `k` centers.
    #[default]
    Union,
    /// Sum of layer costs. Each layer opens its own `k` facilities, so this is
    /// a bicriteria estimate that ignores the queried `k`.
    Sum,
}

impl std::fmt::Display for Combination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Union => write!(f, "union"),
            Self::Sum => write!(f, "sum"),
        }
    }
}

impl TryFrom<&str> for Combination {
    type Error = anyhow::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "union" => Ok(Self::Union),
            "sum" => Ok(Self::Sum),
            _ => Err(anyhow::anyhow!("unknown combination: {}", s)),
        }
    }
}
