use super::*;
use std::time::Duration;

/// Instrumentation snapshot of a [`DynamicMP`].
///
/// Counters and cumulative latencies are meant to be sampled after each call
/// by a thin wrapper that persists them for offline comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stats {
    pub inserts: usize,
    pub deletes: usize,
    pub queries: usize,
    pub rebuilds: usize,
    pub splits: usize,
    pub merges: usize,
    pub update_time: Duration,
    pub query_time: Duration,
}

impl Stats {
    /// `#`-delimited record of cumulative update latency, cumulative query
    /// latency and the current solution cost.
    pub fn record(&self, cost: Energy) -> String {
        format!(
            "{:.6}#{:.6}#{:.4}",
            self.update_time.as_secs_f64(),
            self.query_time.as_secs_f64(),
            cost
        )
    }
}
