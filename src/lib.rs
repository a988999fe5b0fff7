//! Dynamic Mettu-Plaxton k-median clustering.
//!
//! This crate maintains an approximate k-median clustering of a metric space while
//! points are inserted and deleted. The live point set is split into geometrically
//! growing layers; each layer caches a solution computed by a static estimator on a
//! small uniform sample, and only the layers touched by an update are rebuilt.
//!
//! ## Core Types
//!
//! - [`DynamicMP`] : The dynamic structure: insert, delete, cost and center queries
//! - [`Layer`] : One level of the decomposition with its sample and cached solution
//! - [`Space`] : Owned storage of live points and their insertion stamps
//! - [`Parameters`] : `k`, `alpha`, `beta` and the ambient knobs
//!
//! ## Algorithms
//!
//! - [`OnlineMedian`] : Mettu-Plaxton online median, the default static estimator
//! - [`LocalSearch`] : Single-swap local search, an alternative static estimator
//! - [`KMeansPlusPlus`] : D² seeding with medoid refinement, a seeded static estimator
//! - [`Combination`] : Rules for merging per-layer caches into one cost
//!
//! ## Instrumentation
//!
//! - [`Stats`] : Counters and cumulative latencies sampled after each call
//! - [`SlidingWindow`] : Update streams in the sliding-window model
mod bounds;
mod combination;
mod dynamic;
mod error;
mod estimate;
mod layer;
mod median;
mod metric;
mod parameters;
mod sampling;
mod search;
mod seeding;
mod solution;
mod space;
mod stats;
mod stream;

pub use bounds::*;
pub use combination::*;
pub use dynamic::*;
pub use error::*;
pub use estimate::*;
pub use layer::*;
pub use median::*;
pub use metric::*;
pub use parameters::*;
pub use sampling::*;
pub use search::*;
pub use seeding::*;
pub use solution::*;
pub use space::*;
pub use stats::*;
pub use stream::*;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Distances, costs and point weights.
pub type Energy = f32;
/// Caller-supplied unique identifier of a point.
pub type Key = u64;
/// Monotone insertion clock; larger is newer.
pub type Stamp = u64;
/// Nearest facility index paired with the distance to it.
pub type Neighbor = (usize, Energy);

// ============================================================================
// TRAITS
// ============================================================================
/// Opaque element of a metric space.
///
/// Points are only ever handed to a [`Metric`]; the bounds let distance
/// computations fan out across threads.
pub trait Point: Send + Sync {}
impl<T> Point for T where T: Send + Sync {}

// ============================================================================
// STRUCTURE PARAMETERS
// ============================================================================
/// Target number of clusters.
pub const DEFAULT_K: usize = 10;
/// Sampling multiplier. Each layer samples `floor(alpha * k)` points.
pub const DEFAULT_ALPHA: f32 = 2.0;
/// Size ratio. Level `i` holds between `ideal / beta` and `beta * ideal` points.
pub const DEFAULT_BETA: f32 = 2.0;
/// Incremental updates a layer absorbs, relative to its size at the last
/// rebuild, before it is resampled. Zero disables periodic refresh.
pub const DEFAULT_REFRESH: f32 = 1.0;
/// Seed for layer sampling.
pub const DEFAULT_SEED: u64 = 0x5eed;

// ============================================================================
// METTU-PLAXTON ONLINE MEDIAN
// Isolation radius d(x, M) / gamma with gamma = a(1 + a) / (a - 2), a = 2 + sqrt(3).
// ============================================================================
/// Ball growth constant `a = 2 + sqrt(3)`.
pub const MP_ALPHA: Energy = 3.732_050_8;
/// Isolation divisor `gamma = a(1 + a) / (a - 2)`.
pub const MP_GAMMA: Energy = MP_ALPHA * (1. + MP_ALPHA) / (MP_ALPHA - 2.);

// ============================================================================
// LOCAL SEARCH
// Single swaps are accepted while they improve cost by more than (epsilon / k).
// ============================================================================
/// Relative improvement below which local search is considered stable.
pub const LOCAL_SEARCH_EPSILON: Energy = 0.01;
/// Hard cap on accepted swaps.
pub const LOCAL_SEARCH_ITERATIONS: usize = 256;

// ============================================================================
// K-MEANS++
// ============================================================================
/// Medoid refinement rounds after D² seeding.
pub const KMEANS_ITERATIONS: usize = 2;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "cli")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
