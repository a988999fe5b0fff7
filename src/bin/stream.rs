//! Sliding-window benchmark driver.
//!
//! Generates Gaussian-ish blobs in `dimension` dimensions, streams them through
//! a [`DynamicMP`] in the sliding-window model, and prints a `#`-delimited
//! record of cumulative update time, cumulative query time and cost every
//! `every` updates.

use clap::Parser;
use dynamic_mp::*;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target number of clusters
    #[arg(short, long, default_value_t = DEFAULT_K)]
    k: usize,
    /// Sample multiplier
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    alpha: f32,
    /// Layer size ratio
    #[arg(long, default_value_t = DEFAULT_BETA)]
    beta: f32,
    /// Updates per rebuild relative to layer size, 0 to disable
    #[arg(long, default_value_t = DEFAULT_REFRESH)]
    refresh: f32,
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Total points inserted over the stream
    #[arg(short, long, default_value_t = 10_000)]
    points: usize,
    /// Live points in the sliding window
    #[arg(short, long, default_value_t = 1_000)]
    window: usize,
    #[arg(short, long, default_value_t = 2)]
    dimension: usize,
    /// Number of generating blobs
    #[arg(short, long, default_value_t = 8)]
    blobs: usize,
    /// Updates between cost queries
    #[arg(short, long, default_value_t = 100)]
    every: usize,
    /// `union` or `sum`
    #[arg(short, long, default_value = "union")]
    combination: String,
    /// Exponent of the Lp norm
    #[arg(long, default_value_t = 2)]
    p: i32,
    /// `median`, `search` or `kmeans`
    #[arg(long, default_value = "median")]
    estimator: String,
}

fn blobs(args: &Args, rng: &mut SmallRng) -> Vec<Vec<Energy>> {
    let centers = (0..args.blobs.max(1))
        .map(|_| {
            (0..args.dimension)
                .map(|_| rng.random_range(-100. ..100.))
                .collect::<Vec<Energy>>()
        })
        .collect::<Vec<_>>();
    (0..args.points)
        .map(|_| {
            let center = &centers[rng.random_range(0..centers.len())];
            center
                .iter()
                .map(|x| x + (0..4).map(|_| rng.random_range(-2. ..2.)).sum::<Energy>())
                .collect()
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    log();
    let args = Args::parse();
    let params = Parameters::new(args.k)
        .alpha(args.alpha)
        .beta(args.beta)
        .refresh(args.refresh)
        .seed(args.seed)
        .combination(Combination::try_from(args.combination.as_str())?);
    log::info!("{:<32}{:?}", "parameters", params);
    let ref mut rng = SmallRng::seed_from_u64(args.seed);
    let points = blobs(&args, rng);
    let metric = LpNorm::new(args.p)?;
    match args.estimator.as_str() {
        "median" => run(&args, params, metric, OnlineMedian, points),
        "search" => run(&args, params, metric, LocalSearch::default(), points),
        "kmeans" => run(&args, params, metric, KMeansPlusPlus::new(KMEANS_ITERATIONS, args.seed), points),
        other => Err(anyhow::anyhow!("unknown estimator: {}", other)),
    }
}

fn run<E: Estimator>(
    args: &Args,
    params: Parameters,
    metric: LpNorm,
    estimator: E,
    points: Vec<Vec<Energy>>,
) -> anyhow::Result<()> {
    let mut mp = DynamicMP::with_estimator(params, metric, estimator)?;
    let every = args.every.max(1);
    for (i, update) in SlidingWindow::new(points, args.window).enumerate() {
        mp.apply(update)?;
        if (i + 1) % every == 0 {
            let cost = mp.cost()?;
            println!("{}", mp.stats().record(cost));
            log::debug!("{:<32}{:>10}{:>4}", "live points", mp.size(), mp.depth());
        }
    }
    mp.audit()?;
    log::info!("{:<32}{}", "final cost", mp.cost()?);
    log::info!("{:<32}{}", "stats", serde_json::to_string(&mp.stats())?);
    Ok(())
}
