criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        inserting_point_stream,
        sliding_window_updates,
        querying_approximate_cost,
        estimating_online_median,
        estimating_local_search,
        estimating_kmeans_plusplus,
}

use dynamic_mp::*;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

const N: usize = 2_000;
const DIM: usize = 4;
const K: usize = 10;

fn points(n: usize) -> Vec<Vec<Energy>> {
    let ref mut rng = SmallRng::seed_from_u64(0);
    (0..n)
        .map(|_| (0..DIM).map(|_| rng.random_range(0. ..1.)).collect())
        .collect()
}

fn filled(points: &[Vec<Energy>]) -> DynamicMP<Vec<Energy>, LpNorm> {
    let mut mp = DynamicMP::new(Parameters::new(K), LpNorm::default()).unwrap();
    for (key, point) in points.iter().enumerate() {
        mp.insert(key as Key, point.clone()).unwrap();
    }
    mp
}

fn inserting_point_stream(c: &mut criterion::Criterion) {
    let points = points(N);
    c.bench_function("insert a stream of 2000 points", |b| {
        b.iter(|| filled(&points))
    });
}

fn sliding_window_updates(c: &mut criterion::Criterion) {
    let points = points(N);
    c.bench_function("apply a sliding window of 500 over 2000 points", |b| {
        b.iter(|| {
            let mut mp = DynamicMP::new(Parameters::new(K), LpNorm::default()).unwrap();
            for update in SlidingWindow::new(points.clone(), 500) {
                mp.apply(update).unwrap();
            }
            mp
        })
    });
}

fn querying_approximate_cost(c: &mut criterion::Criterion) {
    let mp = filled(&points(N));
    c.bench_function("query approximate cost over 2000 points", |b| {
        b.iter(|| mp.approximate_cost(K).unwrap())
    });
}

fn estimating_online_median(c: &mut criterion::Criterion) {
    let points = points(200);
    let weighted = points.iter().map(|p| (p, 1.)).collect::<Vec<_>>();
    c.bench_function("estimate online median of 200 points", |b| {
        b.iter(|| OnlineMedian.estimate(&LpNorm::default(), &weighted, K).unwrap())
    });
}

fn estimating_local_search(c: &mut criterion::Criterion) {
    let points = points(200);
    let weighted = points.iter().map(|p| (p, 1.)).collect::<Vec<_>>();
    c.bench_function("estimate local search of 200 points", |b| {
        b.iter(|| LocalSearch::default().estimate(&LpNorm::default(), &weighted, K).unwrap())
    });
}

fn estimating_kmeans_plusplus(c: &mut criterion::Criterion) {
    let points = points(200);
    let weighted = points.iter().map(|p| (p, 1.)).collect::<Vec<_>>();
    c.bench_function("estimate kmeans++ of 200 points", |b| {
        b.iter(|| KMeansPlusPlus::default().estimate(&LpNorm::default(), &weighted, K).unwrap())
    });
}
