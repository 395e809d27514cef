use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use rating_fit::dataset::Dataset;
use rating_fit::features::FeatureVector;
use rating_fit::regression::{Estimator, fit_least_squares};
use rating_fit::stats_page::parse_stats_block;

const PAGE_HTML: &str = include_str!("../tests/fixtures/player_stats.html");

// Deterministic spread of plausible stat lines.
fn synthetic_dataset(rows: usize) -> Dataset {
    let mut ds = Dataset::new();
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % 10_000) as f64 / 10_000.0
    };
    for _ in 0..rows {
        let kdr = 0.8 + 0.6 * next();
        let dpr = 65.0 + 30.0 * next();
        let kpr = 0.55 + 0.35 * next();
        let apr = 0.05 + 0.1 * next();
        let hs = 0.3 + 0.35 * next();
        let rating = 0.2 * kdr + 0.004 * dpr + 0.6 * kpr + 0.3 * apr + 0.05 * hs + 0.1;
        ds.append(FeatureVector([kdr, dpr, kpr, apr, hs]), rating);
    }
    ds
}

fn bench_full_refit(c: &mut Criterion) {
    let ds = synthetic_dataset(200);
    c.bench_function("fit_least_squares_200", |b| {
        b.iter(|| {
            let w = fit_least_squares(black_box(&ds)).unwrap();
            black_box(w);
        })
    });
}

fn bench_incremental_accept(c: &mut Criterion) {
    let ds = synthetic_dataset(100);
    c.bench_function("accept_100_in_memory", |b| {
        b.iter(|| {
            let mut est = Estimator::in_memory();
            for (features, target) in ds.rows() {
                est.accept(*features, target).unwrap();
            }
            black_box(est.weights().copied());
        })
    });
}

fn bench_stats_page_parse(c: &mut Criterion) {
    c.bench_function("stats_page_parse", |b| {
        b.iter(|| {
            let stats = parse_stats_block(black_box(PAGE_HTML)).unwrap();
            black_box(stats.len());
        })
    });
}

criterion_group!(
    benches,
    bench_full_refit,
    bench_incremental_accept,
    bench_stats_page_parse
);
criterion_main!(benches);
