use criterion::{criterion_group, criterion_main, Criterion};
use moodkinetics::stats::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

fn series(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.random_range(0.0..10.0)).collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let x = series(2_000, 1);
    let y = series(2_000, 2);

    c.bench_function("pearson 2000", |b| {
        b.iter(|| pearson_correlation(black_box(&x), black_box(&y)))
    });
    c.bench_function("spearman 2000", |b| {
        b.iter(|| spearman_correlation(black_box(&x), black_box(&y)))
    });

    let options = CrossCorrelationOptions::default().with_method(CorrelationMethod::Spearman);
    c.bench_function("cross correlation 2000 lag 48", |b| {
        b.iter(|| cross_correlation(black_box(&x), black_box(&y), 48, 10, &options))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
