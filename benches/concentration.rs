use criterion::{criterion_group, criterion_main, Criterion};
use moodkinetics::prelude::*;
use std::hint::black_box;

const HOUR: i64 = 3_600_000;

fn regimen(days: i64) -> Vec<Dose> {
    (0..days)
        .flat_map(|day| {
            [8, 20].map(|hour| {
                Dose::new(
                    format!("d{}-{}", day, hour),
                    "m1",
                    (day * 24 + hour) * HOUR,
                    25.0,
                )
            })
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let one = Medication::new("m1", "Lithium", DrugClass::MoodStabilizer, 24.0, 0.8, 1.0);
    let two = Medication::new("m1", "Sertraline", DrugClass::Ssri, 26.0, 20.0, 0.44)
        .with_effect(0.15, 2.0);
    let doses = regimen(90);
    let end = 90 * 24 * HOUR;

    c.bench_function("point 180 doses", |b| {
        b.iter(|| calculate_concentration(black_box(&one), black_box(&doses), end, 70.0))
    });
    c.bench_function("curve 180 doses x 500", |b| {
        b.iter(|| generate_concentration_curve(black_box(&one), black_box(&doses), 0, end, 500, 70.0))
    });
    c.bench_function("dual curve two compartment x 500", |b| {
        b.iter(|| {
            generate_dual_concentration_curves(black_box(&two), black_box(&doses), 0, end, 500, 70.0)
        })
    });

    let cache = ConcentrationCache::new(CacheOptions::default());
    cache.get_curve(&one, &doses, 0, end, 500, 70.0);
    c.bench_function("cached curve hit", |b| {
        b.iter(|| cache.get_curve(black_box(&one), black_box(&doses), 0, end, 500, 70.0))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
