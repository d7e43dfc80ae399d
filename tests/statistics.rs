use approx::assert_relative_eq;
use moodkinetics::prelude::*;
use moodkinetics::stats::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const HOUR: i64 = 3_600_000;

fn noisy_line(n: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let y = x
        .iter()
        .map(|v| 2.0 * v + 1.0 + rng.random_range(-0.5..0.5))
        .collect();
    (x, y)
}

#[test]
fn series_correlates_perfectly_with_itself() {
    let (x, _) = noisy_line(20, 1);
    for method in [CorrelationMethod::Pearson, CorrelationMethod::Spearman] {
        let r = correlate(&x, &x, method);
        assert_relative_eq!(r.value, 1.0, epsilon = 1e-12);
        assert!(r.p_value < 1e-6);
        assert_eq!(r.significance, Significance::High);
    }
}

#[test]
fn short_or_mismatched_input_is_neutral() {
    for r in [
        pearson_correlation(&[1.0, 2.0], &[2.0, 4.0]),
        pearson_correlation(&[1.0, 2.0, 3.0], &[1.0, 2.0]),
        spearman_correlation(&[], &[]),
        pearson_correlation(&[1.0, 1.0, 1.0, 1.0], &[1.0, 2.0, 3.0, 4.0]),
    ] {
        assert_eq!(r.value, 0.0);
        assert_eq!(r.p_value, 1.0);
        assert_eq!(r.significance, Significance::None);
    }
    assert!(paired_len(&[1.0, 2.0], &[1.0], MIN_CORRELATION_SAMPLES).is_err());
}

#[test]
fn spearman_ignores_monotonic_transforms() {
    let (x, y) = noisy_line(30, 5);
    let stretched: Vec<f64> = x.iter().map(|v| (v / 5.0).exp()).collect();

    let plain = spearman_correlation(&x, &y);
    let transformed = spearman_correlation(&stretched, &y);
    assert_relative_eq!(plain.value, transformed.value, epsilon = 1e-12);
    assert_relative_eq!(plain.p_value, transformed.p_value, epsilon = 1e-12);
}

#[test]
fn cross_correlation_finds_the_delay() {
    let mut rng = StdRng::seed_from_u64(9);
    let x: Vec<f64> = (0..60).map(|_| rng.random_range(0.0..10.0)).collect();
    // y repeats x three samples later
    let y: Vec<f64> = (0..60)
        .map(|i| if i >= 3 { x[i - 3] } else { 0.0 })
        .collect();

    let results = cross_correlation(&x, &y, 5, 10, &CrossCorrelationOptions::default());
    assert_eq!(results.len(), 11);
    assert_eq!(results[0].lag, Some(-5));

    let best = strongest_lag(&results).unwrap();
    assert_eq!(best.lag, Some(3));
    assert_relative_eq!(best.value, 1.0, epsilon = 1e-12);

    let same = cross_correlation(&x, &x, 0, 3, &CrossCorrelationOptions::default());
    assert_relative_eq!(same[0].value, 1.0, epsilon = 1e-12);
}

#[test]
fn concentration_tracks_mood_through_the_pipeline() {
    let med = Medication::new("m1", "Sertraline", DrugClass::Ssri, 26.0, 20.0, 0.44);
    let doses: Vec<Dose> = (0..21)
        .map(|i| Dose::new(format!("d{}", i), "m1", i * 24 * HOUR, 50.0))
        .collect();

    // Mood follows the concentration build-up, with one missed check-in
    let entries: Vec<MoodEntry> = (0..21)
        .map(|day| {
            let t = day * 24 * HOUR + 12 * HOUR;
            let c = calculate_concentration(&med, &doses, t, DEFAULT_BODY_WEIGHT);
            let mut entry = MoodEntry::new(t, 3.0 + c / 20.0);
            entry.anxiety_level = (day != 10).then_some(8.0 - c / 25.0);
            entry
        })
        .collect();
    let concentrations: Vec<f64> = entries
        .iter()
        .map(|e| calculate_concentration(&med, &doses, e.timestamp, DEFAULT_BODY_WEIGHT))
        .collect();

    let mood = MoodEntry::series(&entries, MoodMetric::Mood);
    let r = spearman_correlation(&concentrations, &mood);
    assert!(r.value > 0.99 && r.is_significant());

    let anxiety = MoodEntry::series(&entries, MoodMetric::Anxiety);
    assert!(anxiety[10].is_nan());
    let lagged = cross_correlation(&concentrations, &anxiety, 2, 5, &CrossCorrelationOptions::default());
    let at_zero = lagged.iter().find(|r| r.lag == Some(0)).unwrap();
    assert_eq!(at_zero.sample_size, 20);
    assert!(at_zero.value < -0.99);

    let fit = linear_regression(&concentrations, &mood).unwrap();
    assert_relative_eq!(fit.slope, 1.0 / 20.0, epsilon = 1e-9);
    assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-9);
}

#[test]
fn descriptive_summary_flags_outliers() {
    let mut values: Vec<f64> = (1..=20).map(f64::from).collect();
    values.push(200.0);

    let stats = descriptive_stats(&values).unwrap();
    assert_eq!(stats.count, 21);
    assert_eq!(stats.median, 11.0);
    assert!(stats.skewness > 0.0);

    let report = detect_outliers(&values, IQR_OUTLIER_MULTIPLIER).unwrap();
    assert_eq!(report.indices, vec![20]);
}
