//! Descriptive statistics, autocorrelation and IQR outlier detection

use serde::{Deserialize, Serialize};

/// Tukey fence multiplier for outlier detection
pub const IQR_OUTLIER_MULTIPLIER: f64 = 1.5;

/// Fewest finite values for which quartile fences are computed
const MIN_OUTLIER_SAMPLES: usize = 4;

/// Summary of a sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptiveStats {
    /// Number of finite values summarised
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Most frequent value; `None` when no value repeats. Ties resolve to the
    /// smallest value.
    pub mode: Option<f64>,
    /// Sample variance (n - 1)
    pub variance: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    /// Moment coefficient of skewness
    pub skewness: f64,
    /// Excess kurtosis
    pub kurtosis: f64,
}

/// Quantile `p ∈ [0, 1]` of ascending `sorted` values by linear
/// interpolation between closest ranks
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        }
    }
}

fn finite_sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

fn mode(sorted: &[f64]) -> Option<f64> {
    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j + 1 < sorted.len() && sorted[j + 1] == sorted[i] {
            j += 1;
        }
        let run = j - i + 1;
        if run > 1 && best.map_or(true, |(_, count)| run > count) {
            best = Some((sorted[i], run));
        }
        i = j + 1;
    }
    best.map(|(value, _)| value)
}

/// Summary statistics of the finite values in `values`; `None` if there are
/// none
pub fn descriptive_stats(values: &[f64]) -> Option<DescriptiveStats> {
    let sorted = finite_sorted(values);
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let nf = n as f64;

    let mean = sorted.iter().sum::<f64>() / nf;
    let (m2, m3, m4) = sorted.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), &v| {
        let d = v - mean;
        let d2 = d * d;
        (m2 + d2, m3 + d2 * d, m4 + d2 * d2)
    });
    let (m2, m3, m4) = (m2 / nf, m3 / nf, m4 / nf);

    let variance = if n > 1 { m2 * nf / (nf - 1.0) } else { 0.0 };
    let (skewness, kurtosis) = if m2 > 0.0 {
        (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
    } else {
        (0.0, 0.0)
    };

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);

    Some(DescriptiveStats {
        count: n,
        mean,
        median: quantile(&sorted, 0.5),
        mode: mode(&sorted),
        variance,
        std_dev: variance.sqrt(),
        min: sorted[0],
        max: sorted[n - 1],
        q1,
        q3,
        iqr: q3 - q1,
        skewness,
        kurtosis,
    })
}

/// Autocorrelation of `values` at lags `0..=max_lag`.
///
/// A constant, empty or non-finite series has no defined autocorrelation and
/// yields all zeros; lags at or beyond the series length are zero.
pub fn autocorrelation(values: &[f64], max_lag: usize) -> Vec<f64> {
    let n = values.len();
    let mut acf = vec![0.0; max_lag + 1];
    if n == 0 || values.iter().any(|v| !v.is_finite()) {
        return acf;
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let denominator: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    if denominator == 0.0 {
        return acf;
    }

    for (lag, slot) in acf.iter_mut().enumerate().take(n) {
        let numerator: f64 = values
            .iter()
            .zip(&values[lag..])
            .map(|(a, b)| (a - mean) * (b - mean))
            .sum();
        *slot = numerator / denominator;
    }
    acf
}

/// Values outside the Tukey fences `[q1 - k·IQR, q3 + k·IQR]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlierReport {
    pub lower_fence: f64,
    pub upper_fence: f64,
    /// Indices into the input slice
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

/// IQR outlier detection; `None` with fewer than four finite values.
///
/// Non-finite inputs are never reported.
pub fn detect_outliers(values: &[f64], multiplier: f64) -> Option<OutlierReport> {
    let sorted = finite_sorted(values);
    if sorted.len() < MIN_OUTLIER_SAMPLES {
        return None;
    }

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower_fence = q1 - multiplier * iqr;
    let upper_fence = q3 + multiplier * iqr;

    let (indices, values) = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite() && (**v < lower_fence || **v > upper_fence))
        .map(|(i, &v)| (i, v))
        .unzip();

    Some(OutlierReport {
        lower_fence,
        upper_fence,
        indices,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_basic_summary() {
        let stats = descriptive_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.count, 8);
        assert_relative_eq!(stats.mean, 5.0);
        assert_relative_eq!(stats.median, 4.5);
        assert_eq!(stats.mode, Some(4.0));
        // Population variance is 4, sample variance 32/7
        assert_relative_eq!(stats.variance, 32.0 / 7.0);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert_relative_eq!(stats.q1, 4.0);
        assert_relative_eq!(stats.q3, 5.5);
        assert_relative_eq!(stats.iqr, 1.5);
        assert!(stats.skewness > 0.0);
    }

    #[test]
    fn test_symmetric_sample_has_no_skew() {
        let stats = descriptive_stats(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_relative_eq!(stats.skewness, 0.0, epsilon = 1e-12);
        // Uniform-like samples are platykurtic
        assert!(stats.kurtosis < 0.0);
        assert_eq!(stats.mode, None);
    }

    #[test]
    fn test_ignores_non_finite_and_handles_single_value() {
        let stats = descriptive_stats(&[f64::NAN, 3.0, f64::INFINITY]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.skewness, 0.0);

        assert!(descriptive_stats(&[]).is_none());
        assert!(descriptive_stats(&[f64::NAN]).is_none());
    }

    #[test]
    fn test_quantile_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(quantile(&sorted, 0.5), 2.5);
        assert_relative_eq!(quantile(&sorted, 0.0), 1.0);
        assert_relative_eq!(quantile(&sorted, 1.0), 4.0);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn test_autocorrelation() {
        let alternating: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let acf = autocorrelation(&alternating, 2);
        assert_relative_eq!(acf[0], 1.0);
        assert_relative_eq!(acf[1], -19.0 / 20.0);
        assert_relative_eq!(acf[2], 18.0 / 20.0);

        assert_eq!(autocorrelation(&[3.0, 3.0, 3.0], 1), vec![0.0, 0.0]);
        assert_eq!(autocorrelation(&[1.0, 2.0], 4)[3], 0.0);
    }

    #[test]
    fn test_outliers() {
        let values = [10.0, 11.0, 12.0, 11.5, 10.5, 50.0, f64::NAN, -20.0];
        let report = detect_outliers(&values, IQR_OUTLIER_MULTIPLIER).unwrap();
        assert_eq!(report.indices, vec![5, 7]);
        assert_eq!(report.values, vec![50.0, -20.0]);
        assert!(report.lower_fence < 10.0 && report.upper_fence > 12.0);

        assert!(detect_outliers(&[1.0, 2.0, 3.0], IQR_OUTLIER_MULTIPLIER).is_none());
    }
}
