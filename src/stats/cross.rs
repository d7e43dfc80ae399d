//! Lag-sweep cross-correlation
//!
//! Used to find the delay between a concentration series and a mood signal
//! sampled on the same grid: the series are shifted against each other one
//! sample at a time and correlated at every shift.

use super::correlation::{correlate, CorrelationMethod, CorrelationResult, MIN_CORRELATION_SAMPLES};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Pre-transform applied to both series before pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesTransform {
    /// Use the raw values
    #[default]
    None,
    /// Use `v[i+1] - v[i]`, removing shared trends
    FirstDifference,
}

/// Cross-correlation configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossCorrelationOptions {
    /// Coefficient used at each lag (default: Pearson)
    pub method: CorrelationMethod,
    /// Series pre-transform (default: none)
    pub transform: SeriesTransform,
}

impl CrossCorrelationOptions {
    pub fn with_method(mut self, method: CorrelationMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_transform(mut self, transform: SeriesTransform) -> Self {
        self.transform = transform;
        self
    }
}

/// First differences; a non-finite neighbour yields a non-finite difference
pub fn first_difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Finite pairs of `x` and `y` shifted by `lag`.
///
/// A positive lag pairs `x[i]` with `y[i + lag]` (y follows x); a negative
/// lag pairs `x[i + |lag|]` with `y[i]`.
pub fn aligned_pairs(x: &[f64], y: &[f64], lag: i64) -> (Vec<f64>, Vec<f64>) {
    let shift = lag.unsigned_abs() as usize;
    let (lead, follow, swapped) = if lag >= 0 { (x, y, false) } else { (y, x, true) };

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (i, &a) in lead.iter().enumerate() {
        let Some(&b) = follow.get(i + shift) else {
            break;
        };
        if !a.is_finite() || !b.is_finite() {
            continue;
        }
        if swapped {
            xs.push(b);
            ys.push(a);
        } else {
            xs.push(a);
            ys.push(b);
        }
    }
    (xs, ys)
}

/// Correlate `x` and `y` at every lag in `[-max_lag, max_lag]`.
///
/// Results are ordered by lag and each carries its lag. A lag with fewer
/// than `min_pairs` (and never fewer than three) finite pairs reports the
/// neutral result. `max_lag` is capped at the length of the longer series.
pub fn cross_correlation(
    x: &[f64],
    y: &[f64],
    max_lag: usize,
    min_pairs: usize,
    options: &CrossCorrelationOptions,
) -> Vec<CorrelationResult> {
    let (x, y) = match options.transform {
        SeriesTransform::None => (x.to_vec(), y.to_vec()),
        SeriesTransform::FirstDifference => (first_difference(x), first_difference(y)),
    };
    let required = min_pairs.max(MIN_CORRELATION_SAMPLES);
    // Lags past the longer series can never pair
    let longest = x.len().max(y.len());
    let max_lag = i64::try_from(max_lag.min(longest)).unwrap_or(i64::MAX);

    (-max_lag..=max_lag)
        .into_par_iter()
        .map(|lag| {
            let (xs, ys) = aligned_pairs(&x, &y, lag);
            let result = if xs.len() < required {
                CorrelationResult::neutral(xs.len(), options.method)
            } else {
                correlate(&xs, &ys, options.method)
            };
            result.with_lag(lag)
        })
        .collect()
}

/// The lag with the strongest correlation.
///
/// Largest `|r|` wins; ties go to the lower p-value, then the smaller
/// `|lag|`. Neutral results are never selected.
pub fn strongest_lag(results: &[CorrelationResult]) -> Option<CorrelationResult> {
    results
        .iter()
        .filter(|r| r.p_value < 1.0 || r.value != 0.0)
        .copied()
        .min_by(|a, b| {
            b.value
                .abs()
                .total_cmp(&a.value.abs())
                .then_with(|| a.p_value.total_cmp(&b.p_value))
                .then_with(|| {
                    let la = a.lag.map_or(i64::MAX, i64::abs);
                    let lb = b.lag.map_or(i64::MAX, i64::abs);
                    la.cmp(&lb)
                })
        })
}
