use super::distributions::student_t_p_value;
use crate::error::KineticsError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlations are pulled inside this bound before the t statistic is formed
pub const MAX_ABS_CORRELATION: f64 = 0.999_999_999_9;

/// Smallest sample on which a correlation is reported
pub const MIN_CORRELATION_SAMPLES: usize = 3;

/// Correlation coefficient family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
}

/// Significance bucket of a p-value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    None,
    Low,
    Medium,
    High,
}

impl Significance {
    /// `p < 0.001` high, `< 0.01` medium, `< 0.05` low, otherwise none
    pub fn from_p_value(p: f64) -> Self {
        if p < 0.001 {
            Significance::High
        } else if p < 0.01 {
            Significance::Medium
        } else if p < 0.05 {
            Significance::Low
        } else {
            Significance::None
        }
    }

    pub fn is_significant(&self) -> bool {
        *self != Significance::None
    }
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Significance::None => "none",
            Significance::Low => "low",
            Significance::Medium => "medium",
            Significance::High => "high",
        };
        f.write_str(s)
    }
}

/// A correlation coefficient with its two-tailed significance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    /// Coefficient in `[-1, 1]`
    pub value: f64,
    /// Two-tailed p-value in `[0, 1]`
    pub p_value: f64,
    pub sample_size: usize,
    pub significance: Significance,
    pub method: CorrelationMethod,
    /// Lag (in samples) of `y` relative to `x`, for cross-correlations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lag: Option<i64>,
}

impl CorrelationResult {
    /// "No detectable correlation": value 0, p 1, significance none
    pub fn neutral(sample_size: usize, method: CorrelationMethod) -> Self {
        Self {
            value: 0.0,
            p_value: 1.0,
            sample_size,
            significance: Significance::None,
            method,
            lag: None,
        }
    }

    /// Build a result from a raw coefficient, testing it with `n - 2`
    /// degrees of freedom
    pub fn from_coefficient(r: f64, sample_size: usize, method: CorrelationMethod) -> Self {
        if !r.is_finite() || sample_size < MIN_CORRELATION_SAMPLES {
            return Self::neutral(sample_size, method);
        }

        let value = r.clamp(-1.0, 1.0);
        let clamped = value.clamp(-MAX_ABS_CORRELATION, MAX_ABS_CORRELATION);
        let df = (sample_size - 2) as f64;
        let t = clamped * (df / (1.0 - clamped * clamped)).sqrt();
        let p_value = student_t_p_value(t, df);

        Self {
            value,
            p_value,
            sample_size,
            significance: Significance::from_p_value(p_value),
            method,
            lag: None,
        }
    }

    pub fn with_lag(mut self, lag: i64) -> Self {
        self.lag = Some(lag);
        self
    }

    pub fn is_significant(&self) -> bool {
        self.significance.is_significant()
    }
}

/// Length shared by two paired series, if it meets `required`
pub fn paired_len(x: &[f64], y: &[f64], required: usize) -> Result<usize, KineticsError> {
    if x.len() != y.len() {
        return Err(KineticsError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.len() < required {
        return Err(KineticsError::InsufficientData {
            n: x.len(),
            required,
        });
    }
    Ok(x.len())
}

/// Pearson product-moment coefficient, `None` for zero variance or
/// non-finite input
pub(crate) fn pearson_coefficient(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denominator = (sxx * syy).sqrt();
    if !denominator.is_finite() || denominator == 0.0 {
        return None;
    }
    let r = sxy / denominator;
    r.is_finite().then_some(r)
}

/// Pearson correlation with Student-t significance.
///
/// Mismatched lengths, fewer than three pairs, non-finite values or a
/// constant series all give the neutral result.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> CorrelationResult {
    correlate(x, y, CorrelationMethod::Pearson)
}

/// Spearman rank correlation: Pearson on fractional ranks
pub fn spearman_correlation(x: &[f64], y: &[f64]) -> CorrelationResult {
    correlate(x, y, CorrelationMethod::Spearman)
}

/// Correlation by `method`
pub fn correlate(x: &[f64], y: &[f64], method: CorrelationMethod) -> CorrelationResult {
    let n = match paired_len(x, y, MIN_CORRELATION_SAMPLES) {
        Ok(n) => n,
        Err(e) => {
            tracing::debug!(?method, "neutral correlation: {}", e);
            return CorrelationResult::neutral(x.len().min(y.len()), method);
        }
    };
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return CorrelationResult::neutral(n, method);
    }

    let r = match method {
        CorrelationMethod::Pearson => pearson_coefficient(x, y),
        CorrelationMethod::Spearman => pearson_coefficient(&fractional_ranks(x), &fractional_ranks(y)),
    };

    match r {
        Some(r) => CorrelationResult::from_coefficient(r, n, method),
        None => CorrelationResult::neutral(n, method),
    }
}

/// 1-based ranks, ties sharing the average of the ranks they span.
///
/// Non-finite values rank after every finite value.
pub fn fractional_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // Positions i..=j hold equal values
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }
    ranks
}
