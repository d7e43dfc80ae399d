//! Statistics engine
//!
//! Pure functions over numeric slices. Correlations come with a two-tailed
//! Student-t p-value computed from scratch (see [`distributions`]), and
//! degrade to a neutral "no correlation" result instead of failing when the
//! sample is too small or malformed:
//!
//! | Input | Result |
//! |-------|--------|
//! | fewer than 3 pairs | `{value: 0, p: 1, none}` |
//! | mismatched lengths | `{value: 0, p: 1, none}` |
//! | constant or non-finite series | `{value: 0, p: 1, none}` |
//!
//! # Usage
//!
//! ```rust
//! use moodkinetics::stats::*;
//!
//! let concentration = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
//! let mood = [2.0, 2.5, 3.5, 3.0, 4.5, 5.0];
//!
//! let r = spearman_correlation(&concentration, &mood);
//! assert!(r.value > 0.8);
//! assert!(r.is_significant());
//! ```

pub mod distributions;

mod correlation;
mod cross;
mod descriptive;
mod regression;

pub use correlation::{
    correlate, fractional_ranks, paired_len, pearson_correlation, spearman_correlation,
    CorrelationMethod, CorrelationResult, Significance, MAX_ABS_CORRELATION,
    MIN_CORRELATION_SAMPLES,
};
pub use cross::{
    aligned_pairs, cross_correlation, first_difference, strongest_lag, CrossCorrelationOptions,
    SeriesTransform,
};
pub use descriptive::{
    autocorrelation, descriptive_stats, detect_outliers, quantile, DescriptiveStats,
    OutlierReport, IQR_OUTLIER_MULTIPLIER,
};
pub use regression::{linear_regression, LinearRegression};
