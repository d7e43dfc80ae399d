//! Pharmacokinetic modelling and mood correlation
//!
//! `moodkinetics` estimates how much of a medication is in the body at any
//! moment from a dose log, and relates those concentrations to self-reported
//! mood over time.
//!
//! - [`pk`] closed-form concentration engine (one and two compartment,
//!   effect site, steady state, adherence)
//! - [`stats`] correlation, cross-correlation, regression and descriptive
//!   statistics
//! - [`cache`] memoizing front end for repeated concentration lookups
//! - [`data`] the medication, dose and mood records everything operates on

pub mod cache;
pub mod data;
pub mod error;
pub mod pk;
pub mod stats;

pub use crate::data::*;
pub use error::KineticsError;

pub mod prelude {
    pub mod data {
        pub use crate::data::{
            Dose, DrugClass, EffectParams, Medication, MoodEntry, MoodMetric, Route, MS_PER_HOUR,
        };
    }
    pub mod pk {
        pub use crate::pk::{
            calculate_adherence_effect_lag, calculate_effect_concentration,
            calculate_steady_state_metrics, estimate_dosing_interval, AdherenceEffectLag,
            EffectSite, PkParameters, SteadyStateMetrics,
        };
    }
    pub mod stats {
        pub use crate::stats::{
            correlate, cross_correlation, descriptive_stats, linear_regression,
            pearson_correlation, spearman_correlation, strongest_lag, CorrelationMethod,
            CorrelationResult, CrossCorrelationOptions, Significance,
        };
    }

    pub use crate::cache::{
        CacheOptions, CacheStats, Clock, ConcentrationCache, ConcentrationModel, ManualClock,
        PkEngine, SystemClock,
    };
    pub use crate::data::*;
    pub use crate::error::KineticsError;
    pub use crate::pk::{
        calculate_concentration, generate_concentration_curve, generate_dual_concentration_curves,
        ConcentrationSample, DualConcentrationSample, DEFAULT_BODY_WEIGHT, DEFAULT_CURVE_POINTS,
    };
}
