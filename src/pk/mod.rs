//! Pharmacokinetic concentration engine
//!
//! Concentrations are computed in closed form by superposition: every dose
//! given at or before the target time contributes an independent single-dose
//! curve, and the contributions are summed.
//!
//! | Volume of distribution | Model |
//! |------------------------|-------|
//! | ≤ 10 L/kg | One compartment, first-order absorption (Bateman) |
//! | > 10 L/kg | Two compartment, bi-exponential disposition |
//!
//! All functions are pure. Unusable medication records (non-finite or
//! non-positive half-life, volume, bioavailability, or body weight) never
//! panic: they produce a zero concentration, so a dashboard on messy data
//! shows "no detectable drug" instead of failing.
//!
//! # Usage
//!
//! ```rust
//! use moodkinetics::prelude::*;
//!
//! let med = Medication::new("m1", "Sertraline", DrugClass::Ssri, 26.0, 20.0, 0.44);
//! let doses = vec![Dose::new("d1", "m1", 0, 50.0)];
//!
//! let six_hours = 6 * 3_600_000;
//! let c = calculate_concentration(&med, &doses, six_hours, DEFAULT_BODY_WEIGHT);
//! assert!(c > 0.0);
//!
//! let curve = generate_concentration_curve(&med, &doses, 0, 48 * 3_600_000, 96, DEFAULT_BODY_WEIGHT);
//! assert_eq!(curve.len(), 97);
//! ```

mod adherence;
mod autoinduction;
mod effect;
mod models;
mod parameters;
mod steady_state;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::{Dose, Medication};
use parameters::clamp_concentration;

pub use adherence::{calculate_adherence_effect_lag, AdherenceEffectLag, MISSED_DOSE_FACTOR};
pub use autoinduction::{
    adjusted_half_life, induction_fraction, is_autoinducer, AUTOINDUCERS,
    INDUCTION_COMPLETE_DAYS, INDUCTION_ONSET_DAYS, MAX_HALF_LIFE_REDUCTION,
};
pub use effect::{
    calculate_effect_concentration, single_dose_effect, EffectSite, DEFAULT_KE0, EFFECT_RATE_EPS,
};
pub use models::{
    absorption_response, one_compartment_bolus, one_compartment_oral, triexponential,
    two_compartment_bolus, two_compartment_oral,
};
pub use parameters::{
    Disposition, PkParameters, KA_KE_PERTURBATION, MAX_PERIPHERAL_FRACTION,
    TWO_COMPARTMENT_VD_THRESHOLD,
};
pub use steady_state::{
    calculate_steady_state_metrics, estimate_dosing_interval, SteadyStateMetrics,
    HALF_LIVES_TO_STEADY_STATE, MAX_DOSING_INTERVAL, MIN_DOSING_INTERVAL,
};

/// Body weight (kg) assumed when none is known
pub const DEFAULT_BODY_WEIGHT: f64 = 70.0;

/// Number of curve intervals used when the caller has no preference
pub const DEFAULT_CURVE_POINTS: usize = 100;

/// Plasma concentration at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcentrationSample {
    /// Epoch ms
    pub time: i64,
    /// ng/mL, never negative
    pub concentration: f64,
}

/// Plasma and effect-site concentration at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DualConcentrationSample {
    /// Epoch ms
    pub time: i64,
    /// ng/mL
    pub plasma: f64,
    /// ng/mL
    pub effect: f64,
}

/// Plasma concentration (ng/mL) of `medication` at `target_time` (epoch ms).
///
/// Doses of other medications and doses after `target_time` are ignored.
/// Returns `0` for unusable records.
pub fn calculate_concentration(
    medication: &Medication,
    doses: &[Dose],
    target_time: i64,
    body_weight: f64,
) -> f64 {
    let Some(params) = PkParameters::at_time(medication, doses, target_time, body_weight) else {
        return 0.0;
    };

    let total: f64 = parameters::applicable_doses(medication, doses, target_time)
        .map(|d| params.concentration(d.dose_amount, d.route, d.hours_until(target_time)))
        .sum();
    clamp_concentration(total)
}

/// Sample instants for a curve of `points` intervals: `points + 1` evenly
/// spaced times from `start` to `end`.
///
/// A zero-width range repeats `start` and a reversed range runs backwards.
/// With `points == 0` the only sample is `start`.
pub fn sample_times(start: i64, end: i64, points: usize) -> Vec<i64> {
    if points == 0 {
        return vec![start];
    }
    let span = end as f64 - start as f64;
    (0..=points)
        .map(|i| start + (span * i as f64 / points as f64).round() as i64)
        .collect()
}

/// Concentration curve over `[start, end]` with `points + 1` samples.
///
/// Cost is `O(points × doses)`; samples are evaluated in parallel.
pub fn generate_concentration_curve(
    medication: &Medication,
    doses: &[Dose],
    start: i64,
    end: i64,
    points: usize,
    body_weight: f64,
) -> Vec<ConcentrationSample> {
    sample_times(start, end, points)
        .into_par_iter()
        .map(|time| ConcentrationSample {
            time,
            concentration: calculate_concentration(medication, doses, time, body_weight),
        })
        .collect()
}

/// Plasma and effect-site curves over `[start, end]` with `points + 1` samples
pub fn generate_dual_concentration_curves(
    medication: &Medication,
    doses: &[Dose],
    start: i64,
    end: i64,
    points: usize,
    body_weight: f64,
) -> Vec<DualConcentrationSample> {
    sample_times(start, end, points)
        .into_par_iter()
        .map(|time| DualConcentrationSample {
            time,
            plasma: calculate_concentration(medication, doses, time, body_weight),
            effect: calculate_effect_concentration(medication, doses, time, body_weight),
        })
        .collect()
}
