//! Steady-state accumulation for regular dosing
//!
//! The dosing interval is not configured anywhere; it is estimated from the
//! dose history as the median of the plausible inter-dose gaps. The
//! single-dose profile is then scaled by the accumulation factor
//! `R = 1 / (1 - e^{-Ke·τ})`.

use super::parameters::{applicable_doses, PkParameters};
use crate::data::{Dose, Medication, Route, MS_PER_HOUR};
use serde::{Deserialize, Serialize};

/// Shortest inter-dose gap (h) considered a dosing interval
pub const MIN_DOSING_INTERVAL: f64 = 4.0;
/// Longest inter-dose gap (h) considered a dosing interval
pub const MAX_DOSING_INTERVAL: f64 = 72.0;
/// Half-lives of regular dosing after which steady state is assumed
pub const HALF_LIVES_TO_STEADY_STATE: f64 = 5.0;

/// Samples of the single-dose profile used to locate its peak within τ
const PEAK_SEARCH_POINTS: usize = 240;

/// Steady-state exposure summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SteadyStateMetrics {
    /// Estimated dosing interval τ (h)
    pub dosing_interval: f64,
    /// Mean administered dose (mg)
    pub mean_dose: f64,
    /// `1 / (1 - e^{-Ke·τ})`
    pub accumulation_factor: f64,
    /// Average steady-state concentration (ng/mL)
    pub average_concentration: f64,
    /// Peak steady-state concentration (ng/mL)
    pub peak_concentration: f64,
    /// Trough steady-state concentration (ng/mL)
    pub trough_concentration: f64,
    /// Peak-trough fluctuation relative to the average
    pub fluctuation: f64,
    /// `5·halfLife` (h)
    pub time_to_steady_state: f64,
    /// Time since the first dose (h)
    pub elapsed: f64,
    /// `1 - e^{-Ke·elapsed}`
    pub fraction_of_steady_state: f64,
    pub at_steady_state: bool,
}

/// Median of the consecutive inter-dose gaps (h) that fall in
/// `[MIN_DOSING_INTERVAL, MAX_DOSING_INTERVAL]`
pub fn estimate_dosing_interval(doses: &[Dose]) -> Option<f64> {
    let mut times: Vec<i64> = doses.iter().map(|d| d.timestamp).collect();
    times.sort_unstable();

    let mut gaps: Vec<f64> = times
        .windows(2)
        .map(|w| (w[1] - w[0]) as f64 / MS_PER_HOUR)
        .filter(|gap| (MIN_DOSING_INTERVAL..=MAX_DOSING_INTERVAL).contains(gap))
        .collect();

    if gaps.is_empty() {
        return None;
    }
    gaps.sort_by(|a, b| a.total_cmp(b));

    let mid = gaps.len() / 2;
    Some(if gaps.len() % 2 == 0 {
        (gaps[mid - 1] + gaps[mid]) / 2.0
    } else {
        gaps[mid]
    })
}

/// Steady-state metrics at `now` (epoch ms).
///
/// `None` when the record is unusable or no dosing interval can be
/// estimated from the doses given up to `now`.
pub fn calculate_steady_state_metrics(
    medication: &Medication,
    doses: &[Dose],
    now: i64,
    body_weight: f64,
) -> Option<SteadyStateMetrics> {
    let params = PkParameters::at_time(medication, doses, now, body_weight)?;
    let taken: Vec<Dose> = applicable_doses(medication, doses, now)
        .filter(|d| d.validate().is_ok())
        .cloned()
        .collect();

    let tau = estimate_dosing_interval(&taken)?;
    let first = taken.iter().map(|d| d.timestamp).min()?;
    let route = taken
        .iter()
        .max_by_key(|d| d.timestamp)
        .map(|d| d.route)
        .unwrap_or(Route::Oral);
    let mean_dose = taken.iter().map(|d| d.dose_amount).sum::<f64>() / taken.len() as f64;

    let accumulation_factor = 1.0 / (1.0 - (-params.ke * tau).exp());
    let average_concentration = params.auc_inf(mean_dose, route) / tau;

    let single_peak = (0..=PEAK_SEARCH_POINTS)
        .map(|i| params.concentration(mean_dose, route, tau * i as f64 / PEAK_SEARCH_POINTS as f64))
        .fold(0.0_f64, f64::max);
    let single_trough = params.concentration(mean_dose, route, tau);

    let peak_concentration = single_peak * accumulation_factor;
    let trough_concentration = single_trough * accumulation_factor;
    let fluctuation = if average_concentration > 0.0 {
        (peak_concentration - trough_concentration) / average_concentration
    } else {
        0.0
    };

    let elapsed = ((now - first) as f64 / MS_PER_HOUR).max(0.0);
    let time_to_steady_state = HALF_LIVES_TO_STEADY_STATE * medication.half_life;

    Some(SteadyStateMetrics {
        dosing_interval: tau,
        mean_dose,
        accumulation_factor,
        average_concentration,
        peak_concentration,
        trough_concentration,
        fluctuation,
        time_to_steady_state,
        elapsed,
        fraction_of_steady_state: 1.0 - (-params.ke * elapsed).exp(),
        at_steady_state: elapsed >= time_to_steady_state,
    })
}
