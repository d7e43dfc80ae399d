use super::effect::EffectSite;
use super::parameters::{applicable_doses, PkParameters};
use super::steady_state::estimate_dosing_interval;
use crate::data::{Dose, Medication, MS_PER_HOUR};
use serde::{Deserialize, Serialize};

/// A gap longer than this many dosing intervals counts as a missed dose
pub const MISSED_DOSE_FACTOR: f64 = 1.5;

/// How quickly adherence changes show up at the effect site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdherenceEffectLag {
    /// Fixed effect lag (h)
    pub effect_lag: f64,
    /// `ln2 / ke0` (h)
    pub equilibration_half_life: f64,
    /// Time from a dose until the effect site reaches half of plasma (h)
    pub onset_hours: f64,
    /// Time from a missed dose until the effect has halved (h)
    pub offset_hours: f64,
    /// Estimated dosing interval (h), if one could be estimated
    pub dosing_interval: Option<f64>,
    pub expected_doses: usize,
    pub taken_doses: usize,
    /// `taken / expected`, clamped to `[0, 1]`
    pub adherence_rate: f64,
    /// Gaps, including the one still open at `now`, longer than
    /// `MISSED_DOSE_FACTOR · τ`
    pub missed_intervals: usize,
}

/// Effect timing and adherence summary at `now` (epoch ms).
///
/// `None` for unusable records or when no dose was taken before `now`.
pub fn calculate_adherence_effect_lag(
    medication: &Medication,
    doses: &[Dose],
    now: i64,
) -> Option<AdherenceEffectLag> {
    // Body weight does not affect any of the timings
    let params = PkParameters::at_time(medication, doses, now, 1.0)?;
    let site = EffectSite::for_medication(medication);

    let mut times: Vec<i64> = applicable_doses(medication, doses, now)
        .map(|d| d.timestamp)
        .collect();
    times.sort_unstable();
    let first = *times.first()?;
    let last = *times.last()?;

    let taken: Vec<Dose> = applicable_doses(medication, doses, now).cloned().collect();
    let dosing_interval = estimate_dosing_interval(&taken);
    let taken_doses = times.len();

    let (expected_doses, missed_intervals) = match dosing_interval {
        Some(tau) => {
            let elapsed = (now - first) as f64 / MS_PER_HOUR;
            let expected = (elapsed / tau).floor() as usize + 1;

            let threshold = MISSED_DOSE_FACTOR * tau;
            let closed = times
                .windows(2)
                .filter(|w| (w[1] - w[0]) as f64 / MS_PER_HOUR > threshold)
                .count();
            let open = usize::from((now - last) as f64 / MS_PER_HOUR > threshold);
            (expected, closed + open)
        }
        None => (taken_doses, 0),
    };

    let adherence_rate = if expected_doses == 0 {
        1.0
    } else {
        (taken_doses as f64 / expected_doses as f64).clamp(0.0, 1.0)
    };

    let equilibration_half_life = site.equilibration_half_life();
    Some(AdherenceEffectLag {
        effect_lag: site.effect_lag,
        equilibration_half_life,
        onset_hours: site.effect_lag + equilibration_half_life,
        offset_hours: site.effect_lag + params.half_life + equilibration_half_life,
        dosing_interval,
        expected_doses,
        taken_doses,
        adherence_rate,
        missed_intervals,
    })
}
