//! Effect-compartment (biophase) concentrations.
//!
//! A hypothetical effect site is linked to plasma by a first-order
//! equilibration rate `ke0`, after a fixed `effect_lag`. With first-order
//! absorption the effect-site solution is a sum of three exponentials in
//! `Ke` (or each disposition rate), `Ka` and `ke0`.

use super::models::{absorption_response, triexponential};
use super::parameters::{
    applicable_doses, clamp_concentration, Disposition, PkParameters, NG_PER_ML_PER_MG_PER_L,
};
use crate::data::{Dose, Medication, Route};
use serde::{Deserialize, Serialize};

/// Used when neither the record nor the class table provides `ke0` (1/h)
pub const DEFAULT_KE0: f64 = 0.3;

/// Rates closer than this fall back to the equilibration-factor form
pub const EFFECT_RATE_EPS: f64 = 1e-6;

/// Resolved effect-compartment parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectSite {
    /// Equilibration rate (1/h)
    pub ke0: f64,
    /// Delay before equilibration starts (h)
    pub effect_lag: f64,
}

impl EffectSite {
    /// Record values first, then the class table, then the defaults
    pub fn for_medication(medication: &Medication) -> Self {
        let params = medication.effect.unwrap_or_default();

        let ke0 = params
            .ke0
            .filter(|k| k.is_finite() && *k > 0.0)
            .or_else(|| medication.drug_class.effect_equilibration_rate())
            .unwrap_or(DEFAULT_KE0);

        let effect_lag = params
            .effect_lag
            .filter(|l| l.is_finite() && *l >= 0.0)
            .or_else(|| medication.drug_class.effect_lag())
            .unwrap_or(0.0);

        Self { ke0, effect_lag }
    }

    /// Time for the effect site to reach half of a constant plasma level (h)
    pub fn equilibration_half_life(&self) -> f64 {
        std::f64::consts::LN_2 / self.ke0
    }
}

/// Effect-site concentration (ng/mL) `t` hours after a single dose
pub fn single_dose_effect(
    params: &PkParameters,
    site: &EffectSite,
    amount: f64,
    route: Route,
    t: f64,
) -> f64 {
    let tau = t - site.effect_lag;
    if tau <= 0.0 || !amount.is_finite() || amount <= 0.0 {
        return 0.0;
    }
    let ke0 = site.ke0;

    let exact = if route.is_extravascular() {
        oral_effect(params, ke0, amount, tau)
    } else {
        Some(bolus_effect(params, ke0, amount, tau))
    };

    match exact {
        Some(value) => clamp_concentration(value),
        None => {
            // Coincident rates: scale plasma by the equilibration factor
            let plasma = params.concentration(amount, route, tau);
            clamp_concentration(plasma * (1.0 - (-ke0 * tau).exp()))
        }
    }
}

/// Tri-exponential solution; `None` when two rates coincide
fn oral_effect(params: &PkParameters, ke0: f64, amount: f64, tau: f64) -> Option<f64> {
    let f = params.bioavailability;
    let ka = params.ka;

    let mg_per_l = match params.disposition {
        Disposition::OneCompartment => {
            let shape = triexponential(params.ke, ka, ke0, tau, EFFECT_RATE_EPS)?;
            f * amount * ka * ke0 / params.volume * shape
        }
        Disposition::TwoCompartment {
            alpha,
            peripheral_fraction,
            central_volume,
        } => {
            let distribution = triexponential(alpha, ka, ke0, tau, EFFECT_RATE_EPS)?;
            let elimination = triexponential(params.ke, ka, ke0, tau, EFFECT_RATE_EPS)?;
            f * amount * ka * ke0 / central_volume
                * (peripheral_fraction * distribution + (1.0 - peripheral_fraction) * elimination)
        }
    };
    Some(mg_per_l * NG_PER_ML_PER_MG_PER_L)
}

/// Bolus input: bi-exponential per disposition phase
fn bolus_effect(params: &PkParameters, ke0: f64, amount: f64, tau: f64) -> f64 {
    let mg_per_l = match params.disposition {
        Disposition::OneCompartment => {
            amount * ke0 / params.volume * absorption_response(ke0, params.ke, tau)
        }
        Disposition::TwoCompartment {
            alpha,
            peripheral_fraction,
            central_volume,
        } => {
            amount * ke0 / central_volume
                * (peripheral_fraction * absorption_response(ke0, alpha, tau)
                    + (1.0 - peripheral_fraction) * absorption_response(ke0, params.ke, tau))
        }
    };
    mg_per_l * NG_PER_ML_PER_MG_PER_L
}

/// Effect-site concentration (ng/mL) at `target_time` (epoch ms) by
/// superposition over all prior doses. Returns `0` for unusable records.
pub fn calculate_effect_concentration(
    medication: &Medication,
    doses: &[Dose],
    target_time: i64,
    body_weight: f64,
) -> f64 {
    let Some(params) = PkParameters::at_time(medication, doses, target_time, body_weight) else {
        return 0.0;
    };
    let site = EffectSite::for_medication(medication);

    let total: f64 = applicable_doses(medication, doses, target_time)
        .map(|d| single_dose_effect(&params, &site, d.dose_amount, d.route, d.hours_until(target_time)))
        .sum();
    clamp_concentration(total)
}
