use super::autoinduction::adjusted_half_life;
use super::models::{
    one_compartment_bolus, one_compartment_oral, two_compartment_bolus, two_compartment_oral,
    COINCIDENT_RATE_EPS,
};
use crate::data::{Dose, Medication, Route};
use std::f64::consts::LN_2;

/// Conversion from mg/L to ng/mL
pub(crate) const NG_PER_ML_PER_MG_PER_L: f64 = 1000.0;

/// Above this volume of distribution (L/kg) the two-compartment model is used
pub const TWO_COMPARTMENT_VD_THRESHOLD: f64 = 10.0;

/// Added to Ka when it would coincide with Ke
pub const KA_KE_PERTURBATION: f64 = 1e-3;

/// Upper bound on the peripheral share of the disposition
pub const MAX_PERIPHERAL_FRACTION: f64 = 0.7;

/// Volume of distribution (L/kg) at which the peripheral share reaches 100%
/// before capping
const PERIPHERAL_SCALE_VD: f64 = 20.0;

/// Disposition model chosen from the volume of distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Disposition {
    OneCompartment,
    TwoCompartment {
        /// Distribution phase rate (1/h)
        alpha: f64,
        /// Share of the disposition that decays in the distribution phase
        peripheral_fraction: f64,
        /// Central volume (L)
        central_volume: f64,
    },
}

/// Kinetic parameters of one medication, resolved at one instant.
///
/// Resolution is where the parameter fallbacks live: Ka from the record, the
/// class table or `max(3·Ke, 0.5)`, and the autoinduced half-life.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PkParameters {
    pub half_life: f64,
    /// Elimination rate (1/h)
    pub ke: f64,
    /// Absorption rate (1/h), never equal to `ke`
    pub ka: f64,
    pub bioavailability: f64,
    /// Total volume of distribution (L)
    pub volume: f64,
    pub disposition: Disposition,
}

/// Doses of `medication` administered at or before `time`
pub(crate) fn applicable_doses<'a>(
    medication: &'a Medication,
    doses: &'a [Dose],
    time: i64,
) -> impl Iterator<Item = &'a Dose> + 'a {
    doses
        .iter()
        .filter(move |d| d.medication_id == medication.id && d.timestamp <= time)
}

/// Earliest applicable dose time
pub(crate) fn first_dose_time(medication: &Medication, doses: &[Dose], time: i64) -> Option<i64> {
    applicable_doses(medication, doses, time)
        .map(|d| d.timestamp)
        .min()
}

impl PkParameters {
    /// Resolve parameters at `time` (epoch ms).
    ///
    /// Returns `None` for unusable records: non-finite or non-positive
    /// half-life, volume, bioavailability or body weight.
    pub fn at_time(
        medication: &Medication,
        doses: &[Dose],
        time: i64,
        body_weight: f64,
    ) -> Option<Self> {
        if let Err(e) = medication.validate() {
            tracing::debug!(medication = %medication.id, "unusable medication record: {}", e);
            return None;
        }
        if !body_weight.is_finite() || body_weight <= 0.0 {
            tracing::debug!(body_weight, "unusable body weight");
            return None;
        }

        let first = first_dose_time(medication, doses, time);
        let half_life = adjusted_half_life(medication, first, time);
        Self::new(medication, half_life, body_weight)
    }

    /// Resolve parameters for an explicit half-life (h)
    pub fn new(medication: &Medication, half_life: f64, body_weight: f64) -> Option<Self> {
        if !half_life.is_finite() || half_life <= 0.0 {
            return None;
        }

        let ke = LN_2 / half_life;
        let ka = absorption_rate(medication, ke);
        let vd = medication.volume_of_distribution;
        let volume = vd * body_weight;
        if !ke.is_finite() || !ka.is_finite() || !volume.is_finite() || volume <= 0.0 {
            return None;
        }

        let disposition = if vd > TWO_COMPARTMENT_VD_THRESHOLD {
            let peripheral_fraction = (vd / PERIPHERAL_SCALE_VD).min(MAX_PERIPHERAL_FRACTION);
            Disposition::TwoCompartment {
                alpha: ka.min(3.0 * ke),
                peripheral_fraction,
                central_volume: volume * (1.0 - peripheral_fraction),
            }
        } else {
            Disposition::OneCompartment
        };

        Some(Self {
            half_life,
            ke,
            ka,
            bioavailability: medication.bioavailability,
            volume,
            disposition,
        })
    }

    /// Plasma concentration (ng/mL) `t` hours after a single dose
    pub fn concentration(&self, amount: f64, route: Route, t: f64) -> f64 {
        if t < 0.0 || !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }

        let mg_per_l = match (self.disposition, route.is_extravascular()) {
            (Disposition::OneCompartment, true) => {
                one_compartment_oral(amount, self.bioavailability, self.ka, self.ke, self.volume, t)
            }
            (Disposition::OneCompartment, false) => {
                one_compartment_bolus(amount, self.ke, self.volume, t)
            }
            (
                Disposition::TwoCompartment {
                    alpha,
                    peripheral_fraction,
                    central_volume,
                },
                true,
            ) => two_compartment_oral(
                amount,
                self.bioavailability,
                self.ka,
                alpha,
                self.ke,
                peripheral_fraction,
                central_volume,
                t,
            ),
            (
                Disposition::TwoCompartment {
                    alpha,
                    peripheral_fraction,
                    central_volume,
                },
                false,
            ) => two_compartment_bolus(amount, alpha, self.ke, peripheral_fraction, central_volume, t),
        };

        clamp_concentration(mg_per_l * NG_PER_ML_PER_MG_PER_L)
    }

    /// Area under the single-dose curve from zero to infinity (ng·h/mL)
    pub fn auc_inf(&self, amount: f64, route: Route) -> f64 {
        let f = if route.is_extravascular() {
            self.bioavailability
        } else {
            1.0
        };
        let mg_h_per_l = match self.disposition {
            Disposition::OneCompartment => f * amount / (self.volume * self.ke),
            Disposition::TwoCompartment {
                alpha,
                peripheral_fraction,
                central_volume,
            } => {
                f * amount / central_volume
                    * (peripheral_fraction / alpha + (1.0 - peripheral_fraction) / self.ke)
            }
        };
        clamp_concentration(mg_h_per_l * NG_PER_ML_PER_MG_PER_L)
    }
}

/// Absorption rate with the record, class-table and `max(3·Ke, 0.5)`
/// fallbacks, kept away from `ke`
pub(crate) fn absorption_rate(medication: &Medication, ke: f64) -> f64 {
    let ka = match medication.absorption_rate {
        Some(ka) if ka.is_finite() && ka > 0.0 => ka,
        _ => medication
            .drug_class
            .absorption_rate()
            .unwrap_or_else(|| (3.0 * ke).max(0.5)),
    };

    if (ka - ke).abs() < COINCIDENT_RATE_EPS {
        ka + KA_KE_PERTURBATION
    } else {
        ka
    }
}

/// Clamp to a finite, non-negative value
pub(crate) fn clamp_concentration(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
