//! Autoinduction: drugs that accelerate their own metabolism.
//!
//! For the listed drugs the half-life is not constant. It shortens linearly
//! from the start of induction to the point of full induction, and stays at
//! the reduced value afterwards.

use crate::data::{Medication, MS_PER_HOUR};

/// Known autoinducers, matched against the lower-cased medication name
pub const AUTOINDUCERS: [&str; 6] = [
    "carbamazepine",
    "rifampicin",
    "rifampin",
    "phenobarbital",
    "cyclophosphamide",
    "artemisinin",
];

/// Days after the first dose at which induction begins
pub const INDUCTION_ONSET_DAYS: f64 = 7.0;
/// Days after the first dose at which induction is complete
pub const INDUCTION_COMPLETE_DAYS: f64 = 21.0;
/// Half-life reduction at full induction
pub const MAX_HALF_LIFE_REDUCTION: f64 = 0.2;

pub fn is_autoinducer(medication: &Medication) -> bool {
    let name = medication.name.to_lowercase();
    AUTOINDUCERS.iter().any(|drug| name.contains(drug))
}

/// Fraction of full induction reached after `days` since the first dose
pub fn induction_fraction(days: f64) -> f64 {
    if !days.is_finite() {
        return 0.0;
    }
    ((days - INDUCTION_ONSET_DAYS) / (INDUCTION_COMPLETE_DAYS - INDUCTION_ONSET_DAYS)).clamp(0.0, 1.0)
}

/// Effective half-life (h) at `time` (epoch ms) given the first dose time
pub fn adjusted_half_life(medication: &Medication, first_dose: Option<i64>, time: i64) -> f64 {
    let Some(first) = first_dose else {
        return medication.half_life;
    };
    if !is_autoinducer(medication) {
        return medication.half_life;
    }

    let days = (time - first) as f64 / MS_PER_HOUR / 24.0;
    medication.half_life * (1.0 - MAX_HALF_LIFE_REDUCTION * induction_fraction(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DrugClass;
    use approx::assert_relative_eq;

    const DAY_MS: i64 = 24 * 3_600_000;

    fn carbamazepine() -> Medication {
        Medication::new("cbz", "Carbamazepine XR", DrugClass::Anticonvulsant, 35.0, 1.4, 0.85)
    }

    #[test]
    fn test_induction_ramp() {
        assert_eq!(induction_fraction(0.0), 0.0);
        assert_eq!(induction_fraction(7.0), 0.0);
        assert_relative_eq!(induction_fraction(14.0), 0.5);
        assert_eq!(induction_fraction(21.0), 1.0);
        assert_eq!(induction_fraction(60.0), 1.0);
    }

    #[test]
    fn test_adjusted_half_life_bounds() {
        let med = carbamazepine();
        assert!(is_autoinducer(&med));

        assert_eq!(adjusted_half_life(&med, Some(0), 3 * DAY_MS), 35.0);
        assert_relative_eq!(adjusted_half_life(&med, Some(0), 14 * DAY_MS), 35.0 * 0.9);
        assert_relative_eq!(adjusted_half_life(&med, Some(0), 30 * DAY_MS), 35.0 * 0.8);
        assert_eq!(adjusted_half_life(&med, None, 30 * DAY_MS), 35.0);
    }

    #[test]
    fn test_other_drugs_keep_constant_half_life() {
        let med = Medication::new("s", "Sertraline", DrugClass::Ssri, 26.0, 20.0, 0.44);
        assert!(!is_autoinducer(&med));
        assert_eq!(adjusted_half_life(&med, Some(0), 30 * DAY_MS), 26.0);
    }
}
