use crate::data::{Dose, Medication};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Width of the time bucket for point lookups
pub const TIME_BUCKET_MS: i64 = 60_000;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct DoseFingerprint(u64);

impl DoseFingerprint {
    /// Hash of the sorted `id:timestamp:amount:route` entries, so the order
    /// of the dose slice does not matter
    pub(crate) fn new(doses: &[Dose]) -> Self {
        let mut entries: Vec<String> = doses
            .iter()
            .map(|d| {
                format!(
                    "{}:{}:{}:{}",
                    d.id,
                    d.timestamp,
                    d.dose_amount.to_bits(),
                    d.route.as_str()
                )
            })
            .collect();
        entries.sort_unstable();

        let mut hasher = DefaultHasher::new();
        for entry in &entries {
            entry.hash(&mut hasher);
        }
        DoseFingerprint(hasher.finish())
    }
}

/// Hash of the kinetic fields, so an edited record under the same id does
/// not hit entries computed from the old values
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct MedicationHash(u64);

impl MedicationHash {
    pub(crate) fn new(medication: &Medication) -> Self {
        let mut hasher = DefaultHasher::new();
        medication.name.hash(&mut hasher);
        medication.drug_class.hash(&mut hasher);
        for value in [
            medication.half_life,
            medication.volume_of_distribution,
            medication.bioavailability,
        ] {
            value.to_bits().hash(&mut hasher);
        }
        medication.absorption_rate.map(f64::to_bits).hash(&mut hasher);
        if let Some(effect) = medication.effect {
            effect.ke0.map(f64::to_bits).hash(&mut hasher);
            effect.effect_lag.map(f64::to_bits).hash(&mut hasher);
        }
        MedicationHash(hasher.finish())
    }
}

/// Fields shared by point and curve keys
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct KeyBase {
    pub(crate) formula_version: u32,
    pub(crate) medication_id: String,
    medication: MedicationHash,
    doses: DoseFingerprint,
    body_weight: u64,
}

impl KeyBase {
    fn new(formula_version: u32, medication: &Medication, doses: &[Dose], body_weight: f64) -> Self {
        Self {
            formula_version,
            medication_id: medication.id.clone(),
            medication: MedicationHash::new(medication),
            doses: DoseFingerprint::new(doses),
            body_weight: body_weight.to_bits(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum CacheKey {
    Point {
        base: KeyBase,
        /// Target time bucketed to the minute
        minute: i64,
    },
    Curve {
        base: KeyBase,
        start: i64,
        end: i64,
        points: usize,
    },
}

impl CacheKey {
    pub(crate) fn point(
        formula_version: u32,
        medication: &Medication,
        doses: &[Dose],
        time: i64,
        body_weight: f64,
    ) -> Self {
        CacheKey::Point {
            base: KeyBase::new(formula_version, medication, doses, body_weight),
            minute: time.div_euclid(TIME_BUCKET_MS),
        }
    }

    pub(crate) fn curve(
        formula_version: u32,
        medication: &Medication,
        doses: &[Dose],
        start: i64,
        end: i64,
        points: usize,
        body_weight: f64,
    ) -> Self {
        CacheKey::Curve {
            base: KeyBase::new(formula_version, medication, doses, body_weight),
            start,
            end,
            points,
        }
    }

    pub(crate) fn base(&self) -> &KeyBase {
        match self {
            CacheKey::Point { base, .. } | CacheKey::Curve { base, .. } => base,
        }
    }

    pub(crate) fn is_curve(&self) -> bool {
        matches!(self, CacheKey::Curve { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DrugClass;

    fn med() -> Medication {
        Medication::new("m", "Testamine", DrugClass::Other, 12.0, 5.0, 0.8)
    }

    #[test]
    fn test_fingerprint_ignores_order() {
        let a = Dose::new("d1", "m", 0, 10.0);
        let b = Dose::new("d2", "m", 3_600_000, 20.0);
        assert_eq!(
            DoseFingerprint::new(&[a.clone(), b.clone()]),
            DoseFingerprint::new(&[b.clone(), a.clone()])
        );

        let mut changed = b;
        changed.dose_amount = 25.0;
        assert_ne!(
            DoseFingerprint::new(&[a.clone(), changed]),
            DoseFingerprint::new(&[a, Dose::new("d2", "m", 3_600_000, 20.0)])
        );
    }

    #[test]
    fn test_point_keys_bucket_by_minute() {
        let doses = [Dose::new("d1", "m", 0, 10.0)];
        let k1 = CacheKey::point(1, &med(), &doses, 120_000, 70.0);
        let k2 = CacheKey::point(1, &med(), &doses, 179_999, 70.0);
        let k3 = CacheKey::point(1, &med(), &doses, 180_000, 70.0);
        assert_eq!(k1, k2);
        assert_ne!(k1, k3);

        // Negative times bucket downwards too
        let n1 = CacheKey::point(1, &med(), &doses, -1, 70.0);
        let n2 = CacheKey::point(1, &med(), &doses, -60_000, 70.0);
        assert_eq!(n1, n2);
    }

    #[test]
    fn test_version_weight_and_record_are_part_of_the_key() {
        let doses = [Dose::new("d1", "m", 0, 10.0)];
        let base = CacheKey::point(1, &med(), &doses, 0, 70.0);
        assert_ne!(base, CacheKey::point(2, &med(), &doses, 0, 70.0));
        assert_ne!(base, CacheKey::point(1, &med(), &doses, 0, 80.0));

        let mut edited = med();
        edited.half_life = 24.0;
        assert_ne!(base, CacheKey::point(1, &edited, &doses, 0, 70.0));
        assert_eq!(base.base().medication_id, "m");
        assert!(!base.is_curve());
    }
}
