//! Medication reference data and the per-class kinetic lookup tables
//!
//! [`Medication`] records are created and updated by the persistence layer;
//! this crate only reads them. Missing kinetic parameters are filled from the
//! [`DrugClass`] tables, which are exhaustive `match` expressions so a new
//! class cannot be added without deciding its values.

use crate::error::KineticsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pharmacological class of a medication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DrugClass {
    /// Selective serotonin reuptake inhibitor
    Ssri,
    /// Serotonin-norepinephrine reuptake inhibitor
    Snri,
    Tricyclic,
    /// Monoamine oxidase inhibitor
    Maoi,
    Benzodiazepine,
    Stimulant,
    Antipsychotic,
    MoodStabilizer,
    Anticonvulsant,
    Opioid,
    Nsaid,
    Antihistamine,
    Hypnotic,
    /// Any class without tabulated parameters
    #[default]
    Other,
}

impl DrugClass {
    /// First-order absorption rate constant Ka (1/h) typical for the class
    pub fn absorption_rate(&self) -> Option<f64> {
        match self {
            DrugClass::Ssri => Some(0.5),
            DrugClass::Snri => Some(0.6),
            DrugClass::Tricyclic => Some(0.4),
            DrugClass::Maoi => Some(1.0),
            DrugClass::Benzodiazepine => Some(1.8),
            DrugClass::Stimulant => Some(1.2),
            DrugClass::Antipsychotic => Some(0.7),
            DrugClass::MoodStabilizer => Some(0.8),
            DrugClass::Anticonvulsant => Some(0.6),
            DrugClass::Opioid => Some(1.5),
            DrugClass::Nsaid => Some(1.4),
            DrugClass::Antihistamine => Some(1.0),
            DrugClass::Hypnotic => Some(2.0),
            DrugClass::Other => None,
        }
    }

    /// Plasma to effect-site equilibration rate ke0 (1/h)
    pub fn effect_equilibration_rate(&self) -> Option<f64> {
        match self {
            DrugClass::Ssri => Some(0.05),
            DrugClass::Snri => Some(0.06),
            DrugClass::Tricyclic => Some(0.08),
            DrugClass::Maoi => Some(0.1),
            DrugClass::Benzodiazepine => Some(0.9),
            DrugClass::Stimulant => Some(0.8),
            DrugClass::Antipsychotic => Some(0.15),
            DrugClass::MoodStabilizer => Some(0.04),
            DrugClass::Anticonvulsant => Some(0.2),
            DrugClass::Opioid => Some(0.6),
            DrugClass::Nsaid => Some(0.5),
            DrugClass::Antihistamine => Some(0.4),
            DrugClass::Hypnotic => Some(1.2),
            DrugClass::Other => None,
        }
    }

    /// Fixed delay (h) between plasma exposure and the start of equilibration
    pub fn effect_lag(&self) -> Option<f64> {
        match self {
            DrugClass::Ssri => Some(2.0),
            DrugClass::Snri => Some(1.5),
            DrugClass::Tricyclic => Some(2.0),
            DrugClass::Maoi => Some(1.0),
            DrugClass::Benzodiazepine => Some(0.25),
            DrugClass::Stimulant => Some(0.5),
            DrugClass::Antipsychotic => Some(1.0),
            DrugClass::MoodStabilizer => Some(4.0),
            DrugClass::Anticonvulsant => Some(1.0),
            DrugClass::Opioid => Some(0.25),
            DrugClass::Nsaid => Some(0.5),
            DrugClass::Antihistamine => Some(0.5),
            DrugClass::Hypnotic => Some(0.25),
            DrugClass::Other => None,
        }
    }

    /// Canonical snake_case name, as written back to storage
    pub fn as_str(&self) -> &'static str {
        match self {
            DrugClass::Ssri => "ssri",
            DrugClass::Snri => "snri",
            DrugClass::Tricyclic => "tricyclic",
            DrugClass::Maoi => "maoi",
            DrugClass::Benzodiazepine => "benzodiazepine",
            DrugClass::Stimulant => "stimulant",
            DrugClass::Antipsychotic => "antipsychotic",
            DrugClass::MoodStabilizer => "mood_stabilizer",
            DrugClass::Anticonvulsant => "anticonvulsant",
            DrugClass::Opioid => "opioid",
            DrugClass::Nsaid => "nsaid",
            DrugClass::Antihistamine => "antihistamine",
            DrugClass::Hypnotic => "hypnotic",
            DrugClass::Other => "other",
        }
    }
}

impl FromStr for DrugClass {
    type Err = std::convert::Infallible;

    /// Unknown names parse as [`DrugClass::Other`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        Ok(match normalized.as_str() {
            "ssri" | "ssris" => DrugClass::Ssri,
            "snri" | "snris" => DrugClass::Snri,
            "tricyclic" | "tca" | "tricyclicantidepressant" => DrugClass::Tricyclic,
            "maoi" | "maois" => DrugClass::Maoi,
            "benzodiazepine" | "benzodiazepines" | "benzo" => DrugClass::Benzodiazepine,
            "stimulant" | "stimulants" => DrugClass::Stimulant,
            "antipsychotic" | "antipsychotics" | "atypicalantipsychotic" => {
                DrugClass::Antipsychotic
            }
            "moodstabilizer" | "moodstabilizers" => DrugClass::MoodStabilizer,
            "anticonvulsant" | "anticonvulsants" | "antiepileptic" => DrugClass::Anticonvulsant,
            "opioid" | "opioids" => DrugClass::Opioid,
            "nsaid" | "nsaids" => DrugClass::Nsaid,
            "antihistamine" | "antihistamines" => DrugClass::Antihistamine,
            "hypnotic" | "hypnotics" | "sedative" => DrugClass::Hypnotic,
            _ => DrugClass::Other,
        })
    }
}

impl From<String> for DrugClass {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(class) => class,
            Err(never) => match never {},
        }
    }
}

impl From<DrugClass> for String {
    fn from(value: DrugClass) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DrugClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional effect-compartment parameters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectParams {
    /// Plasma to effect-site equilibration rate (1/h)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ke0: Option<f64>,
    /// Fixed delay before equilibration starts (h)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_lag: Option<f64>,
}

/// Medication reference record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub drug_class: DrugClass,
    /// Elimination half-life (h)
    pub half_life: f64,
    /// Volume of distribution (L/kg)
    pub volume_of_distribution: f64,
    /// Oral bioavailability, fraction in (0, 1]
    pub bioavailability: f64,
    /// Explicit absorption rate Ka (1/h), overriding the class table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absorption_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<EffectParams>,
}

impl Medication {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        drug_class: DrugClass,
        half_life: f64,
        volume_of_distribution: f64,
        bioavailability: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            drug_class,
            half_life,
            volume_of_distribution,
            bioavailability,
            absorption_rate: None,
            effect: None,
        }
    }

    /// Set an explicit absorption rate Ka (1/h)
    pub fn with_absorption_rate(mut self, ka: f64) -> Self {
        self.absorption_rate = Some(ka);
        self
    }

    /// Set the effect-compartment parameters
    pub fn with_effect(mut self, ke0: f64, effect_lag: f64) -> Self {
        self.effect = Some(EffectParams {
            ke0: Some(ke0),
            effect_lag: Some(effect_lag),
        });
        self
    }

    /// Check the kinetic parameters the engine depends on.
    ///
    /// The concentration functions perform the same checks and return `0`
    /// on failure; this is for callers that prefer to reject bad records up
    /// front.
    pub fn validate(&self) -> Result<(), KineticsError> {
        if !self.half_life.is_finite() || self.half_life <= 0.0 {
            return Err(KineticsError::invalid("half_life", self.half_life));
        }
        if !self.volume_of_distribution.is_finite() || self.volume_of_distribution <= 0.0 {
            return Err(KineticsError::invalid(
                "volume_of_distribution",
                self.volume_of_distribution,
            ));
        }
        if !self.bioavailability.is_finite()
            || self.bioavailability <= 0.0
            || self.bioavailability > 1.0
        {
            return Err(KineticsError::invalid(
                "bioavailability",
                self.bioavailability,
            ));
        }
        if let Some(ka) = self.absorption_rate {
            // Zero or negative means "use the table", only NaN/inf is wrong
            if !ka.is_finite() {
                return Err(KineticsError::invalid("absorption_rate", ka));
            }
        }
        if let Some(effect) = self.effect {
            if let Some(ke0) = effect.ke0.filter(|k| !k.is_finite()) {
                return Err(KineticsError::invalid("ke0", ke0));
            }
            if let Some(lag) = effect.effect_lag.filter(|l| !l.is_finite()) {
                return Err(KineticsError::invalid("effect_lag", lag));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drug_class_aliases() {
        assert_eq!("SSRI".parse::<DrugClass>().unwrap(), DrugClass::Ssri);
        assert_eq!(
            "Mood Stabilizer".parse::<DrugClass>().unwrap(),
            DrugClass::MoodStabilizer
        );
        assert_eq!(
            "mood_stabilizer".parse::<DrugClass>().unwrap(),
            DrugClass::MoodStabilizer
        );
        assert_eq!("benzo".parse::<DrugClass>().unwrap(), DrugClass::Benzodiazepine);
        assert_eq!("herbal".parse::<DrugClass>().unwrap(), DrugClass::Other);
    }

    #[test]
    fn test_other_class_has_no_table_entries() {
        assert!(DrugClass::Other.absorption_rate().is_none());
        assert!(DrugClass::Other.effect_equilibration_rate().is_none());
        assert!(DrugClass::Other.effect_lag().is_none());
        assert!(DrugClass::Stimulant.absorption_rate().unwrap() > 0.0);
    }

    #[test]
    fn test_medication_json_uses_camel_case() {
        let json = r#"{
            "id": "med-1",
            "name": "Sertraline",
            "drugClass": "SSRI",
            "halfLife": 26.0,
            "volumeOfDistribution": 20.0,
            "bioavailability": 0.44,
            "effect": { "ke0": 0.05, "effectLag": 2.0 }
        }"#;

        let med: Medication = serde_json::from_str(json).unwrap();
        assert_eq!(med.drug_class, DrugClass::Ssri);
        assert_eq!(med.half_life, 26.0);
        assert_eq!(med.effect.unwrap().effect_lag, Some(2.0));
        assert!(med.absorption_rate.is_none());

        let back = serde_json::to_value(&med).unwrap();
        assert_eq!(back["drugClass"], "ssri");
        assert_eq!(back["volumeOfDistribution"], 20.0);
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let good = Medication::new("m", "m", DrugClass::Other, 12.0, 5.0, 0.8);
        assert!(good.validate().is_ok());

        let mut bad = good.clone();
        bad.half_life = 0.0;
        assert!(matches!(
            bad.validate(),
            Err(KineticsError::InvalidParameter { ref param, .. }) if param == "half_life"
        ));

        let mut bad = good.clone();
        bad.bioavailability = 1.5;
        assert!(bad.validate().is_err());

        let mut bad = good.clone();
        bad.volume_of_distribution = f64::NAN;
        assert!(bad.validate().is_err());

        let bad = good.clone().with_effect(f64::NAN, 1.0);
        assert!(matches!(
            bad.validate(),
            Err(KineticsError::InvalidParameter { ref param, .. }) if param == "ke0"
        ));
        let bad = good.clone().with_effect(0.3, f64::INFINITY);
        assert!(matches!(
            bad.validate(),
            Err(KineticsError::InvalidParameter { ref param, .. }) if param == "effect_lag"
        ));

        // Zero or negative effect values defer to the class table
        assert!(good.with_effect(0.0, -1.0).validate().is_ok());
    }
}
