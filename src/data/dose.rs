use crate::error::KineticsError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Milliseconds per hour, for converting epoch-ms timestamps to model time
pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Administration route of a dose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Route {
    #[default]
    Oral,
    Sublingual,
    /// Bypasses absorption: full bioavailability, bolus disposition
    Intravenous,
    Intramuscular,
    Transdermal,
    Other,
}

impl Route {
    /// Whether the dose goes through a first-order absorption phase
    pub fn is_extravascular(&self) -> bool {
        !matches!(self, Route::Intravenous)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Oral => "oral",
            Route::Sublingual => "sublingual",
            Route::Intravenous => "intravenous",
            Route::Intramuscular => "intramuscular",
            Route::Transdermal => "transdermal",
            Route::Other => "other",
        }
    }
}

impl FromStr for Route {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "oral" | "po" | "by mouth" => Route::Oral,
            "sublingual" | "sl" => Route::Sublingual,
            "intravenous" | "iv" => Route::Intravenous,
            "intramuscular" | "im" => Route::Intramuscular,
            "transdermal" | "patch" => Route::Transdermal,
            _ => Route::Other,
        })
    }
}

impl From<String> for Route {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(route) => route,
            Err(never) => match never {},
        }
    }
}

impl From<Route> for String {
    fn from(value: Route) -> Self {
        value.as_str().to_string()
    }
}

/// A single administered dose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dose {
    pub id: String,
    pub medication_id: String,
    /// Administration time (epoch ms)
    pub timestamp: i64,
    /// Amount administered (mg)
    pub dose_amount: f64,
    #[serde(default)]
    pub route: Route,
}

impl Dose {
    pub fn new(
        id: impl Into<String>,
        medication_id: impl Into<String>,
        timestamp: i64,
        dose_amount: f64,
    ) -> Self {
        Self {
            id: id.into(),
            medication_id: medication_id.into(),
            timestamp,
            dose_amount,
            route: Route::default(),
        }
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.route = route;
        self
    }

    /// Hours elapsed between this dose and `time` (epoch ms); negative if
    /// the dose lies in the future
    pub fn hours_until(&self, time: i64) -> f64 {
        (time - self.timestamp) as f64 / MS_PER_HOUR
    }

    pub fn validate(&self) -> Result<(), KineticsError> {
        if !self.dose_amount.is_finite() || self.dose_amount <= 0.0 {
            return Err(KineticsError::invalid("dose_amount", self.dose_amount));
        }
        Ok(())
    }
}
