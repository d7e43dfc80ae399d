use serde::{Deserialize, Serialize};

/// A self-reported mood check-in.
///
/// Only the downstream insight layer reads these; the engines work on the
/// plain numeric series projected out with [`MoodEntry::metric`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    /// Check-in time (epoch ms)
    pub timestamp: i64,
    pub mood_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anxiety_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognitive_score: Option<f64>,
}

/// Which signal of a [`MoodEntry`] to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoodMetric {
    Mood,
    Anxiety,
    Energy,
    Focus,
    Cognitive,
}

impl MoodEntry {
    pub fn new(timestamp: i64, mood_score: f64) -> Self {
        Self {
            timestamp,
            mood_score,
            anxiety_level: None,
            energy_level: None,
            focus_level: None,
            cognitive_score: None,
        }
    }

    pub fn metric(&self, metric: MoodMetric) -> Option<f64> {
        match metric {
            MoodMetric::Mood => Some(self.mood_score),
            MoodMetric::Anxiety => self.anxiety_level,
            MoodMetric::Energy => self.energy_level,
            MoodMetric::Focus => self.focus_level,
            MoodMetric::Cognitive => self.cognitive_score,
        }
    }

    /// Project one signal into a series; missing values become `NaN` so the
    /// series stays index-aligned. Cross-correlation and regression drop
    /// those pairs.
    pub fn series(entries: &[MoodEntry], metric: MoodMetric) -> Vec<f64> {
        entries
            .iter()
            .map(|e| e.metric(metric).unwrap_or(f64::NAN))
            .collect()
    }
}
