pub mod dose;
pub mod medication;
pub mod mood;

pub use dose::{Dose, Route, MS_PER_HOUR};
pub use medication::{DrugClass, EffectParams, Medication};
pub use mood::{MoodEntry, MoodMetric};
