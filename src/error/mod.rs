use thiserror::Error;

/// Errors reported by the opt-in validators.
///
/// The engines themselves never surface these: a failed validation degrades
/// to a zero concentration or a neutral correlation instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KineticsError {
    /// A pharmacokinetic parameter is non-finite or out of range
    #[error("Invalid parameter: {param} = {value}")]
    InvalidParameter { param: String, value: String },

    /// Paired series have different lengths
    #[error("Array length mismatch: x has {x} values, y has {y}")]
    LengthMismatch { x: usize, y: usize },

    /// Not enough observations for the requested statistic
    #[error("Insufficient data: {n} points, need at least {required}")]
    InsufficientData { n: usize, required: usize },
}

impl KineticsError {
    pub(crate) fn invalid(param: &str, value: f64) -> Self {
        KineticsError::InvalidParameter {
            param: param.to_string(),
            value: value.to_string(),
        }
    }
}
