//! Error type shared by the calculation modules.

use thiserror::Error;

pub type Result<T, E = GroundhogError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum GroundhogError {
    /// A parameter is outside its validated range or not an allowed option.
    #[error("Invalid value for '{parameter}': {message}")]
    Validation { parameter: String, message: String },

    /// Input data is inconsistent (array lengths, layer geometry, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Brent's method was called on an interval without a sign change.
    #[error("Root not bracketed: f({a}) and f({b}) have the same sign")]
    RootNotBracketed { a: f64, b: f64 },

    #[error("Root finding did not converge after {0} iterations")]
    NoConvergence(usize),

    #[error("Unknown correlation '{0}'. Run `groundhog correlations` for the list")]
    UnknownCorrelation(String),

    /// A calculation step was called before the step it depends on.
    #[error("Calculation step '{step}' requires '{requires}' to run first")]
    StepOrder {
        step: &'static str,
        requires: &'static str,
    },

    #[error("Malformed parameters: {0}")]
    Json(#[from] serde_json::Error),
}

impl GroundhogError {
    pub fn validation(parameter: &str, message: impl Into<String>) -> Self {
        GroundhogError::Validation {
            parameter: parameter.to_string(),
            message: message.into(),
        }
    }

    /// Whether the error is a validation failure that fail-silently mode may swallow.
    pub fn is_validation(&self) -> bool {
        matches!(self, GroundhogError::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = GroundhogError::validation("qc", "value 200 above maximum 150");
        assert_eq!(
            err.to_string(),
            "Invalid value for 'qc': value 200 above maximum 150"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_step_order_display() {
        let err = GroundhogError::StepOrder {
            step: "set_soil_layers",
            requires: "resample_data",
        };
        assert!(err.to_string().contains("resample_data"));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_unknown_correlation_display() {
        let err = GroundhogError::UnknownCorrelation("Foo".into());
        assert!(err.to_string().contains("'Foo'"));
    }
}
