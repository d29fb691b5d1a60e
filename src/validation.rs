//! Parameter validation for correlations.
//!
//! Every correlation declares the range each input is calibrated for.
//! Callers choose whether an out-of-range input is an error or whether the
//! correlation quietly returns its NaN-filled error record.

use log::warn;

use crate::error::{GroundhogError, Result};

/// What to do when a correlation input fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Return the validation error to the caller.
    Raise,
    /// Log a warning and return the correlation's error record.
    #[default]
    FailSilently,
}

impl ErrorPolicy {
    pub fn from_fail_silently(fail_silently: bool) -> Self {
        if fail_silently {
            ErrorPolicy::FailSilently
        } else {
            ErrorPolicy::Raise
        }
    }
}

/// Check a float against optional inclusive bounds. NaN never validates.
pub fn validate_float(name: &str, value: f64, min: Option<f64>, max: Option<f64>) -> Result<()> {
    if value.is_nan() {
        return Err(GroundhogError::validation(name, "value is NaN"));
    }
    if let Some(min) = min {
        if value < min {
            return Err(GroundhogError::validation(
                name,
                format!("{} is below the minimum of {}", value, min),
            ));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(GroundhogError::validation(
                name,
                format!("{} is above the maximum of {}", value, max),
            ));
        }
    }
    Ok(())
}

/// Check that a string is one of the allowed options.
pub fn validate_choice(name: &str, value: &str, options: &[&str]) -> Result<()> {
    if options.contains(&value) {
        Ok(())
    } else {
        Err(GroundhogError::validation(
            name,
            format!("'{}' is not one of {:?}", value, options),
        ))
    }
}

/// Apply the policy to a validation outcome.
///
/// Returns `Ok(true)` when validation passed, `Ok(false)` when it failed and
/// the policy is fail-silently, and the error otherwise.
pub fn apply_policy(outcome: Result<()>, policy: ErrorPolicy, context: &str) -> Result<bool> {
    match outcome {
        Ok(()) => Ok(true),
        Err(e) if e.is_validation() && policy == ErrorPolicy::FailSilently => {
            warn!("{}: {}. Returning NaN values.", context, e);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
