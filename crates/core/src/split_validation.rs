//! Range checks for profit-split fractions entered through the API.
//!
//! The split engine itself never validates or clamps fractions; these
//! checks only guard the create/assign endpoints.

use crate::error::CoreError;

/// Validate that a split fraction falls within `[0.0, 1.0]`.
///
/// Returns a `CoreError::Validation` naming the field if out of range or
/// not a finite number.
pub fn validate_split_fraction(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0.0 and 1.0, got {value}"
        )));
    }
    Ok(())
}

/// Validate an optional per-assignment override. `None` means "no override".
pub fn validate_split_override(value: Option<f64>, name: &str) -> Result<(), CoreError> {
    match value {
        Some(v) => validate_split_fraction(v, name),
        None => Ok(()),
    }
}
