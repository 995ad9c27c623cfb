//! Shared validation utilities
//!
//! Common input checks used by the command handlers.

use thiserror::Error;

/// Errors from name validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    #[error("Name is required and cannot be empty")]
    Required,

    #[error("Name must be between 1 and {max_length} characters")]
    TooLong { max_length: usize },
}

/// Errors from location validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationValidationError {
    #[error("{field} is required and cannot be empty")]
    Required { field: &'static str },

    #[error("{field} must be at most {max_length} characters")]
    TooLong {
        field: &'static str,
        max_length: usize,
    },
}

/// Errors from monetary amount validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AmountValidationError {
    #[error("{field} must be a finite, non-negative amount")]
    Invalid { field: &'static str },
}

/// Validate a display-name field.
///
/// Must be non-empty after trimming and within `max_length` characters.
pub fn validate_name(name: &str, max_length: usize) -> Result<(), NameValidationError> {
    if name.trim().is_empty() {
        return Err(NameValidationError::Required);
    }

    if name.len() > max_length {
        return Err(NameValidationError::TooLong { max_length });
    }

    Ok(())
}

/// Validate a location name (facility identifier).
pub fn validate_location(location: &str, field: &'static str) -> Result<(), LocationValidationError> {
    if location.trim().is_empty() {
        return Err(LocationValidationError::Required { field });
    }

    if location.len() > 100 {
        return Err(LocationValidationError::TooLong {
            field,
            max_length: 100,
        });
    }

    Ok(())
}

/// Validate an optional monetary amount: finite and non-negative.
pub fn validate_amount(
    amount: Option<f64>,
    field: &'static str,
) -> Result<(), AmountValidationError> {
    match amount {
        Some(value) if !value.is_finite() || value < 0.0 => {
            Err(AmountValidationError::Invalid { field })
        },
        _ => Ok(()),
    }
}
