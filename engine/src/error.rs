//! Engine error taxonomy
//!
//! A calculation either succeeds with a fully populated breakdown or fails
//! before computing anything. The engine performs no I/O, so nothing here is
//! retryable.

use thiserror::Error;

/// Errors returned by pricing, meter and configuration operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PricingError {
    /// Negative, non-finite or unrecognized input value
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// Meter command not allowed in the meter's current state
    #[error("Cannot {command} while meter is {state}")]
    InvalidState { command: &'static str, state: String },

    /// Snapshot recorded under a different tariff than the one restoring it
    #[error("Snapshot tariff hash {actual} does not match {expected}")]
    ConfigMismatch { expected: String, actual: String },

    /// Configuration failed to parse or validate
    #[error("Invalid config: {0}")]
    Config(String),

    /// Serialization failure while hashing or exporting
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type PricingResult<T> = Result<T, PricingError>;

impl PricingError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        PricingError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

/// Reject negative or non-finite measurements
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> PricingResult<f64> {
    if !value.is_finite() {
        return Err(PricingError::invalid(field, format!("{} is not finite", value)));
    }
    if value < 0.0 {
        return Err(PricingError::invalid(field, format!("{} is negative", value)));
    }
    Ok(value)
}
