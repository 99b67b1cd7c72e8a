//! Assessment error types.
//!
//! Only `ValidationGap` ever reaches a caller of the engine. The other
//! variants are classified here so the engine can log and recover from them
//! without string matching.

use thiserror::Error;

/// Errors raised while running an assessment operation.
#[derive(Debug, Error)]
pub enum AssessmentError {
    /// The store could not be reached, timed out, or had nothing to serve.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A required submission field was missing or empty.
    #[error("missing required field: {field}")]
    ValidationGap { field: &'static str },

    /// The notification collaborator failed to deliver.
    #[error("notification failed: {0}")]
    NotificationFailure(String),
}

impl AssessmentError {
    /// Returns `true` if this error has a degraded continuation inside the
    /// engine and must not be shown to the end user.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AssessmentError::StoreUnavailable(_) | AssessmentError::NotificationFailure(_)
        )
    }

    /// The offending field name, if this is a validation error.
    pub fn missing_field(&self) -> Option<&'static str> {
        match self {
            AssessmentError::ValidationGap { field } => Some(field),
            _ => None,
        }
    }
}
