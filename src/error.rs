// src/error.rs
//! Error taxonomy for the tracking subsystem.
//!
//! Every failure crosses component boundaries as an explicit value:
//! validation problems are per-field and recoverable, an illegal close is
//! recoverable once the scan reaches a terminal state, a backend failure
//! is terminal for its own scan only, and lookups against unknown ids
//! report not-found instead of panicking.

use crate::models::ScanStatus;
use thiserror::Error;

/// A single validation problem, keyed by the offending request field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

/// Failure reported by a scan execution backend.
#[derive(Error, Debug, Clone)]
pub enum BackendFailure {
    #[error("scan backend unavailable: {0}")]
    Unavailable(String),

    #[error("scan execution failed: {0}")]
    Execution(String),
}

/// Errors surfaced by the public tracker API.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("invalid scan request ({} field(s))", .0.len())]
    Validation(Vec<FieldError>),

    #[error("scan {id} is {status:?}; close is not permitted until it reaches a terminal state")]
    IllegalTransition { id: String, status: ScanStatus },

    #[error("backend failure: {0}")]
    Backend(#[from] BackendFailure),

    #[error("no scan with id {0}")]
    NotFound(String),
}

impl TrackerError {
    /// Field-level details for a validation failure, empty otherwise.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            TrackerError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = TrackerError::Validation(vec![
            FieldError::new("name", "must be at least 3 characters"),
        ]);
        assert!(err.to_string().contains("1 field"));
        assert_eq!(err.field_errors()[0].field, "name");
    }

    #[test]
    fn test_illegal_transition_display() {
        let err = TrackerError::IllegalTransition {
            id: "scan-1".into(),
            status: ScanStatus::Scanning,
        };
        assert!(err.to_string().contains("not permitted"));
    }

    #[test]
    fn test_backend_failure_converts() {
        let err: TrackerError = BackendFailure::Execution("probe timed out".into()).into();
        assert!(matches!(err, TrackerError::Backend(_)));
    }
}
