//! Error types for election engine operations.

use tenure_core::LeaseError;
use thiserror::Error;

/// Result type for election engine operations
pub type ElectionResult<T> = Result<T, ElectionError>;

/// Errors that can occur during election engine operations
#[derive(Error, Debug)]
pub enum ElectionError {
    /// Configuration rejected at construction; fatal to the caller, never
    /// retried
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// Store error surfaced on a directly-invoked path (`is_leader`, start-up
    /// provisioning); errors inside the autonomous retry loop are recovered
    /// locally and never take this form
    #[error("Lease store error: {0}")]
    Store(#[from] LeaseError),

    /// Unexpected internal error
    #[error("Internal error: {reason}")]
    Internal { reason: String },
}

impl ElectionError {
    /// Creates a new configuration error with the given reason.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Creates a new internal error with the given reason.
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }
}

impl From<anyhow::Error> for ElectionError {
    fn from(err: anyhow::Error) -> Self {
        ElectionError::Internal {
            reason: err.to_string(),
        }
    }
}
