//! # Error Types
//!
//! Error taxonomy for lease store operations.

use thiserror::Error;

/// Errors a lease store adapter can surface to the election engine.
///
/// The engine cares about exactly one distinction: whether an error is
/// transient. Transient errors inside the autonomous retry loop are recovered
/// locally (a failed acquire is retried, a failed renewal falls back to the
/// acquire loop); they never escape to the application. Errors on the
/// synchronous query path propagate to the caller unchanged.
///
/// # Examples
///
/// ```rust
/// use tenure_core::LeaseError;
///
/// let error = LeaseError::unavailable("connection refused");
/// assert!(error.is_transient());
/// ```
#[derive(Error, Debug)]
pub enum LeaseError {
    /// The store could not be reached or refused the connection
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    /// A store call exceeded its deadline
    #[error("Store timeout: {operation}")]
    Timeout { operation: String },

    /// A conditional write lost to a concurrent writer in a way the store
    /// reports as an error rather than a clean miss
    #[error("Write conflict on group {group}")]
    Conflict { group: String },

    /// Record serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File system or network I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected adapter-internal error
    #[error("Internal store error: {message}")]
    Internal { message: String },
}

/// Result alias for lease store operations.
pub type LeaseResult<T> = std::result::Result<T, LeaseError>;

impl LeaseError {
    /// Creates a new unavailability error with the given message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a new timeout error for the given operation.
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Creates a new conflict error for the given group.
    pub fn conflict(group: impl Into<String>) -> Self {
        Self::Conflict {
            group: group.into(),
        }
    }

    /// Creates a new internal error with the given message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Determines whether this error may resolve on its own.
    ///
    /// The engine treats transient errors as ordinary contention: a failed
    /// acquire stays in the acquire loop, a failed renewal is handled as a
    /// lost lease. Non-transient errors indicate adapter bugs or corruption
    /// and are still retried by the loop, but logged at a higher severity.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::Timeout { .. } | Self::Conflict { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(LeaseError::unavailable("down").is_transient());
        assert!(LeaseError::timeout("try_acquire").is_transient());
        assert!(LeaseError::conflict("default").is_transient());
        assert!(!LeaseError::internal("bug").is_transient());
    }

    #[test]
    fn display_includes_context() {
        let error = LeaseError::timeout("try_renew");
        assert_eq!(error.to_string(), "Store timeout: try_renew");
    }
}
