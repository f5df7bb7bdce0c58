//! Error types for the chain follower.

use std::io;
use thiserror::Error;

/// Main error type for the chain follower.
#[derive(Debug, Error)]
pub enum FollowerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Processing error: {0}")]
    Process(#[from] ProcessError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

/// Header-store errors.
///
/// `Inconsistent` is the fatal kind: the store no longer contains the
/// universe the cursor lives in (a cursor hash that resolves to nothing, or
/// a walk that yields a header whose parent is not the previously yielded
/// one). Callers should treat it as unrecoverable for the current cursor.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store inconsistent: {0}")]
    Inconsistent(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Failure signalled by an event subscriber.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Subscriber failed: {0}")]
    Failed(String),
}

impl HandlerError {
    /// Convenience constructor for subscriber failures.
    pub fn failed(message: impl Into<String>) -> Self {
        HandlerError::Failed(message.into())
    }
}

/// Errors surfaced by a reconciliation pass.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),
}

/// Logging setup errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Log rotation failed: {0}")]
    RotationFailed(String),

    #[error("Subscriber initialization failed: {0}")]
    SubscriberInit(String),
}

/// Type alias for Result with FollowerError.
pub type Result<T> = std::result::Result<T, FollowerError>;

/// Type alias for store operation results.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Type alias for processing results.
pub type ProcessResult<T> = std::result::Result<T, ProcessError>;

/// Type alias for logging setup results.
pub type LoggingResult<T> = std::result::Result<T, LoggingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_wraps_into_process_error() {
        let err: ProcessError = StoreError::Inconsistent("missing cursor".to_string()).into();
        assert!(matches!(err, ProcessError::Store(StoreError::Inconsistent(_))));
        assert!(err.to_string().contains("missing cursor"));
    }

    #[test]
    fn test_handler_error_message() {
        let err = HandlerError::failed("nullifier index rejected header");
        assert_eq!(err.to_string(), "Subscriber failed: nullifier index rejected header");
    }
}
