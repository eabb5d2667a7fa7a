//! Unified error types for respool.
//!
//! This module provides a clean error type that wraps store and configuration
//! errors and presents a consistent interface to users. Optimistic conflicts
//! are never errors; operations that give up under contention report
//! [`crate::Outcome::Exhausted`] instead.

use thiserror::Error;

/// All respool errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Operation hit an entry of the wrong kind (e.g. a pool set key holding bytes)
    #[error("wrong type: {0}")]
    WrongType(String),

    /// Invalid input or configuration
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Store connection failed; the true state is unknown
    #[error("connection error: {0}")]
    Connection(String),

    /// Store rejected or failed the operation
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (bug or invariant violation)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for respool operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a store connectivity failure.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a wrong-type error.
    pub fn is_wrong_type(&self) -> bool {
        matches!(self, Error::WrongType(_))
    }

    /// Check if this is a serious/unrecoverable error.
    pub fn is_serious(&self) -> bool {
        matches!(self, Error::Internal(_))
    }
}

// Convert from store errors
impl From<respool_core::Error> for Error {
    fn from(e: respool_core::Error) -> Self {
        use respool_core::Error as CoreError;
        match e {
            CoreError::WrongType {
                key,
                expected,
                actual,
            } => Error::WrongType(format!("{}: expected {}, got {}", key, expected, actual)),
            CoreError::InvalidKey(msg) => Error::InvalidInput(format!("key: {}", msg)),
            CoreError::Connection(msg) => Error::Connection(msg),
            CoreError::Storage(msg) => Error::Storage(msg),
            CoreError::Internal(msg) => Error::Internal(msg),
        }
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
