//! Error types for store operations
//!
//! Only store-level failures are errors. Optimistic conflicts are reported
//! through [`crate::CommitOutcome::Conflict`] and never surface here.

use thiserror::Error;

/// Errors raised by a store client.
#[derive(Debug, Error)]
pub enum Error {
    /// Operation against a key holding the wrong kind of entry
    #[error("wrong type for key '{key}': expected {expected}, got {actual}")]
    WrongType {
        /// Key the operation addressed
        key: String,
        /// Entry kind the operation needs
        expected: &'static str,
        /// Entry kind actually stored
        actual: &'static str,
    },

    /// Key is not acceptable to the store
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Transport-level failure talking to the store
    #[error("connection error: {0}")]
    Connection(String),

    /// Store rejected or failed the operation
    #[error("storage error: {0}")]
    Storage(String),

    /// Bug or invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a transport failure.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a wrong-type failure.
    pub fn is_wrong_type(&self) -> bool {
        matches!(self, Error::WrongType { .. })
    }
}
