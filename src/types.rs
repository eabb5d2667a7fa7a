//! Public types for the respool API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// Identifiers and outcomes
pub use respool_core::{Key, Member, Outcome};

// Store boundary
pub use respool_core::{Error as StoreError, Result as StoreResult};
pub use respool_core::{
    Command, CommitOutcome, ReadOp, Reply, Store, Watch, WatchedKey, WriteBatch,
};

// Key naming
pub use respool_core::keys::{available_key, occupied_key};

// Optimistic protocol
pub use respool_concurrency::{
    attempt, run_optimistic, Attempt, Backoff, Decision, RetryPolicy, TransactionManager,
    TransactionMetrics, TxnOutcome,
};

// Primitives
pub use respool_primitives::{IdentityLock, ResourcePool, ResourceStatus};

// In-memory store
pub use respool_storage::{MemoryStore, StoreMetrics};
