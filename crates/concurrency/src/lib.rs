//! Concurrency layer for respool
//!
//! This crate implements the optimistic transaction protocol with:
//! - Decision: what a body wants after reading (abort or commit a batch)
//! - Watch / conditional commit per attempt, retried on conflict
//! - RetryPolicy: bounded or unbounded attempts with backoff
//! - TransactionManager: the retry loop plus shared counters

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod manager;
pub mod protocol;
pub mod retry;

pub use manager::{run_optimistic, TransactionManager, TransactionMetrics};
pub use protocol::{attempt, Attempt, Decision, TxnOutcome};
pub use retry::{Backoff, RetryPolicy, DEFAULT_MAX_ATTEMPTS};
