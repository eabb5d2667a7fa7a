//! # Respool
//!
//! Resource pools shared through a key-value store, coordinated with
//! optimistic transactions instead of locks.
//!
//! A pool partitions resource identifiers into two sets, available and
//! occupied. Any number of clients can associate, acquire, release, and
//! disassociate resources at once; the store's watch / conditional commit is
//! the only synchronization point.
//!
//! ## Quick Start
//!
//! ```ignore
//! use respool::prelude::*;
//!
//! let respool = Respool::open();
//! let workers = respool.pool("workers");
//!
//! workers.associate("w1")?;
//! workers.associate("w2")?;
//!
//! match workers.acquire()? {
//!     Outcome::Done(Some(worker)) => {
//!         // ... use the worker ...
//!         workers.release(worker)?;
//!     }
//!     Outcome::Done(None) => { /* pool empty */ }
//!     Outcome::Exhausted { .. } => { /* contention, try later */ }
//! }
//! ```
//!
//! ## Outcomes
//!
//! Contended operations return [`Outcome`]: `Done(answer)` when the answer is
//! definite, `Exhausted` when every permitted attempt conflicted and the true
//! state is unknown. Errors are reserved for store failures.
//!
//! ## Primitives
//!
//! - [`ResourcePool`] - available/occupied partition of resource identifiers
//! - [`IdentityLock`] - lock released only by the identity that took it
//!
//! Both are built on [`TransactionManager::run`], which is public for callers
//! that need their own check-then-act sequences.

#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod types;

pub mod prelude;

// Re-export main entry points
pub use config::RespoolConfig;
pub use database::{Metrics, Respool, RespoolBuilder};
pub use error::{Error, Result};

// Re-export types
pub use types::*;
