//! Core types and traits for respool
//!
//! This crate defines the vocabulary shared by every other crate:
//! - [`Key`] and [`Member`]: store entry names and opaque set members
//! - [`Outcome`]: the tri-state result of contended operations
//! - [`keys`]: pure key-naming helpers
//! - [`Store`]: the store client boundary (watch, conditional commit, sets)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod keys;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::{
    Command, CommitOutcome, ReadOp, Reply, Store, Watch, WatchedKey, WriteBatch,
};
pub use types::{Key, Member, Outcome};
