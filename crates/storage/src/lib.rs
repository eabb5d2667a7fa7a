//! Storage layer for respool
//!
//! This crate implements an in-process store client with:
//! - MemoryStore: DashMap of versioned slots behind a commit gate
//! - Watch / conditional commit via per-key modification versions
//! - Set primitives with atomic move
//! - StoreMetrics: commit and conflict counters

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod slot;

pub use memory::{MemoryStore, StoreMetrics};
pub use slot::{Entry, Slot};
