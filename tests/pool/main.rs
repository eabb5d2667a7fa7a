//! Resource Pool Integration Test Suite
//!
//! Exercises pools and locks through the public facade against the
//! in-memory store, plus a fault-injecting store for the error paths.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test pool
//!
//! # Contention tests only
//! cargo test --test pool concurrency::
//! ```

use std::sync::Arc;

use respool::prelude::*;
use respool::{
    available_key, occupied_key, CommitOutcome, Decision, ReadOp, Reply, StoreError, StoreResult,
    TransactionManager, Watch, WriteBatch,
};

// Test modules
pub mod basic_ops;
pub mod failures;
pub mod invariants;
pub mod lock;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Install a fmt subscriber once so `RUST_LOG`-style output shows up with
/// `--nocapture`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

/// Facade over a fresh store that retries without pausing
pub fn create_respool() -> Respool {
    init_tracing();
    Respool::builder()
        .unbounded()
        .backoff(Backoff::None)
        .jitter(false)
        .open()
}

/// Pool named `name` on a fresh store
pub fn create_pool(name: &str) -> ResourcePool<MemoryStore> {
    create_respool().pool(name)
}

/// Pool pre-filled with `count` resources named `r0..r{count-1}`
pub fn create_filled_pool(respool: &Respool, name: &str, count: usize) -> ResourcePool<MemoryStore> {
    let pool = respool.pool(name);
    for i in 0..count {
        assert_eq!(pool.associate(resource(i)).unwrap(), Outcome::Done(true));
    }
    pool
}

/// Resource id used by fixtures
pub fn resource(i: usize) -> Member {
    Member::from(format!("r{}", i))
}

/// Read both sets directly from the store, sorted
pub fn snapshot(respool: &Respool, pool: &ResourcePool<MemoryStore>) -> (Vec<Member>, Vec<Member>) {
    let store: &Arc<MemoryStore> = respool.store();
    (
        store.members(pool.available_key()).unwrap(),
        store.members(pool.occupied_key()).unwrap(),
    )
}

/// Panic if any resource sits in both sets
pub fn assert_disjoint(available: &[Member], occupied: &[Member]) {
    for m in available {
        assert!(
            !occupied.contains(m),
            "resource {} is both available and occupied",
            m
        );
    }
}
