//! Main entry point for respool.
//!
//! This module provides the `Respool` struct, which binds a shared store to a
//! transaction manager and hands out primitives that use both.

use crate::config::RespoolConfig;
use crate::error::Result;
use respool_concurrency::{Backoff, RetryPolicy, TransactionManager, TransactionMetrics};
use respool_core::Store;
use respool_primitives::{IdentityLock, ResourcePool};
use respool_storage::{MemoryStore, StoreMetrics};
use std::sync::Arc;
use tracing::info;

/// Handle to a shared store plus the retry policy its primitives use.
///
/// Every primitive created from one `Respool` shares its store and its
/// transaction manager, so [`Respool::transaction_metrics`] covers all of them.
///
/// # Example
///
/// ```ignore
/// use respool::prelude::*;
///
/// let respool = Respool::open();
/// let workers = respool.pool("workers");
///
/// workers.associate("w1")?;
/// if let Outcome::Done(Some(worker)) = workers.acquire()? {
///     // ... use the worker ...
///     workers.release(worker)?;
/// }
/// ```
pub struct Respool<S: Store + ?Sized = MemoryStore> {
    store: Arc<S>,
    manager: Arc<TransactionManager>,
}

impl Respool<MemoryStore> {
    /// Open over a fresh in-memory store with the default retry policy.
    pub fn open() -> Self {
        Self::builder().open()
    }

    /// Create a builder for configuration.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let respool = Respool::builder()
    ///     .max_attempts(4)
    ///     .backoff(Backoff::Fixed { delay_ms: 2 })
    ///     .open();
    /// ```
    pub fn builder() -> RespoolBuilder {
        RespoolBuilder::new()
    }

    /// Store and transaction counters.
    pub fn metrics(&self) -> Metrics {
        Metrics {
            store: self.store.metrics(),
            transactions: self.manager.metrics(),
        }
    }
}

impl<S: Store + ?Sized> Respool<S> {
    /// Use an existing store with the default retry policy.
    pub fn with_store(store: Arc<S>) -> Self {
        Self::from_parts(store, RetryPolicy::default())
    }

    fn from_parts(store: Arc<S>, policy: RetryPolicy) -> Self {
        info!(
            max_attempts = ?policy.max_attempts,
            backoff = ?policy.backoff,
            "respool ready"
        );
        Self {
            store,
            manager: Arc::new(TransactionManager::new(policy)),
        }
    }

    /// Resource pool named `name`.
    ///
    /// Handles for the same name address the same two sets.
    pub fn pool(&self, name: impl Into<String>) -> ResourcePool<S> {
        ResourcePool::with_manager(Arc::clone(&self.store), Arc::clone(&self.manager), name)
    }

    /// Identity lock stored under `key`.
    pub fn identity_lock(&self, key: &str) -> IdentityLock<S> {
        IdentityLock::with_manager(Arc::clone(&self.store), Arc::clone(&self.manager), key)
    }

    /// The shared store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Retry policy in force.
    pub fn retry_policy(&self) -> &RetryPolicy {
        self.manager.policy()
    }

    /// Protocol counters for every primitive from this handle.
    pub fn transaction_metrics(&self) -> TransactionMetrics {
        self.manager.metrics()
    }
}

impl<S: Store + ?Sized> Clone for Respool<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            manager: Arc::clone(&self.manager),
        }
    }
}

/// Store and protocol counters.
#[derive(Debug, Clone, Copy)]
pub struct Metrics {
    /// Store-side counters
    pub store: StoreMetrics,
    /// Retry-loop counters
    pub transactions: TransactionMetrics,
}

/// Builder for respool configuration.
///
/// # Example
///
/// ```ignore
/// // Faithful to a single try: give up on the first conflict
/// let respool = Respool::builder().single_attempt().open();
///
/// // Retry forever, no pauses
/// let respool = Respool::builder().unbounded().backoff(Backoff::None).open();
///
/// // Bring your own store
/// let respool = Respool::builder().with_store(Arc::new(MemoryStore::new()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RespoolBuilder {
    config: RespoolConfig,
}

impl RespoolBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all settings.
    pub fn config(mut self, config: RespoolConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    /// Give up after `attempts` conflicting attempts (at least 1).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.retry.max_attempts = Some(attempts.max(1));
        self
    }

    /// Retry until an attempt commits or aborts.
    pub fn unbounded(mut self) -> Self {
        self.config.retry.max_attempts = None;
        self
    }

    /// One attempt per operation, no pauses.
    pub fn single_attempt(self) -> Self {
        self.retry_policy(RetryPolicy::single_attempt())
    }

    /// Pause between conflicting attempts.
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.config.retry.backoff = backoff;
        self
    }

    /// Randomize pauses.
    pub fn jitter(mut self, jitter: bool) -> Self {
        self.config.retry.jitter = jitter;
        self
    }

    /// Check the settings.
    pub fn validate(&self) -> Result<()> {
        self.config.validate()
    }

    /// Open over a fresh in-memory store.
    pub fn open(self) -> Respool<MemoryStore> {
        self.with_store(Arc::new(MemoryStore::new()))
    }

    /// Open over an existing store.
    pub fn with_store<S: Store + ?Sized>(self, store: Arc<S>) -> Respool<S> {
        Respool::from_parts(store, self.config.retry)
    }
}
