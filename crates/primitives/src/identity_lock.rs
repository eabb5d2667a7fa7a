//! IdentityLock primitive implementation
//!
//! A lock whose holder proves ownership with an identity token. Acquiring
//! stores the token under the lock key if the key is free; releasing deletes
//! the key only if it still holds the caller's token.
//!
//! Release is check-then-act, so it runs under the optimistic protocol with
//! the lock key watched: a release racing a foreign release-and-reacquire
//! conflicts instead of deleting someone else's lock.

use crate::resource_pool::first_bool;
use respool_concurrency::{Decision, TransactionManager};
use respool_core::{Key, Outcome, Result, Store, WriteBatch};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Token-protected lock stored under one key
pub struct IdentityLock<S: Store + ?Sized> {
    store: Arc<S>,
    manager: Arc<TransactionManager>,
    key: Key,
}

impl<S: Store + ?Sized> IdentityLock<S> {
    /// Create a lock handle with its own transaction manager (default policy)
    pub fn new(store: Arc<S>, key: impl Into<Key>) -> Self {
        Self::with_manager(store, Arc::new(TransactionManager::default()), key)
    }

    /// Create a lock handle that runs its transactions through `manager`
    pub fn with_manager(
        store: Arc<S>,
        manager: Arc<TransactionManager>,
        key: impl Into<Key>,
    ) -> Self {
        Self {
            store,
            manager,
            key: key.into(),
        }
    }

    /// Lock key
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Take the lock if it is free, recording `identity` as the holder
    pub fn acquire(&self, identity: impl AsRef<[u8]>) -> Result<bool> {
        let acquired = self.store.set_if_absent(&self.key, identity.as_ref())?;
        if acquired {
            debug!(lock = %self.key, "lock acquired");
        }
        Ok(acquired)
    }

    /// Release the lock if `identity` holds it
    ///
    /// # Returns
    /// - `Done(true)` if the lock was held by `identity` and is now free
    /// - `Done(false)` if the lock is free or held by another identity
    /// - `Exhausted` if the lock key kept changing under the check
    pub fn release(&self, identity: impl AsRef<[u8]>) -> Result<Outcome<bool>> {
        let identity = identity.as_ref();
        let key = &self.key;

        let outcome = self
            .manager
            .run(self.store.as_ref(), std::slice::from_ref(key), |s: &S| {
                match s.get(key)? {
                    Some(holder) if holder == identity => {
                        Ok(Decision::Commit(WriteBatch::new().delete(key.clone())))
                    }
                    _ => Ok(Decision::Abort(false)),
                }
            })?
            .resolve(first_bool)?;

        if outcome == Outcome::Done(true) {
            debug!(lock = %self.key, "lock released");
        }
        Ok(outcome)
    }

    /// Token of the current holder, if the lock is taken
    pub fn holder(&self) -> Result<Option<Vec<u8>>> {
        self.store.get(&self.key)
    }

    /// Check whether the lock is taken
    pub fn is_locked(&self) -> Result<bool> {
        Ok(self.holder()?.is_some())
    }
}

impl<S: Store + ?Sized> Clone for IdentityLock<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            manager: Arc::clone(&self.manager),
            key: self.key.clone(),
        }
    }
}

impl<S: Store + ?Sized> fmt::Debug for IdentityLock<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityLock").field("key", &self.key).finish()
    }
}
