//! ResourcePool primitive implementation
//!
//! Partitions a named collection of resource identifiers into two disjoint
//! sets in the shared store, `<pool>:available` and `<pool>:occupied`, and
//! moves identifiers between them under the optimistic protocol.
//!
//! ## Design
//!
//! ResourcePool is a stateless facade over the store. It owns only the two
//! set names; any number of pool values (in any number of processes)
//! addressing the same pool name operate on the same sets.
//!
//! ```text
//! Unknown --associate--> Available --acquire--> Occupied
//!                        Available <--release-- Occupied
//! Available | Occupied --disassociate--> Unknown
//! ```
//!
//! ## Invariants
//!
//! - No identifier is in both sets
//! - An identifier is known to the pool iff it is in one of the sets
//! - `total_count() == available_count() + occupied_count()`
//!
//! Every state change goes through either the optimistic protocol
//! (`associate`, `acquire`) or a single atomic store command
//! (`disassociate`, `release`). Writing the sets any other way breaks the
//! invariants.

use respool_concurrency::{Decision, TransactionManager};
use respool_core::keys::{available_key, occupied_key};
use respool_core::{Error, Key, Member, Outcome, ReadOp, Reply, Result, Store, WriteBatch};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Where a known resource currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceStatus {
    /// Associated and idle
    Available,
    /// Associated and held by a consumer
    Occupied,
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceStatus::Available => f.write_str("available"),
            ResourceStatus::Occupied => f.write_str("occupied"),
        }
    }
}

/// Pool of resource identifiers shared through the store
pub struct ResourcePool<S: Store + ?Sized> {
    store: Arc<S>,
    manager: Arc<TransactionManager>,
    name: String,
    available: Key,
    occupied: Key,
}

impl<S: Store + ?Sized> ResourcePool<S> {
    /// Create a pool handle with its own transaction manager (default policy)
    pub fn new(store: Arc<S>, name: impl Into<String>) -> Self {
        Self::with_manager(store, Arc::new(TransactionManager::default()), name)
    }

    /// Create a pool handle that runs its transactions through `manager`
    pub fn with_manager(
        store: Arc<S>,
        manager: Arc<TransactionManager>,
        name: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            available: available_key(&name),
            occupied: occupied_key(&name),
            store,
            manager,
            name,
        }
    }

    /// Pool name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key of the available set
    pub fn available_key(&self) -> &Key {
        &self.available
    }

    /// Key of the occupied set
    pub fn occupied_key(&self) -> &Key {
        &self.occupied
    }

    // ========================================================================
    // State changes
    // ========================================================================

    /// Add a resource to the pool as available
    ///
    /// # Returns
    /// - `Done(true)` if the resource was added
    /// - `Done(false)` if it is already known, available or occupied
    /// - `Exhausted` if concurrent writers kept invalidating the check
    pub fn associate(&self, resource: impl Into<Member>) -> Result<Outcome<bool>> {
        let resource = resource.into();
        let (available, occupied) = (&self.available, &self.occupied);

        let outcome = self
            .manager
            .run(self.store.as_ref(), &[available.clone(), occupied.clone()], |s: &S| {
                if s.set_is_member(available, &resource)? || s.set_is_member(occupied, &resource)? {
                    return Ok(Decision::Abort(false));
                }
                Ok(Decision::Commit(
                    WriteBatch::new().set_add(available.clone(), resource.clone()),
                ))
            })?
            .resolve(first_bool)?;

        if outcome == Outcome::Done(true) {
            debug!(pool = %self.name, resource = %resource, "resource associated");
        }
        Ok(outcome)
    }

    /// Remove a resource from the pool, whichever set holds it
    ///
    /// Removal from a set that lacks the resource is a no-op, so both
    /// removals go out as one unconditional batch.
    ///
    /// Returns `true` if the resource was known to the pool.
    pub fn disassociate(&self, resource: impl Into<Member>) -> Result<bool> {
        let resource = resource.into();
        let batch = WriteBatch::new()
            .set_remove(self.available.clone(), resource.clone())
            .set_remove(self.occupied.clone(), resource.clone());

        let replies = self.store.execute(batch)?;
        let removed = match replies.as_slice() {
            [from_available, from_occupied] => {
                from_available.to_bool()? || from_occupied.to_bool()?
            }
            other => {
                return Err(Error::Internal(format!(
                    "expected 2 replies to disassociate, got {}",
                    other.len()
                )))
            }
        };

        if removed {
            debug!(pool = %self.name, resource = %resource, "resource disassociated");
        }
        Ok(removed)
    }

    /// Check out a random available resource
    ///
    /// # Returns
    /// - `Done(Some(resource))`: the resource is now occupied by the caller
    /// - `Done(None)`: nothing is available (not retried: an empty pool is a
    ///   state, not a conflict)
    /// - `Exhausted`: concurrent acquirers kept winning the race
    pub fn acquire(&self) -> Result<Outcome<Option<Member>>> {
        let (available, occupied) = (&self.available, &self.occupied);
        let mut chosen: Option<Member> = None;

        let outcome = self
            .manager
            .run(self.store.as_ref(), &[available.clone(), occupied.clone()], |s: &S| {
                match s.set_random_member(available)? {
                    None => Ok(Decision::Abort(None)),
                    Some(resource) => {
                        chosen = Some(resource.clone());
                        Ok(Decision::Commit(WriteBatch::new().set_move(
                            available.clone(),
                            occupied.clone(),
                            resource,
                        )))
                    }
                }
            })?
            .resolve(|replies| {
                // Under the watch the move cannot miss; treat a miss as nothing acquired
                Ok(if first_bool(replies)? { chosen.take() } else { None })
            })?;

        if let Outcome::Done(Some(resource)) = &outcome {
            debug!(pool = %self.name, resource = %resource, "resource acquired");
        }
        Ok(outcome)
    }

    /// Return an occupied resource to the available set
    ///
    /// The store's move is conditional on membership in the occupied set, so
    /// no watch is needed. Returns `false` if the resource was not occupied.
    pub fn release(&self, resource: impl Into<Member>) -> Result<bool> {
        let resource = resource.into();
        let moved = self
            .store
            .set_move(&self.occupied, &self.available, &resource)?;
        if moved {
            debug!(pool = %self.name, resource = %resource, "resource released");
        }
        Ok(moved)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Number of idle resources
    pub fn available_count(&self) -> Result<usize> {
        self.store.set_cardinality(&self.available)
    }

    /// Number of checked-out resources
    pub fn occupied_count(&self) -> Result<usize> {
        self.store.set_cardinality(&self.occupied)
    }

    /// Number of known resources, read with one batched read
    ///
    /// The two counts are read together but not isolated from concurrent
    /// writers; the sum may be stale by the time the caller uses it.
    pub fn total_count(&self) -> Result<usize> {
        let replies = self.store.read_batch(&[
            ReadOp::Cardinality {
                key: self.available.clone(),
            },
            ReadOp::Cardinality {
                key: self.occupied.clone(),
            },
        ])?;
        match replies.as_slice() {
            [available, occupied] => Ok(available.to_count()? + occupied.to_count()?),
            other => Err(reply_count_mismatch("total_count", other)),
        }
    }

    /// Check whether a resource is idle
    pub fn is_available(&self, resource: impl Into<Member>) -> Result<bool> {
        self.store.set_is_member(&self.available, &resource.into())
    }

    /// Check whether a resource is checked out
    pub fn is_occupied(&self, resource: impl Into<Member>) -> Result<bool> {
        self.store.set_is_member(&self.occupied, &resource.into())
    }

    /// Check whether a resource is known to the pool
    pub fn has(&self, resource: impl Into<Member>) -> Result<bool> {
        Ok(self.status(resource)?.is_some())
    }

    /// Where a resource sits, or `None` if the pool does not know it
    ///
    /// Same freshness caveat as [`ResourcePool::total_count`].
    pub fn status(&self, resource: impl Into<Member>) -> Result<Option<ResourceStatus>> {
        let resource = resource.into();
        let replies = self.store.read_batch(&[
            ReadOp::IsMember {
                key: self.available.clone(),
                member: resource.clone(),
            },
            ReadOp::IsMember {
                key: self.occupied.clone(),
                member: resource,
            },
        ])?;
        match replies.as_slice() {
            [available, occupied] => Ok(if available.to_bool()? {
                Some(ResourceStatus::Available)
            } else if occupied.to_bool()? {
                Some(ResourceStatus::Occupied)
            } else {
                None
            }),
            other => Err(reply_count_mismatch("status", other)),
        }
    }
}

impl<S: Store + ?Sized> Clone for ResourcePool<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            manager: Arc::clone(&self.manager),
            name: self.name.clone(),
            available: self.available.clone(),
            occupied: self.occupied.clone(),
        }
    }
}

impl<S: Store + ?Sized> fmt::Debug for ResourcePool<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourcePool")
            .field("name", &self.name)
            .field("available", &self.available)
            .field("occupied", &self.occupied)
            .finish()
    }
}

pub(crate) fn first_bool(replies: Vec<Reply>) -> Result<bool> {
    match replies.first() {
        Some(reply) => reply.to_bool(),
        None => Err(Error::Internal("empty reply to committed batch".to_string())),
    }
}

fn reply_count_mismatch(op: &str, replies: &[Reply]) -> Error {
    Error::Internal(format!("expected 2 replies to {}, got {}", op, replies.len()))
}
