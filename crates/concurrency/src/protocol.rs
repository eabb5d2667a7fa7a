//! Optimistic transaction protocol
//!
//! One attempt of the protocol is:
//!
//! ```text
//! 1. watch(keys)           - record versions of every key the decision reads
//! 2. body(store)           - read current state, decide
//! 3a. Decision::Abort(v)   - unwatch, return Attempt::Aborted(v)
//! 3b. Decision::Commit(b)  - conditional commit of batch b
//! 4. Applied(replies)      - all of b applied atomically
//!    Conflict              - a watched key changed, nothing applied
//! ```
//!
//! [`crate::TransactionManager::run`] repeats attempts from step 1 while they
//! conflict, as the decision in step 2 may be stale.
//!
//! ## Purity Requirement
//!
//! The body may run several times. It must only read through the store it is
//! handed and build its decision from those reads; side effects belong after
//! the protocol returns.

use respool_core::{CommitOutcome, Key, Outcome, Reply, Result, Store, WriteBatch};

/// What the body decided after reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<T> {
    /// No write is needed; return this value
    Abort(T),
    /// Commit this batch if the watched keys are unchanged
    Commit(WriteBatch),
}

/// Result of a single protocol attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// The batch was applied; replies are in command order
    Applied(Vec<Reply>),
    /// The body decided no write was needed
    Aborted(T),
    /// A watched key changed before commit; nothing was applied
    Conflict,
}

/// Result of the protocol after retries
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxnOutcome<T> {
    /// The batch was applied; replies are in command order
    Applied(Vec<Reply>),
    /// The body decided no write was needed
    Aborted(T),
    /// Every permitted attempt conflicted
    Exhausted {
        /// Attempts made
        attempts: u32,
    },
}

impl<T> TxnOutcome<T> {
    /// Collapse into an [`Outcome`], interpreting commit replies with `on_applied`
    ///
    /// An abort value passes through as `Done`.
    pub fn resolve<F>(self, on_applied: F) -> Result<Outcome<T>>
    where
        F: FnOnce(Vec<Reply>) -> Result<T>,
    {
        match self {
            TxnOutcome::Applied(replies) => on_applied(replies).map(Outcome::Done),
            TxnOutcome::Aborted(value) => Ok(Outcome::Done(value)),
            TxnOutcome::Exhausted { attempts } => Ok(Outcome::Exhausted { attempts }),
        }
    }

    /// Check if the batch was applied
    pub fn is_applied(&self) -> bool {
        matches!(self, TxnOutcome::Applied(_))
    }

    /// Check if the retry budget ran out
    pub fn is_exhausted(&self) -> bool {
        matches!(self, TxnOutcome::Exhausted { .. })
    }
}

/// Run one protocol attempt against `store`
///
/// Store errors from any step propagate unchanged; the watch is released
/// first when the body fails or aborts.
pub fn attempt<S, T, F>(store: &S, keys: &[Key], body: &mut F) -> Result<Attempt<T>>
where
    S: Store + ?Sized,
    F: FnMut(&S) -> Result<Decision<T>>,
{
    let watch = store.watch(keys)?;

    let decision = match body(store) {
        Ok(decision) => decision,
        Err(e) => {
            store.unwatch(watch);
            return Err(e);
        }
    };

    match decision {
        Decision::Abort(value) => {
            store.unwatch(watch);
            Ok(Attempt::Aborted(value))
        }
        Decision::Commit(batch) => match store.commit(&watch, batch)? {
            CommitOutcome::Applied(replies) => Ok(Attempt::Applied(replies)),
            CommitOutcome::Conflict => Ok(Attempt::Conflict),
        },
    }
}
