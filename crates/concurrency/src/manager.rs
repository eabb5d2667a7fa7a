//! Transaction manager for the optimistic retry loop
//!
//! Runs protocol attempts until one commits or aborts, or the retry policy
//! gives up:
//!
//! ```text
//! loop:
//!   1. attempt()            - watch, read, decide, conditional commit
//!   2. Applied / Aborted    - return it
//!   3. Conflict             - if the policy allows another attempt:
//!                               pause per backoff, go to 1
//!                             else return Exhausted { attempts }
//! ```
//!
//! Store errors end the loop at once. Only conflicts are retried; transport
//! failures are the caller's to handle.

use crate::protocol::{attempt, Attempt, Decision, TxnOutcome};
use crate::retry::RetryPolicy;
use respool_core::{Key, Result, Store};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};

/// Snapshot of manager counters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransactionMetrics {
    /// Attempts started
    pub attempts: u64,
    /// Runs that ended with an applied batch
    pub commits: u64,
    /// Attempts rejected by a conflicting writer
    pub conflicts: u64,
    /// Runs that ended with the body deciding not to write
    pub aborts: u64,
    /// Runs that hit the retry bound
    pub exhausted: u64,
    /// Fraction of attempts that did not conflict (1.0 when idle)
    pub success_rate: f64,
}

/// Drives the optimistic protocol under a retry policy
///
/// Shared by every primitive handed out by one facade, so its counters
/// describe all of them together.
///
/// # Thread Safety
///
/// All state is atomic; `run` may be called from any number of threads.
#[derive(Debug)]
pub struct TransactionManager {
    policy: RetryPolicy,
    attempts: AtomicU64,
    commits: AtomicU64,
    conflicts: AtomicU64,
    aborts: AtomicU64,
    exhausted: AtomicU64,
}

impl TransactionManager {
    /// Create a manager with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempts: AtomicU64::new(0),
            commits: AtomicU64::new(0),
            conflicts: AtomicU64::new(0),
            aborts: AtomicU64::new(0),
            exhausted: AtomicU64::new(0),
        }
    }

    /// The retry policy in force
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `body` under the optimistic protocol, watching `keys`
    ///
    /// # Returns
    /// - `Applied(replies)` once a batch commits
    /// - `Aborted(value)` as soon as the body decides not to write
    /// - `Exhausted { attempts }` when every permitted attempt conflicted
    /// - `Err` on any store error
    pub fn run<S, T, F>(&self, store: &S, keys: &[Key], mut body: F) -> Result<TxnOutcome<T>>
    where
        S: Store + ?Sized,
        F: FnMut(&S) -> Result<Decision<T>>,
    {
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            self.attempts.fetch_add(1, Ordering::Relaxed);
            trace!(attempt = attempts, keys = keys.len(), "optimistic attempt");

            match attempt(store, keys, &mut body)? {
                Attempt::Applied(replies) => {
                    self.commits.fetch_add(1, Ordering::Relaxed);
                    return Ok(TxnOutcome::Applied(replies));
                }
                Attempt::Aborted(value) => {
                    self.aborts.fetch_add(1, Ordering::Relaxed);
                    return Ok(TxnOutcome::Aborted(value));
                }
                Attempt::Conflict => {
                    self.conflicts.fetch_add(1, Ordering::Relaxed);
                    if !self.policy.allows_retry_after(attempts) {
                        self.exhausted.fetch_add(1, Ordering::Relaxed);
                        warn!(attempts, keys = ?keys, "optimistic transaction gave up");
                        return Ok(TxnOutcome::Exhausted { attempts });
                    }
                    debug!(attempt = attempts, keys = ?keys, "watched key changed, retrying");
                    self.policy.pause(attempts);
                }
            }
        }
    }

    /// Counters since creation
    pub fn metrics(&self) -> TransactionMetrics {
        let attempts = self.attempts.load(Ordering::Relaxed);
        let conflicts = self.conflicts.load(Ordering::Relaxed);
        let success_rate = if attempts == 0 {
            1.0
        } else {
            (attempts - conflicts.min(attempts)) as f64 / attempts as f64
        };
        TransactionMetrics {
            attempts,
            commits: self.commits.load(Ordering::Relaxed),
            conflicts,
            aborts: self.aborts.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
            success_rate,
        }
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

/// Run `body` under the optimistic protocol with a one-off manager
///
/// Convenience for callers that do not need shared counters.
pub fn run_optimistic<S, T, F>(
    store: &S,
    keys: &[Key],
    policy: RetryPolicy,
    body: F,
) -> Result<TxnOutcome<T>>
where
    S: Store + ?Sized,
    F: FnMut(&S) -> Result<Decision<T>>,
{
    TransactionManager::new(policy).run(store, keys, body)
}
