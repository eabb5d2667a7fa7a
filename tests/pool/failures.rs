//! Failure Mode Tests
//!
//! Store errors surface as errors and are never retried. Running out of
//! attempts surfaces as `Exhausted`, distinct from every definite answer.

use crate::chaos::{create_chaos_respool, ChaosStore};
use crate::*;

fn quick(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::bounded(max_attempts)
        .with_backoff(Backoff::None)
        .with_jitter(false)
}

fn filled(respool: &Respool<ChaosStore>, count: usize) -> ResourcePool<ChaosStore> {
    let pool = respool.pool("flaky");
    for i in 0..count {
        assert_eq!(pool.associate(resource(i)).unwrap(), Outcome::Done(true));
    }
    pool
}

// =============================================================================
// CONNECTION FAILURES
// =============================================================================

#[test]
fn test_every_operation_propagates_connection_error() {
    let (respool, store) = create_chaos_respool(quick(5));
    let pool = filled(&respool, 1);
    store.set_down(true);

    assert!(pool.associate("r9").unwrap_err().is_connection());
    assert!(pool.acquire().unwrap_err().is_connection());
    assert!(pool.release(resource(0)).unwrap_err().is_connection());
    assert!(pool.disassociate(resource(0)).unwrap_err().is_connection());
    assert!(pool.available_count().unwrap_err().is_connection());
    assert!(pool.total_count().unwrap_err().is_connection());
    assert!(pool.status(resource(0)).unwrap_err().is_connection());

    store.heal();
    assert_eq!(pool.status(resource(0)).unwrap(), Some(ResourceStatus::Available));
}

#[test]
fn test_connection_error_is_not_retried() {
    let (respool, store) = create_chaos_respool(quick(10));
    let pool = filled(&respool, 2);
    let before = respool.transaction_metrics().attempts;

    store.set_down(true);
    assert!(pool.acquire().is_err());

    assert_eq!(respool.transaction_metrics().attempts - before, 1);
}

#[test]
fn test_connection_error_converts_to_facade_error() {
    let (respool, store) = create_chaos_respool(quick(1));
    let pool = filled(&respool, 0);
    store.set_down(true);

    let err: Error = pool.acquire().unwrap_err().into();
    assert!(err.is_connection());
    assert!(err.to_string().contains("connection refused"));
}

// =============================================================================
// EXHAUSTION
// =============================================================================

#[test]
fn test_acquire_exhausts_under_constant_interference() {
    let (respool, store) = create_chaos_respool(quick(3));
    let pool = filled(&respool, 2);
    store.interfere_forever();

    assert_eq!(pool.acquire().unwrap(), Outcome::Exhausted { attempts: 3 });

    // Nothing moved
    store.heal();
    assert_eq!(pool.available_count().unwrap(), 2);
    assert_eq!(pool.occupied_count().unwrap(), 0);
    assert_eq!(respool.transaction_metrics().exhausted, 1);
}

#[test]
fn test_exhausted_is_distinct_from_empty() {
    let (respool, store) = create_chaos_respool(quick(3));
    let empty_pool = filled(&respool, 0);
    store.interfere_forever();

    // An empty pool is a definite answer even while other writers are active
    assert_eq!(empty_pool.acquire().unwrap(), Outcome::Done(None));

    let busy = respool.pool("busy");
    store.heal();
    assert_eq!(busy.associate("r").unwrap(), Outcome::Done(true));
    store.interfere_forever();

    let outcome = busy.acquire().unwrap();
    assert!(outcome.is_exhausted());
    assert_ne!(outcome, Outcome::Done(None));
}

#[test]
fn test_acquire_succeeds_once_interference_stops() {
    let (respool, store) = create_chaos_respool(quick(3));
    let pool = filled(&respool, 1);
    store.interfere(2);

    assert_eq!(pool.acquire().unwrap(), Outcome::Done(Some(resource(0))));
    assert_eq!(store.interferences(), 2);

    let metrics = respool.transaction_metrics();
    assert!(metrics.conflicts >= 2);
}

#[test]
fn test_single_attempt_gives_up_on_first_conflict() {
    let (respool, store) = create_chaos_respool(RetryPolicy::single_attempt());
    let pool = filled(&respool, 1);
    store.interfere(1);

    assert_eq!(pool.acquire().unwrap(), Outcome::Exhausted { attempts: 1 });
    assert_eq!(pool.acquire().unwrap(), Outcome::Done(Some(resource(0))));
}

#[test]
fn test_associate_exhausts_under_constant_interference() {
    let (respool, store) = create_chaos_respool(quick(4));
    let pool = filled(&respool, 0);
    store.interfere_forever();

    assert_eq!(pool.associate("r").unwrap(), Outcome::Exhausted { attempts: 4 });

    store.heal();
    assert!(!pool.has("r").unwrap());
}

#[test]
fn test_unconditional_operations_ignore_interference() {
    let (respool, store) = create_chaos_respool(quick(1));
    let pool = filled(&respool, 2);
    assert!(pool.acquire().unwrap().done().flatten().is_some());
    store.interfere_forever();

    // Neither call watches anything, so the foreign writes cannot fail them
    assert!(pool.disassociate(resource(0)).unwrap());
    assert!(!pool.release(resource(0)).unwrap());
    assert_eq!(pool.total_count().unwrap(), 1);
    assert_eq!(store.inner().members(pool.available_key()).unwrap().len()
        + store.inner().members(pool.occupied_key()).unwrap().len(), 1);
}
