//! Basic Resource Pool Operations Tests
//!
//! Tests for associate, disassociate, acquire, release and the queries.

use crate::*;

// =============================================================================
// WALKTHROUGH
// =============================================================================

#[test]
fn test_workers_walkthrough() {
    let pool = create_pool("workers");

    assert_eq!(pool.associate("w1").unwrap(), Outcome::Done(true));
    assert_eq!(pool.associate("w1").unwrap(), Outcome::Done(false));
    assert_eq!(pool.associate("w2").unwrap(), Outcome::Done(true));
    assert_eq!(pool.total_count().unwrap(), 2);

    let acquired = pool.acquire().unwrap().done().flatten().unwrap();
    assert!(acquired == "w1" || acquired == "w2");
    let other = if acquired == "w1" { "w2" } else { "w1" };
    assert_eq!(pool.occupied_count().unwrap(), 1);
    assert_eq!(pool.available_count().unwrap(), 1);

    assert!(pool.release(acquired.clone()).unwrap());
    assert_eq!(pool.available_count().unwrap(), 2);

    assert!(pool.disassociate(other).unwrap());
    assert_eq!(pool.total_count().unwrap(), 1);
    assert!(pool.has(acquired).unwrap());
}

#[test]
fn test_five_workers_demo() {
    let pool = create_pool("workers");
    for i in 1..=5 {
        assert!(pool.associate(format!("worker{}", i)).unwrap().unwrap_or(false));
    }

    assert!(pool.acquire().unwrap().done().flatten().is_some());
    assert!(pool.acquire().unwrap().done().flatten().is_some());
    let w = pool.acquire().unwrap().done().flatten().unwrap();
    assert!(pool.release(w).unwrap());

    // worker1 may be available or occupied; either way it is known
    assert!(pool.disassociate("worker1").unwrap());
    assert_eq!(pool.total_count().unwrap(), 4);
    assert_eq!(pool.occupied_count().unwrap() + pool.available_count().unwrap(), 4);
}

// =============================================================================
// ROUND TRIP
// =============================================================================

#[test]
fn test_single_resource_round_trip() {
    let pool = create_pool("solo");
    assert_eq!(pool.associate("r").unwrap(), Outcome::Done(true));

    assert_eq!(pool.acquire().unwrap(), Outcome::Done(Some(Member::from("r"))));
    assert_eq!(pool.acquire().unwrap(), Outcome::Done(None));
    assert!(pool.release("r").unwrap());
    assert!(pool.is_available("r").unwrap());
}

#[test]
fn test_drain_then_refill() {
    let respool = create_respool();
    let pool = create_filled_pool(&respool, "drain", 5);

    let mut acquired = Vec::new();
    while let Outcome::Done(Some(r)) = pool.acquire().unwrap() {
        acquired.push(r);
    }
    acquired.sort();
    assert_eq!(acquired, (0..5).map(resource).collect::<Vec<_>>());
    assert_eq!(pool.available_count().unwrap(), 0);
    assert_eq!(pool.occupied_count().unwrap(), 5);

    for r in &acquired {
        assert!(pool.release(r).unwrap());
    }
    assert_eq!(pool.available_count().unwrap(), 5);
}

// =============================================================================
// EDGE CASES
// =============================================================================

#[test]
fn test_release_of_available_resource_is_false() {
    let pool = create_pool("p");
    assert_eq!(pool.associate("r").unwrap(), Outcome::Done(true));
    assert!(!pool.release("r").unwrap());
    assert!(pool.is_available("r").unwrap());
}

#[test]
fn test_release_of_unknown_resource_is_false() {
    let pool = create_pool("p");
    assert!(!pool.release("ghost").unwrap());
    assert!(!pool.has("ghost").unwrap());
}

#[test]
fn test_disassociate_unknown_resource_is_false() {
    let pool = create_pool("p");
    assert!(!pool.disassociate("ghost").unwrap());
}

#[test]
fn test_disassociate_idempotence() {
    let pool = create_pool("p");
    assert_eq!(pool.associate("r").unwrap(), Outcome::Done(true));
    assert!(pool.disassociate("r").unwrap());
    assert!(!pool.disassociate("r").unwrap());
}

#[test]
fn test_reassociate_after_disassociate() {
    let pool = create_pool("p");
    assert_eq!(pool.associate("r").unwrap(), Outcome::Done(true));
    assert_eq!(pool.acquire().unwrap(), Outcome::Done(Some(Member::from("r"))));
    assert!(pool.disassociate("r").unwrap());
    assert_eq!(pool.associate("r").unwrap(), Outcome::Done(true));
    assert_eq!(pool.status("r").unwrap(), Some(ResourceStatus::Available));
}

#[test]
fn test_counts_on_empty_pool() {
    let pool = create_pool("empty");
    assert_eq!(pool.available_count().unwrap(), 0);
    assert_eq!(pool.occupied_count().unwrap(), 0);
    assert_eq!(pool.total_count().unwrap(), 0);
}

#[test]
fn test_pools_are_isolated_by_name() {
    let respool = create_respool();
    let a = respool.pool("a");
    let b = respool.pool("b");
    assert_eq!(a.associate("r").unwrap(), Outcome::Done(true));
    assert!(!b.has("r").unwrap());
    assert_eq!(b.acquire().unwrap(), Outcome::Done(None));
}

#[test]
fn test_pool_keys_in_store() {
    let respool = create_respool();
    let pool = respool.pool("workers");
    assert_eq!(pool.associate("w1").unwrap(), Outcome::Done(true));
    assert_eq!(pool.associate("w2").unwrap(), Outcome::Done(true));
    assert!(pool.acquire().unwrap().done().flatten().is_some());

    let (available, occupied) = snapshot(&respool, &pool);
    assert_eq!(available.len(), 1);
    assert_eq!(occupied.len(), 1);
    assert_eq!(pool.available_key(), &available_key("workers"));
    assert_eq!(pool.occupied_key(), &occupied_key("workers"));
}
