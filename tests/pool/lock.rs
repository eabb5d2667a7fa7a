//! Identity lock through the facade

use std::sync::Barrier;
use std::thread;

use crate::chaos::{create_chaos_respool, ChaosStore};
use crate::*;

#[test]
fn test_lock_lifecycle() {
    let respool = create_respool();
    let lock = respool.identity_lock("lock:10086");

    assert!(!lock.is_locked().unwrap());
    assert!(lock.acquire("top-secret").unwrap());
    assert!(!lock.acquire("wrong-secret").unwrap());
    assert!(lock.is_locked().unwrap());

    assert_eq!(lock.release("wrong-secret").unwrap(), Outcome::Done(false));
    assert_eq!(lock.holder().unwrap(), Some(b"top-secret".to_vec()));

    assert_eq!(lock.release("top-secret").unwrap(), Outcome::Done(true));
    assert!(!lock.is_locked().unwrap());
    assert_eq!(lock.release("top-secret").unwrap(), Outcome::Done(false));
}

#[test]
fn test_lock_shares_store_with_pools() {
    let respool = create_respool();
    let lock = respool.identity_lock("lock:workers");
    let pool = respool.pool("workers");
    assert_eq!(pool.associate("w1").unwrap(), Outcome::Done(true));

    assert!(lock.acquire("me").unwrap());
    assert_eq!(respool.store().get(lock.key()).unwrap(), Some(b"me".to_vec()));
    assert_eq!(pool.total_count().unwrap(), 1);
}

#[test]
fn test_one_winner_among_contenders() {
    const THREADS: usize = 8;

    let respool = create_respool();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let lock = respool.identity_lock("lock:race");
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (i, lock.acquire(format!("client-{}", i)).unwrap())
            })
        })
        .collect();

    let winners: Vec<usize> = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|(_, won)| *won)
        .map(|(i, _)| i)
        .collect();

    assert_eq!(winners.len(), 1);
    let lock = respool.identity_lock("lock:race");
    let holder = format!("client-{}", winners[0]);
    assert_eq!(lock.holder().unwrap(), Some(holder.clone().into_bytes()));
    assert_eq!(lock.release(holder).unwrap(), Outcome::Done(true));
}

#[test]
fn test_token_replaced_mid_transaction_conflicts() {
    let (respool, store) = create_chaos_respool(RetryPolicy::single_attempt());
    let lock = respool.identity_lock("lock:flaky");
    assert!(lock.acquire("owner").unwrap());

    let manager = TransactionManager::new(RetryPolicy::single_attempt());
    let key = lock.key().clone();
    let outcome = manager
        .run(store.as_ref(), std::slice::from_ref(&key), |s: &ChaosStore| {
            // Another client overwrites the token after the watch began
            s.inner().set(&key, b"intruder")?;
            Ok(Decision::<()>::Commit(WriteBatch::new().delete(key.clone())))
        })
        .unwrap();
    assert!(outcome.is_exhausted());

    assert_eq!(lock.holder().unwrap(), Some(b"intruder".to_vec()));
    assert_eq!(lock.release("owner").unwrap(), Outcome::Done(false));
}
