//! Property tests: random operation sequences against a set model
//!
//! After every step the store must match the model exactly, the two sets
//! must be disjoint, and the total count must only change through
//! associate and disassociate.

use proptest::prelude::*;
use rustc_hash::FxHashSet;

use crate::*;

#[derive(Debug, Clone)]
enum Op {
    Associate(u8),
    Disassociate(u8),
    Acquire,
    Release(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..8).prop_map(Op::Associate),
        (0u8..8).prop_map(Op::Disassociate),
        Just(Op::Acquire),
        Just(Op::Acquire),
        (0u8..8).prop_map(Op::Release),
    ]
}

#[derive(Default)]
struct Model {
    available: FxHashSet<Member>,
    occupied: FxHashSet<Member>,
}

impl Model {
    fn sorted(set: &FxHashSet<Member>) -> Vec<Member> {
        let mut v: Vec<Member> = set.iter().cloned().collect();
        v.sort();
        v
    }

    fn total(&self) -> usize {
        self.available.len() + self.occupied.len()
    }
}

fn id(n: u8) -> Member {
    Member::from(format!("res{}", n))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn pool_matches_set_model(ops in prop::collection::vec(op(), 1..60)) {
        let respool = create_respool();
        let pool = respool.pool("model");
        let mut model = Model::default();

        for op in ops {
            let total_before = model.total();
            match op {
                Op::Associate(n) => {
                    let r = id(n);
                    let expected = !model.available.contains(&r) && !model.occupied.contains(&r);
                    prop_assert_eq!(pool.associate(r.clone()).unwrap(), Outcome::Done(expected));
                    if expected {
                        model.available.insert(r);
                        prop_assert_eq!(model.total(), total_before + 1);
                    }
                }
                Op::Disassociate(n) => {
                    let r = id(n);
                    let expected = model.available.remove(&r) | model.occupied.remove(&r);
                    prop_assert_eq!(pool.disassociate(r).unwrap(), expected);
                }
                Op::Acquire => match pool.acquire().unwrap() {
                    Outcome::Done(Some(r)) => {
                        prop_assert!(model.available.remove(&r), "acquired {} was not available", r);
                        model.occupied.insert(r);
                    }
                    Outcome::Done(None) => prop_assert!(model.available.is_empty()),
                    Outcome::Exhausted { attempts } => {
                        prop_assert!(false, "uncontended acquire exhausted after {}", attempts);
                    }
                },
                Op::Release(n) => {
                    let r = id(n);
                    let expected = model.occupied.remove(&r);
                    if expected {
                        model.available.insert(r.clone());
                    }
                    prop_assert_eq!(pool.release(r).unwrap(), expected);
                }
            }

            let (available, occupied) = snapshot(&respool, &pool);
            assert_disjoint(&available, &occupied);
            prop_assert_eq!(&available, &Model::sorted(&model.available));
            prop_assert_eq!(&occupied, &Model::sorted(&model.occupied));
            prop_assert_eq!(pool.total_count().unwrap(), model.total());
        }
    }
}
