// jester-core - Property-based tests for the persistent collections
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Model-based checks: the hash map against `std::collections::HashMap`,
//! the vector against `Vec`, plus the immutability and promotion
//! invariants.

use std::collections::HashMap as StdHashMap;

use proptest::prelude::*;

use jester_reader::{ArrayMap, JesterVal, PersistentHashMap, PersistentVector};

#[derive(Clone, Debug)]
enum MapOp {
    Assoc(i64, i64),
    Without(i64),
}

fn map_op() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        (-40i64..40, any::<i64>()).prop_map(|(k, v)| MapOp::Assoc(k, v)),
        (-40i64..40).prop_map(MapOp::Without),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(150))]

    /// The HAMT agrees with the standard library map under arbitrary
    /// assoc/without interleavings.
    #[test]
    fn hash_map_matches_model(ops in prop::collection::vec(map_op(), 0..120)) {
        let mut model: StdHashMap<i64, i64> = StdHashMap::new();
        let mut subject = PersistentHashMap::new();
        for op in ops {
            match op {
                MapOp::Assoc(k, v) => {
                    model.insert(k, v);
                    subject = subject.assoc(JesterVal::int(k), JesterVal::int(v));
                }
                MapOp::Without(k) => {
                    model.remove(&k);
                    subject = subject.without(&JesterVal::int(k));
                }
            }
            prop_assert_eq!(subject.count(), model.len());
        }
        for (k, v) in &model {
            prop_assert_eq!(subject.get(&JesterVal::int(*k)), Some(&JesterVal::int(*v)));
        }
        // Traversal covers exactly the model's entries.
        let mut seen: Vec<i64> = subject
            .iter()
            .map(|(k, _)| match k {
                JesterVal::Int(i) => *i,
                other => panic!("unexpected key {:?}", other),
            })
            .collect();
        seen.sort_unstable();
        let mut expected: Vec<i64> = model.keys().copied().collect();
        expected.sort_unstable();
        prop_assert_eq!(seen, expected);
    }

    /// Assoc never mutates the original map.
    #[test]
    fn hash_map_assoc_is_persistent(keys in prop::collection::vec(-30i64..30, 1..40), extra in 100i64..200) {
        let mut m = PersistentHashMap::new();
        for k in &keys {
            m = m.assoc(JesterVal::int(*k), JesterVal::int(*k));
        }
        let before_count = m.count();
        let changed = m.assoc(JesterVal::int(extra), JesterVal::int(0));
        let removed = m.without(&JesterVal::int(keys[0]));
        prop_assert_eq!(m.count(), before_count);
        prop_assert_eq!(m.get(&JesterVal::int(keys[0])), Some(&JesterVal::int(keys[0])));
        prop_assert_eq!(changed.count(), before_count + 1);
        prop_assert_eq!(removed.count(), before_count - 1);
    }

    /// The vector agrees with `Vec` under conj/assoc/pop.
    #[test]
    fn vector_matches_model(values in prop::collection::vec(any::<i64>(), 0..200), pops in 0usize..50) {
        let mut subject = PersistentVector::new();
        for v in &values {
            subject = subject.conj(JesterVal::int(*v));
        }
        prop_assert_eq!(subject.count(), values.len());
        for (i, v) in values.iter().enumerate() {
            prop_assert_eq!(subject.nth(i), Some(&JesterVal::int(*v)));
        }
        let mut model = values.clone();
        for _ in 0..pops.min(values.len()) {
            model.pop();
            subject = subject.pop().expect("non-empty vector pops");
        }
        prop_assert_eq!(subject.count(), model.len());
        for (i, v) in model.iter().enumerate() {
            prop_assert_eq!(subject.nth(i), Some(&JesterVal::int(*v)));
        }
    }

    /// assoc_at replaces exactly one slot and shares the rest.
    #[test]
    fn vector_assoc_at_is_persistent(
        len in 1usize..120,
        index_seed in any::<usize>(),
        replacement in any::<i64>(),
    ) {
        let index = index_seed % len;
        let original = PersistentVector::from_vec(
            (0..len as i64).map(JesterVal::int).collect(),
        );
        let changed = original
            .assoc_at(index, JesterVal::int(replacement))
            .expect("index within bounds");
        prop_assert_eq!(original.nth(index), Some(&JesterVal::int(index as i64)));
        prop_assert_eq!(changed.nth(index), Some(&JesterVal::int(replacement)));
        for i in (0..len).filter(|&i| i != index) {
            prop_assert_eq!(changed.nth(i), original.nth(i));
        }
    }

    /// An array map promotes to a hash map exactly past 16 entries, and
    /// the promoted map retains every entry.
    #[test]
    fn array_map_promotion(count in 1usize..40) {
        let mut m = JesterVal::ArrayMap(ArrayMap::new());
        for i in 0..count as i64 {
            m = match &m {
                JesterVal::ArrayMap(am) => am.assoc(JesterVal::int(i), JesterVal::int(i * 10)),
                JesterVal::HashMap(hm) => {
                    JesterVal::HashMap(hm.assoc(JesterVal::int(i), JesterVal::int(i * 10)))
                }
                other => panic!("unexpected map kind {:?}", other),
            };
        }
        if count <= 16 {
            prop_assert!(matches!(m, JesterVal::ArrayMap(_)));
        } else {
            prop_assert!(matches!(m, JesterVal::HashMap(_)));
        }
        for i in 0..count as i64 {
            prop_assert_eq!(
                jester_reader::map_get(&m, &JesterVal::int(i)),
                Some(JesterVal::int(i * 10))
            );
        }
    }
}
