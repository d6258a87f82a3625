// jester-core - Property-based tests for Hash/Eq consistency
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The fundamental hash contract: if `a == b` then `hash(a) == hash(b)`,
//! including the cross-kind cases (int vs big int vs normalised ratio,
//! array map vs hash map, list vs vector vs seq) and metadata inertness.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use num_bigint::BigInt;
use proptest::prelude::*;

use jester_reader::{
    seq_from_collection, ArrayMap, JesterVal, PersistentHashMap, PersistentSet,
};

fn compute_hash(val: &JesterVal) -> u64 {
    let mut hasher = DefaultHasher::new();
    val.hash(&mut hasher);
    hasher.finish()
}

fn assert_hash_eq_consistent(a: &JesterVal, b: &JesterVal, msg: &str) {
    assert_eq!(a, b, "{} - values should be equal", msg);
    assert_eq!(
        compute_hash(a),
        compute_hash(b),
        "{} - hashes should be equal",
        msg
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn int_reflexive_and_consistent(n in any::<i64>()) {
        let a = JesterVal::int(n);
        let b = JesterVal::int(n);
        assert_hash_eq_consistent(&a, &b, "same int");
    }

    #[test]
    fn int_equals_bigint(n in any::<i64>()) {
        let a = JesterVal::int(n);
        let b = JesterVal::bigint(BigInt::from(n));
        assert_hash_eq_consistent(&a, &b, "int vs big int");
    }

    #[test]
    fn ratio_with_unit_denominator_is_int(n in -10_000i64..10_000) {
        let a = JesterVal::int(n);
        let b = JesterVal::ratio(n, 1);
        assert_hash_eq_consistent(&a, &b, "int vs ratio n/1");
    }

    #[test]
    fn ratio_normalisation_consistent(n in 1i64..500, d in 1i64..500, k in 1i64..20) {
        let a = JesterVal::ratio(n, d);
        let b = JesterVal::ratio(n * k, d * k);
        assert_hash_eq_consistent(&a, &b, "ratio vs scaled ratio");
    }

    #[test]
    fn float_reflexive(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        let a = JesterVal::float(f);
        let b = JesterVal::float(f);
        assert_hash_eq_consistent(&a, &b, "same float");
    }

    #[test]
    fn list_equals_vector_and_seq(elements in prop::collection::vec(-100i64..100, 0..8)) {
        let items: Vec<JesterVal> = elements.iter().map(|&n| JesterVal::int(n)).collect();
        let list = JesterVal::list(items.clone());
        let vector = JesterVal::vector(items);
        assert_hash_eq_consistent(&list, &vector, "list vs vector");
        if let Some(vseq) = seq_from_collection(&vector) {
            if vseq != JesterVal::Nil {
                assert_hash_eq_consistent(&list, &vseq, "list vs vector seq");
            }
        }
    }

    #[test]
    fn array_map_equals_hash_map(entries in prop::collection::hash_map(-50i64..50, any::<i64>(), 0..16)) {
        let flat: Vec<JesterVal> = entries
            .iter()
            .flat_map(|(k, v)| [JesterVal::int(*k), JesterVal::int(*v)])
            .collect();
        let am = JesterVal::ArrayMap(ArrayMap::from_flat(flat));
        let hm = JesterVal::HashMap(PersistentHashMap::from_entries(
            entries.iter().map(|(k, v)| (JesterVal::int(*k), JesterVal::int(*v))),
        ));
        assert_hash_eq_consistent(&am, &hm, "array map vs hash map");
    }

    #[test]
    fn set_order_insensitive(elements in prop::collection::vec(-50i64..50, 0..20)) {
        let forward: Vec<JesterVal> = elements.iter().map(|&n| JesterVal::int(n)).collect();
        let mut reversed = forward.clone();
        reversed.reverse();
        let a = JesterVal::Set(PersistentSet::from_vec(forward));
        let b = JesterVal::Set(PersistentSet::from_vec(reversed));
        assert_hash_eq_consistent(&a, &b, "set vs reversed set");
    }

    #[test]
    fn metadata_is_inert(elements in prop::collection::vec(-50i64..50, 0..8)) {
        let items: Vec<JesterVal> = elements.iter().map(|&n| JesterVal::int(n)).collect();
        let plain = JesterVal::vector(items);
        let meta = JesterVal::ArrayMap(ArrayMap::from_flat(vec![
            JesterVal::keyword("m"),
            JesterVal::Bool(true),
        ]));
        let tagged = plain.with_meta(meta).expect("vectors carry metadata");
        assert_hash_eq_consistent(&plain, &tagged, "plain vs with-meta");
    }

    #[test]
    fn strings_and_keywords_reflexive(s in "[a-z]{0,12}") {
        assert_hash_eq_consistent(
            &JesterVal::string(s.clone()),
            &JesterVal::string(s.clone()),
            "same string",
        );
        if !s.is_empty() {
            assert_hash_eq_consistent(
                &JesterVal::keyword(&s),
                &JesterVal::keyword(&s),
                "same keyword",
            );
        }
    }
}
