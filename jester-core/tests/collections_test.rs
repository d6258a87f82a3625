// jester-core - Collection tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod common;

use common::eval_str;
use jester_reader::JesterVal;

#[test]
fn test_map_literal_and_get() {
    assert_eval!("(get {:a 1 :b 2} :a)", "1");
    assert_eval!("(get {:a 1} :missing)", "nil");
    assert_eval!("(get {:a 1} :missing :default)", ":default");
    assert_eval!("(get nil :k)", "nil");
}

#[test]
fn test_assoc_dissoc() {
    assert_eval!("(assoc {:a 1} :b 2)", "{:a 1, :b 2}");
    assert_eval!("(dissoc {:a 1 :b 2} :a)", "{:b 2}");
    assert_eval!("(assoc nil :a 1)", "{:a 1}");
    // Vector assoc replaces at an existing index; index == count appends.
    assert_eval!("(assoc [1 2 3] 1 :x)", "[1 :x 3]");
    assert_eval!("(assoc [1 2] 2 3)", "[1 2 3]");
    assert_eval_err_contains!("(assoc [1 2] 5 :x)", "out of bounds");
}

#[test]
fn test_persistence_under_assoc() {
    assert_eval!(
        "(def a {:k 1})
         (def b (assoc a :k 2))
         [(get a :k) (get b :k) (count a)]",
        "[1 2 1]"
    );
}

#[test]
fn test_array_map_promotes_to_hash_map_at_17() {
    // Seventeen distinct keys: the 17th assoc returns a hash map that
    // still iterates all entries.
    let result = eval_str(
        "(def m (reduce (fn [m i] (assoc m i i)) {} (range 17)))
         [(instance? HashMap m) (count m) (get m 16)]",
    )
    .unwrap();
    assert_eq!(result.to_readable_string(), "[true 17 16]");

    let result = eval_str(
        "(def m (reduce (fn [m i] (assoc m i i)) {} (range 16)))
         (instance? ArrayMap m)",
    )
    .unwrap();
    assert_eq!(result, JesterVal::Bool(true));
}

#[test]
fn test_map_insertion_order_preserved_small() {
    assert_eval!("{:b 1 :a 2}", "{:b 1, :a 2}");
}

#[test]
fn test_conj() {
    assert_eval!("(conj [1 2] 3)", "[1 2 3]");
    assert_eval!("(conj '(2 3) 1)", "(1 2 3)");
    assert_eval!("(conj #{1} 2 1)", "#{1 2}");
    assert_eval!("(conj {:a 1} [:b 2])", "{:a 1, :b 2}");
    assert_eval!("(conj nil 1)", "(1)");
}

#[test]
fn test_vector_ops() {
    assert_eval!("(nth [10 20 30] 2)", "30");
    assert_eval_err_contains!("(nth [10] 3)", "out of bounds");
    assert_eval!("(nth [10] 3 :missing)", ":missing");
    assert_eval!("(peek [1 2 3])", "3");
    assert_eval!("(pop [1 2 3])", "[1 2]");
    assert_eval!("(count [1 2 3])", "3");
    assert_eval!("(rseq [1 2 3])", "(3 2 1)");
}

#[test]
fn test_vector_round_trip_large() {
    // nth i == i and seq yields the integers in order, up to 10000.
    let result = eval_str(
        "(def v (vec (range 10000)))
         [(count v)
          (nth v 0)
          (nth v 9999)
          (nth v 4096)
          (reduce (fn [ok i] (and ok (= i (nth v i)))) true (range 0 10000 500))
          (= (seq v) (range 10000))]",
    )
    .unwrap();
    assert_eq!(
        result.to_readable_string(),
        "[10000 0 9999 4096 true true]"
    );
}

#[test]
fn test_sets() {
    assert_eval!("(contains? #{1 2} 1)", "true");
    assert_eval!("(contains? #{1 2} 3)", "false");
    assert_eval!("(disj #{1 2} 1)", "#{2}");
    assert_eval!("(count (set [1 1 2]))", "2");
}

#[test]
fn test_keys_vals_find() {
    assert_eval!("(keys {:a 1})", "(:a)");
    assert_eval!("(vals {:a 1})", "(1)");
    assert_eval!("(find {:a 1} :a)", "[:a 1]");
    assert_eval!("(find {:a 1} :b)", "nil");
}

#[test]
fn test_merge() {
    assert_eval!("(merge {:a 1} {:b 2} {:a 3})", "{:a 3, :b 2}");
    assert_eval!("(merge {:a 1} nil)", "{:a 1}");
}

#[test]
fn test_map_equality_ignores_order_and_kind() {
    assert_eval!("(= {:a 1 :b 2} {:b 2 :a 1})", "true");
    // An array map equals the hash map with the same entries.
    assert_eval!(
        "(= (reduce (fn [m i] (assoc m i i)) {} (range 20))
            (reduce (fn [m i] (assoc m i i)) {} (reverse (range 20))))",
        "true"
    );
}

#[test]
fn test_contains_on_vector_checks_index() {
    assert_eval!("(contains? [10 20] 1)", "true");
    assert_eval!("(contains? [10 20] 2)", "false");
}

#[test]
fn test_empty() {
    assert_eval!("(empty [1 2])", "[]");
    assert_eval!("(empty {:a 1})", "{}");
    assert_eval!("(empty? [])", "true");
    assert_eval!("(empty? [1])", "false");
}
