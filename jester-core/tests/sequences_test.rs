// jester-core - Sequence tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod common;

#[test]
fn test_first_rest_cons() {
    assert_eval!("(first '(1 2 3))", "1");
    assert_eval!("(rest '(1 2 3))", "(2 3)");
    assert_eval!("(first [])", "nil");
    assert_eval!("(rest '())", "()");
    assert_eval!("(cons 0 '(1 2))", "(0 1 2)");
    assert_eval!("(cons 0 [1 2])", "(0 1 2)");
}

#[test]
fn test_empty_list_is_terminal() {
    // The rest of the empty list is the empty list itself.
    assert_eval!("(rest (rest '(1)))", "()");
    assert_eval!("(first (rest '(1)))", "nil");
}

#[test]
fn test_seq_over_collections() {
    assert_eval!("(seq [1 2])", "(1 2)");
    assert_eval!("(seq \"ab\")", "(\\a \\b)");
    assert_eval!("(seq [])", "nil");
    assert_eval!("(seq nil)", "nil");
    assert_eval!("(seq {:a 1})", "([:a 1])");
}

#[test]
fn test_sequence_equality_across_kinds() {
    // A list equals the seq of a vector with the same elements.
    assert_eval!("(= '(1 2 3) (seq [1 2 3]))", "true");
    assert_eval!("(= '(1 2 3) [1 2 3])", "true");
    assert_eval!("(= '(1 2) '(1 2 3))", "false");
    assert_eval!("(= '(1 2 3) (range 1 4))", "true");
}

#[test]
fn test_map_is_lazy_and_correct() {
    assert_eval!("(map inc [1 2 3])", "(2 3 4)");
    assert_eval!("(map first [[1 2] [3 4]])", "(1 3)");
}

#[test]
fn test_filter_remove() {
    assert_eval!("(filter odd? (range 10))", "(1 3 5 7 9)");
    assert_eval!("(remove odd? (range 10))", "(0 2 4 6 8)");
}

#[test]
fn test_take_drop_on_infinite_range() {
    assert_eval!("(take 5 (range))", "(0 1 2 3 4)");
    assert_eval!("(take 3 (drop 2 (range)))", "(2 3 4)");
}

#[test]
fn test_range_variants() {
    assert_eval!("(range 4)", "(0 1 2 3)");
    assert_eval!("(range 2 5)", "(2 3 4)");
    assert_eval!("(range 10 0 -3)", "(10 7 4 1)");
    assert_eval!("(range 0)", "()");
}

#[test]
fn test_reduce() {
    assert_eval!("(reduce + [1 2 3 4])", "10");
    assert_eval!("(reduce + 100 [1 2 3])", "106");
    assert_eval!("(reduce + [])", "0");
    assert_eval!("(reduce conj [] '(1 2 3))", "[1 2 3]");
}

#[test]
fn test_concat() {
    assert_eval!("(concat [1] '(2) [3])", "(1 2 3)");
    assert_eval!("(concat)", "()");
}

#[test]
fn test_lazy_seq_memoises_thunk() {
    // The thunk body runs once even when traversed repeatedly.
    assert_eval!(
        "(def calls (atom 0))
         (def s (lazy-seq (swap! calls inc) (list 1 2)))
         [(first s) (first s) (count s) @calls]",
        "[1 1 2 1]"
    );
}

#[test]
fn test_lazy_seq_chained_thunks() {
    // A thunk returning another lazy seq walks to a concrete cell.
    assert_eval!("(first (lazy-seq (lazy-seq (list :deep))))", ":deep");
}

#[test]
fn test_into() {
    assert_eval!("(into [] '(1 2))", "[1 2]");
    assert_eval!("(into {} [[:a 1] [:b 2]])", "{:a 1, :b 2}");
    assert_eval!("(into #{} [1 1 2])", "#{1 2}");
}

#[test]
fn test_sort() {
    assert_eval!("(sort [3 1 2])", "(1 2 3)");
    assert_eval!("(sort (fn [a b] (> a b)) [1 3 2])", "(3 2 1)");
    assert_eval!("(sort [\"b\" \"a\"])", "(\"a\" \"b\")");
}

#[test]
fn test_reverse_last_second() {
    assert_eval!("(reverse [1 2 3])", "(3 2 1)");
    assert_eval!("(last [1 2 3])", "3");
    assert_eval!("(second [1 2 3])", "2");
}

#[test]
fn test_doall_and_dorun_force_effects() {
    assert_eval!(
        "(def n (atom 0))
         (dorun (map (fn [x] (swap! n inc)) [1 2 3]))
         @n",
        "3"
    );
}

#[test]
fn test_string_seq_and_nth() {
    assert_eval!("(nth \"abc\" 1)", "\\b");
    assert_eval!("(count \"abc\")", "3");
}

#[test]
fn test_zipmap_from_core_lib() {
    assert_eval!("(zipmap [:a :b] [1 2])", "{:a 1, :b 2}");
}
