// jester-core - Special form tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod common;

#[test]
fn test_literals_self_evaluate() {
    assert_eval!("42", "42");
    assert_eval!("nil", "nil");
    assert_eval!("true", "true");
    assert_eval!("\"hi\"", "\"hi\"");
    assert_eval!(":kw", ":kw");
    assert_eval!("1/2", "1/2");
    assert_eval!("3N", "3N");
}

#[test]
fn test_if_truthiness() {
    assert_eval!("(if true 1 2)", "1");
    assert_eval!("(if false 1 2)", "2");
    assert_eval!("(if nil 1 2)", "2");
    // Everything but nil and false is true.
    assert_eval!("(if 0 1 2)", "1");
    assert_eval!("(if \"\" 1 2)", "1");
    // Missing else branch is nil.
    assert_eval!("(if false 1)", "nil");
}

#[test]
fn test_if_evaluates_one_branch() {
    assert_eval!(
        "(def side (atom 0))
         (if true (swap! side inc) (swap! side (fn [x] (+ x 100))))
         @side",
        "1"
    );
}

#[test]
fn test_do_evaluates_in_order() {
    assert_eval!("(do 1 2 3)", "3");
    assert_eval!(
        "(def order (atom []))
         (do (swap! order conj 1) (swap! order conj 2))
         @order",
        "[1 2]"
    );
}

#[test]
fn test_let_sequential_bindings() {
    assert_eval!("(let [x 10 y (* x x)] y)", "100");
    assert_eval!("(let [x 1 x (inc x)] x)", "2");
    assert_eval!("(let [x 1] (let [y 2] (+ x y)))", "3");
}

#[test]
fn test_def_and_resolution() {
    assert_eval!("(def answer 42) answer", "42");
    // def returns the var.
    assert_eval!("(def x 1)", "#'user/x");
    // Scenario: assoc onto an empty map, then get.
    assert_eval!("(def m (assoc {} :a 1 :b 2)) (get m :b)", "2");
}

#[test]
fn test_def_with_doc_string() {
    assert_eval!(
        "(def documented \"the answer\" 42)
         (get (meta (var documented)) :doc)",
        "\"the answer\""
    );
}

#[test]
fn test_quote() {
    assert_eval!("'x", "x");
    assert_eval!("'(1 2 3)", "(1 2 3)");
    assert_eval!("(quote (a b))", "(a b)");
}

#[test]
fn test_var_quote_returns_var() {
    assert_eval!("(def v 1) #'v", "#'user/v");
    assert_eval!("(def v 2) (deref #'v)", "2");
}

#[test]
fn test_unresolved_symbol_errors() {
    assert_eval_err_contains!("no-such-symbol-here", "unable to resolve");
}

#[test]
fn test_arg_evaluation_is_left_to_right() {
    assert_eval!(
        "(def order (atom []))
         (defn observe [tag x] (swap! order conj tag) x)
         (+ (observe :a 1) (observe :b 2))
         @order",
        "[:a :b]"
    );
}

#[test]
fn test_delay_memoises() {
    assert_eval!(
        "(def side (atom 0))
         (def d (delay (swap! side inc) :done))
         [(realized? d) @d @d @side (realized? d)]",
        "[false :done :done 1 true]"
    );
}

#[test]
fn test_ns_switches_namespace() {
    assert_eval!(
        "(ns scratch.one)
         (def local-x 7)
         local-x",
        "7"
    );
}
