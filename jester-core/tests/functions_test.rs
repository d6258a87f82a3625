// jester-core - Function and closure tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod common;

#[test]
fn test_basic_arithmetic_call() {
    assert_eval!("(+ 1 2)", "3");
    assert_eval!("(* 2 3 4)", "24");
    assert_eval!("(- 10 1 2)", "7");
}

#[test]
fn test_fn_call_and_closure() {
    assert_eval!("((fn [x] (* x x)) 7)", "49");
    assert_eval!(
        "(def make-adder (fn [n] (fn [x] (+ x n))))
         (def add5 (make-adder 5))
         (add5 10)",
        "15"
    );
}

#[test]
fn test_named_fn_self_recursion() {
    assert_eval!(
        "((fn f [n] (if (< n 2) n (+ (f (- n 1)) (f (- n 2))))) 10)",
        "55"
    );
}

#[test]
fn test_multi_arity_dispatch() {
    assert_eval!(
        "(def greet (fn ([] :none) ([x] x) ([x y] [x y])))
         [(greet) (greet 1) (greet 1 2)]",
        "[:none 1 [1 2]]"
    );
}

#[test]
fn test_variadic_dispatch() {
    assert_eval!(
        "(def f (fn [a & more] [a more]))
         (f 1 2 3)",
        "[1 (2 3)]"
    );
    // Exactly the fixed count: the rest binding is nil.
    assert_eval!(
        "(def f (fn [a & more] [a more]))
         (f 1)",
        "[1 nil]"
    );
}

#[test]
fn test_wrong_arity_message() {
    assert_eval_err_contains!("((fn [a b] a) 1 2 3)", "Wrong number of args");
    assert_eval_err_contains!("(inc 1 2)", "Wrong number of args");
}

#[test]
fn test_variadic_requires_fixed_prefix() {
    assert_eval_err_contains!("((fn [a b & more] a) 1)", "Wrong number of args");
}

#[test]
fn test_calling_non_callable_fails() {
    assert_eval_err_contains!("(1 2)", "Cannot call");
}

#[test]
fn test_keyword_as_callable() {
    assert_eval!("(:a {:a 1})", "1");
    assert_eval!("(:missing {:a 1} :default)", ":default");
}

#[test]
fn test_map_and_vector_as_callables() {
    assert_eval!("({:a 1} :a)", "1");
    assert_eval!("([10 20 30] 1)", "20");
    assert_eval_err_contains!("([10 20] 5)", "out of bounds");
}

#[test]
fn test_set_as_callable() {
    assert_eval!("(#{1 2} 1)", "1");
    assert_eval!("(#{1 2} 3)", "nil");
}

#[test]
fn test_var_call_delegates() {
    assert_eval!("(def my-inc inc) (#'my-inc 1)", "2");
}

#[test]
fn test_anon_fn_literal() {
    assert_eval!("(#(+ % 1) 41)", "42");
    assert_eval!("(#(+ %1 %2) 1 2)", "3");
    assert_eval!("(apply #(apply + %&) [1 2 3])", "6");
}

#[test]
fn test_apply() {
    assert_eval!("(apply + [1 2 3])", "6");
    assert_eval!("(apply + 1 2 [3 4])", "10");
}

#[test]
fn test_fn_equality_is_identity() {
    assert_eval!("(def f (fn [x] x)) (= f f)", "true");
    assert_eval!("(= (fn [x] x) (fn [x] x))", "false");
}

#[test]
fn test_duplicate_arity_rejected() {
    assert_eval_err_contains!("(fn ([x] x) ([y] y))", "duplicate arity");
}

#[test]
fn test_uncaught_error_carries_stacktrace() {
    let err = common::eval_str(
        "(defn inner [] (throw (ex-info \"boom\" {})))
         (defn outer [] (inner))
         (outer)",
    )
    .unwrap_err();
    assert!(err.contains("boom"), "got: {}", err);
    assert!(err.contains("Stacktrace"), "got: {}", err);
    assert!(err.contains("inner"), "got: {}", err);
    assert!(err.contains("outer"), "got: {}", err);
}
