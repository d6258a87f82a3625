// jester-core - Numeric tower tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod common;

#[test]
fn test_integer_arithmetic() {
    assert_eval!("(+ 1 2)", "3");
    assert_eval!("(+)", "0");
    assert_eval!("(*)", "1");
    assert_eval!("(- 5)", "-5");
    assert_eval!("(quot 7 2)", "3");
    assert_eval!("(rem 7 2)", "1");
    assert_eval!("(mod -7 3)", "2");
}

#[test]
fn test_integer_overflow_errors() {
    assert_eval_err_contains!("(+ 9223372036854775807 1)", "overflow");
    assert_eval_err_contains!("(* 9223372036854775807 2)", "overflow");
}

#[test]
fn test_big_integers() {
    assert_eval!("(+ 3N 4N)", "7N");
    assert_eval!("(+ 1N 2)", "3N");
    // A literal too large for 64 bits promotes on read.
    assert_eval!("99999999999999999999999", "99999999999999999999999N");
    assert_eval!("(= 5 5N)", "true");
}

#[test]
fn test_ratios() {
    assert_eval!("(/ 1 2)", "1/2");
    assert_eval!("(/ 1 3)", "1/3");
    assert_eval!("(+ 1/2 1/3)", "5/6");
    // Ratios normalise; a whole result collapses to an integer.
    assert_eval!("(+ 1/2 1/2)", "1");
    assert_eval!("(/ 4 2)", "2");
    assert_eval!("(* 2/3 3)", "2");
}

#[test]
fn test_doubles() {
    assert_eval!("(+ 1.5 2.5)", "4.0");
    assert_eval!("(/ 1.0 0.0)", "##Inf");
    assert_eval!("(* 2 1.5)", "3.0");
}

#[test]
fn test_big_floats() {
    assert_eval!("(+ 1.5M 2M)", "3.5M");
    assert_eval!("(= 0.5M 0.5)", "true");
}

#[test]
fn test_equality_respects_exactness_categories() {
    assert_eval!("(= 1 1.0)", "false");
    assert_eval!("(== 1 1.0)", "true");
    assert_eval!("(= 1/2 0.5)", "false");
    assert_eval!("(== 1/2 0.5)", "true");
}

#[test]
fn test_division_by_zero() {
    assert_eval_err_contains!("(/ 1 0)", "zero");
    assert_eval_err_contains!("(mod 5 0)", "zero");
}

#[test]
fn test_ordered_comparison_across_kinds() {
    assert_eval!("(< 1 2 3)", "true");
    assert_eval!("(< 1 3 2)", "false");
    assert_eval!("(< 1/2 1)", "true");
    assert_eval!("(<= 2 2N)", "true");
    assert_eval!("(> 2.5 2)", "true");
    assert_eval!("(compare 1 2)", "-1");
    assert_eval!("(compare 2N 2)", "0");
}

#[test]
fn test_numeric_predicates() {
    assert_eval!("(zero? 0)", "true");
    assert_eval!("(pos? 1/2)", "true");
    assert_eval!("(neg? -2N)", "true");
    assert_eval!("(even? 4)", "true");
    assert_eval!("(odd? 3)", "true");
    assert_eval!("(number? 1/2)", "true");
    assert_eval!("(ratio? 1/2)", "true");
    assert_eval!("(ratio? 2)", "false");
}

#[test]
fn test_type_error_message() {
    assert_eval_err_contains!("(+ 1 :kw)", "expected number");
    assert_eval_err_contains!("(< 1 \"a\")", "expected number");
}

#[test]
fn test_min_max() {
    assert_eval!("(max 1 3 2)", "3");
    assert_eval!("(min 1/2 2 0.25)", "0.25");
}
