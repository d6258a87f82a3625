// jester-core - Loop/recur tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod common;

#[test]
fn test_basic_loop() {
    assert_eval!("(loop [x 0] (if (< x 10) (recur (+ x 1)) x))", "10");
}

#[test]
fn test_loop_accumulator() {
    assert_eval!(
        "(loop [i 0 acc 0] (if (= i 100) acc (recur (inc i) (+ acc i))))",
        "4950"
    );
}

#[test]
fn test_loop_factorial() {
    assert_eval!(
        "(loop [n 5 acc 1] (if (= n 0) acc (recur (- n 1) (* acc n))))",
        "120"
    );
}

#[test]
fn test_recur_stack_safety_one_million() {
    // A count-down of 10^6 iterations must not grow the host stack.
    assert_eval!(
        "(loop [n 1000000] (if (= n 0) :done (recur (dec n))))",
        ":done"
    );
}

#[test]
fn test_recur_in_fn_tail_position() {
    assert_eval!(
        "(defn sum-to [n acc] (if (= n 0) acc (recur (dec n) (+ acc n))))
         (sum-to 1000 0)",
        "500500"
    );
}

#[test]
fn test_recur_rebinds_loop_not_let() {
    // An inner let does not become the recur target.
    assert_eval!(
        "(loop [i 0 acc []]
           (if (= i 3)
             acc
             (let [doubled (* i 2)]
               (recur (inc i) (conj acc doubled)))))",
        "[0 2 4]"
    );
}

#[test]
fn test_recur_argument_count_checked() {
    assert_eval_err_contains!("(loop [x 1 y 2] (recur 3))", "argument count");
}

#[test]
fn test_recur_outside_loop_errors() {
    assert_eval_err_contains!("(recur 1)", "recur");
}

#[test]
fn test_recur_not_in_tail_position_errors() {
    assert_eval_err_contains!("(loop [x 1] (+ (recur 2) 1))", "tail position");
}

#[test]
fn test_recur_to_variadic_fn() {
    assert_eval!(
        "(defn count-rest [n & xs]
           (if (seq xs)
             (recur (inc n) (rest xs))
             n))
         (count-rest 0 :a :b :c)",
        "3"
    );
}
