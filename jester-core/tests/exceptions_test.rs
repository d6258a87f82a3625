// jester-core - Exception handling tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod common;

#[test]
fn test_catch_ex_info_by_error_tag() {
    assert_eval!(
        "(try (throw (ex-info \"boom\" {:k 1})) (catch Error e (ex-data e)))",
        "{:k 1}"
    );
}

#[test]
fn test_catch_by_concrete_tag() {
    assert_eval!(
        "(try (throw (ex-info \"boom\" {:k 1})) (catch ExInfo e (ex-message e)))",
        "\"boom\""
    );
}

#[test]
fn test_eval_errors_are_catchable() {
    // Division by zero unwinds as an EvalError value.
    assert_eval!("(try (/ 1 0) (catch EvalError e :caught))", ":caught");
    assert_eval!("(try (/ 1 0) (catch Error e :caught))", ":caught");
}

#[test]
fn test_unmatched_catch_rethrows() {
    assert_eval_err_contains!(
        "(try (throw (ex-info \"boom\" {})) (catch EvalError e :nope))",
        "boom"
    );
}

#[test]
fn test_throw_arbitrary_value() {
    assert_eval!("(try (throw :just-a-keyword) (catch Keyword e e))", ":just-a-keyword");
}

#[test]
fn test_finally_runs_on_normal_exit() {
    assert_eval!(
        "(def log (atom []))
         [(try (swap! log conj :body) :ok (finally (swap! log conj :finally))) @log]",
        "[:ok [:body :finally]]"
    );
}

#[test]
fn test_finally_runs_on_caught_exit() {
    assert_eval!(
        "(def log (atom []))
         (try (throw (ex-info \"x\" {})) (catch Error e :caught) (finally (swap! log conj :fin)))
         @log",
        "[:fin]"
    );
}

#[test]
fn test_finally_runs_on_rethrow() {
    assert_eval!(
        "(def log (atom []))
         (try
           (try (throw (ex-info \"x\" {})) (finally (swap! log conj :inner)))
           (catch Error e @log))",
        "[:inner]"
    );
}

#[test]
fn test_catch_first_matching_clause() {
    assert_eval!(
        "(try (throw (ex-info \"x\" {}))
              (catch EvalError e :eval)
              (catch ExInfo e :exinfo)
              (catch Error e :error))",
        ":exinfo"
    );
}

#[test]
fn test_ex_cause_chain() {
    assert_eval!(
        "(def inner (ex-info \"inner\" {:level 1}))
         (def outer (ex-info \"outer\" {:level 2} inner))
         (ex-message (ex-cause outer))",
        "\"inner\""
    );
}

#[test]
fn test_uncaught_exception_exits_form() {
    assert_eval_err_contains!("(throw (ex-info \"unhandled\" {}))", "unhandled");
}

#[test]
fn test_catch_binding_scoped_to_clause() {
    assert_eval!(
        "(def x :outer)
         (try (throw (ex-info \"b\" {})) (catch Error x (ex-message x)))
         x",
        ":outer"
    );
}
