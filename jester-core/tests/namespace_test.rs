// jester-core - Namespace tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod common;

#[test]
fn test_core_fns_visible_from_user() {
    assert_eval!("(+ 1 2)", "3");
    assert_eval!("(jester.core/+ 1 2)", "3");
}

#[test]
fn test_def_lands_in_current_namespace() {
    assert_eval!("(def here 1) #'here", "#'user/here");
}

#[test]
fn test_ns_switch_and_qualified_access() {
    assert_eval!(
        "(ns app.alpha)
         (def shared 41)
         (ns app.beta)
         (+ app.alpha/shared 1)",
        "42"
    );
}

#[test]
fn test_core_still_visible_after_ns_switch() {
    assert_eval!(
        "(ns app.gamma)
         (inc 1)",
        "2"
    );
}

#[test]
fn test_private_vars_not_referred() {
    assert_eval_err_contains!(
        "(ns app.hidden)
         (def ^:private secret 1)
         (ns app.seeker)
         secret",
        "unable to resolve"
    );
}

#[test]
fn test_shadowing_core_in_user_ns() {
    assert_eval!(
        "(ns app.shadow)
         (def inc (fn [x] (+ x 100)))
         (inc 1)",
        "101"
    );
}

#[test]
fn test_in_ns_builtin() {
    assert_eval!(
        "(in-ns 'app.via-fn)
         (def x 9)
         x",
        "9"
    );
}

#[test]
fn test_find_ns_and_ns_name() {
    assert_eval!(
        "(ns app.known)
         [(ns-name (find-ns 'app.known)) (find-ns 'app.unknown)]",
        "[app.known nil]"
    );
}

#[test]
fn test_var_rebinding_is_observable() {
    assert_eval!(
        "(def slot 1)
         (def watcher (fn [] slot))
         (def slot 2)
         (watcher)",
        "2"
    );
}

#[test]
fn test_unbound_var_deref_fails() {
    assert_eval_err_contains!("(def declared) declared", "Unbound var");
}
