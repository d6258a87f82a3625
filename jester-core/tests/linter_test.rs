// jester-core - Linter tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Parse-only analysis: warnings accumulate instead of failing, and the
//! dialect profile swaps the reader feature set.

use jester_core::{ensure_initialized, parse, with_runtime, Dialect, ParseContext};
use jester_reader::{Keyword, Reader};

/// Lint a source string, returning the warning messages in order.
fn lint(source: &str) -> Vec<String> {
    ensure_initialized().expect("runtime initialises");
    with_runtime(|rt| {
        rt.configure_linter(Dialect::Clj);
        let _ = rt.take_warnings();
    });
    let features = with_runtime(|rt| rt.features());
    let mut reader = Reader::new(source, Some("lint-test.clj"))
        .expect("reader builds")
        .with_features(features);
    while let Some(form) = reader.read().expect("reads cleanly") {
        let mut ctx = ParseContext::new();
        let _ = parse(&form, &mut ctx).expect("analyzes cleanly in linter mode");
    }
    with_runtime(|rt| rt.take_warnings())
        .into_iter()
        .map(|w| w.to_string())
        .collect()
}

#[test]
fn test_unused_let_binding_warns() {
    let warnings = lint("(let [x 1])");
    assert_eq!(warnings.len(), 1);
    assert!(
        warnings[0].contains("unused binding: x"),
        "got: {}",
        warnings[0]
    );
    assert!(warnings[0].contains("Parse warning"), "got: {}", warnings[0]);
    assert!(warnings[0].contains("lint-test.clj"), "got: {}", warnings[0]);
}

#[test]
fn test_used_binding_does_not_warn() {
    assert!(lint("(let [x 1] x)").is_empty());
}

#[test]
fn test_underscore_prefix_exempt() {
    assert!(lint("(let [_ignored 1] 2)").is_empty());
}

#[test]
fn test_unused_fn_param_warns() {
    let warnings = lint("(fn [a b] a)");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("unused binding: b"));
}

#[test]
fn test_unused_loop_binding_warns() {
    let warnings = lint("(loop [i 0 unused 1] (if (= i 3) i (recur (inc i) unused)))");
    assert!(warnings.is_empty(), "recur counts as a use: {:?}", warnings);
    let warnings = lint("(loop [i 0 stale 1] (if (= i 3) i (recur (inc i) 1)))");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("unused binding: stale"));
}

#[test]
fn test_unresolved_symbol_is_warning_not_error() {
    let warnings = lint("(no-such-fn 1)");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("unable to resolve symbol: no-such-fn"));
}

#[test]
fn test_dialect_features_select_branches() {
    ensure_initialized().expect("runtime initialises");
    with_runtime(|rt| rt.configure_linter(Dialect::Cljs));
    let features = with_runtime(|rt| rt.features());
    assert!(features.contains(&Keyword::new("cljs")));

    let mut reader = Reader::new("#?(:clj 1 :cljs 2)", None)
        .expect("reader builds")
        .with_features(features);
    let form = reader.read().expect("reads").expect("one form");
    assert_eq!(form, jester_reader::JesterVal::Int(2));
}

#[test]
fn test_warning_position_points_at_binding() {
    let warnings = lint("(let [\n  x 1])");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains(":2:"), "got: {}", warnings[0]);
}
