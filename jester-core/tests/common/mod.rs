// jester-core - Common test utilities
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared test helpers for Jester integration tests.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! `eval_str` evaluates source in this test thread's runtime (builtins and
//! the core library load on first use); `read_str` returns the printed
//! result; the `assert_eval!` macros wrap the common assertion shapes.

#[allow(unused_imports)]
pub use jester_core::{ensure_initialized, eval_source, Error};
#[allow(unused_imports)]
pub use jester_reader::{JesterVal, Keyword, Symbol};

/// Evaluate Jester source, returning the last form's value.
pub fn eval_str(source: &str) -> Result<JesterVal, String> {
    ensure_initialized().map_err(|e| e.to_string())?;
    eval_source(source, None).map_err(|e| e.to_string())
}

/// Evaluate Jester source and print the result readably.
#[allow(dead_code)]
pub fn eval_to_string(source: &str) -> Result<String, String> {
    let value = eval_str(source)?;
    let realized = jester_core::deep_realize(&value).map_err(|e| e.to_string())?;
    Ok(realized.to_readable_string())
}

/// Assert that evaluating `input` prints the expected readable form.
#[macro_export]
macro_rules! assert_eval {
    ($input:expr, $expected:expr) => {
        let result = $crate::common::eval_to_string($input);
        assert!(
            result.is_ok(),
            "Failed to evaluate '{}': {:?}",
            $input,
            result.err()
        );
        assert_eq!(
            result.unwrap(),
            $expected,
            "Evaluation of '{}' did not match expected",
            $input
        );
    };
}

/// Assert that evaluating `input` produces an error.
#[macro_export]
macro_rules! assert_eval_err {
    ($input:expr) => {
        let result = $crate::common::eval_str($input);
        assert!(
            result.is_err(),
            "Expected error for '{}' but got {:?}",
            $input,
            result.ok()
        );
    };
}

/// Assert that evaluating `input` produces an error mentioning `pattern`.
#[macro_export]
macro_rules! assert_eval_err_contains {
    ($input:expr, $pattern:expr) => {
        let result = $crate::common::eval_str($input);
        assert!(
            result.is_err(),
            "Expected error for '{}' but got {:?}",
            $input,
            result.ok()
        );
        let message = result.unwrap_err();
        assert!(
            message.to_lowercase().contains(&$pattern.to_lowercase()),
            "Error message '{}' does not contain '{}'",
            message,
            $pattern
        );
    };
}
