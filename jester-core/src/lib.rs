// jester-core - Runtime, analyzer and evaluator for Jester
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # jester-core
//!
//! The runtime half of Jester: namespaces and vars, the ambient runtime,
//! the analyzer producing the `Expr` tree, the tree-walking evaluator,
//! the built-in functions, and the embedded core library.
//!
//! # Quick start
//!
//! ```
//! use jester_core::{ensure_initialized, eval_source};
//!
//! ensure_initialized().unwrap();
//! let result = eval_source("(+ 1 2 3)", None).unwrap();
//! assert_eq!(result.to_readable_string(), "6");
//! ```

pub mod bindings;
pub mod builtins;
pub mod error;
pub mod eval;
pub mod expr;
pub mod namespace;
pub mod runtime;

use std::cell::Cell;

use jester_reader::{JesterVal, Reader};

pub use bindings::LocalEnv;
pub use builtins::register_builtins;
pub use error::{Error, Result};
pub use eval::{apply, deep_realize, eval, make_native_fn};
pub use expr::{parse, Expr, ParseContext};
pub use namespace::{Dialect, Namespace, NamespaceRegistry};
pub use runtime::{with_runtime, LintWarning, Runtime};

/// Embedded core library source (macros and helpers).
const CORE_LIB: &str = include_str!("core.jes");

thread_local! {
    static INITIALIZED: Cell<bool> = const { Cell::new(false) };
}

/// Register the built-ins and evaluate the embedded core library into
/// `jester.core`, then refer its publics into `user`. Runs once per
/// thread; later calls are no-ops.
pub fn ensure_initialized() -> Result<()> {
    if INITIALIZED.with(Cell::get) {
        return Ok(());
    }
    register_builtins();
    with_runtime(|rt| {
        rt.registry().set_current(NamespaceRegistry::CORE_NS);
    });
    let load = eval_source(CORE_LIB, Some("jester/core.jes"));
    with_runtime(|rt| {
        let user = rt.registry().set_current("user");
        user.refer_all(&rt.registry().core_ns());
    });
    load?;
    INITIALIZED.with(|init| init.set(true));
    Ok(())
}

/// Read, analyze and evaluate every form in `source`, returning the last
/// result. The reader sees the runtime's feature set and current
/// namespace.
pub fn eval_source(source: &str, filename: Option<&str>) -> Result<JesterVal> {
    let features = with_runtime(|rt| rt.features());
    let mut reader = Reader::new(source, filename)?.with_features(features);
    let mut result = JesterVal::Nil;
    loop {
        reader.set_current_ns(with_runtime(|rt| rt.current_ns().name().name().to_string()).as_str());
        let Some(form) = reader.read()? else {
            return Ok(result);
        };
        let mut ctx = ParseContext::new();
        let parsed = parse(&form, &mut ctx)?;
        result = eval(&parsed, &LocalEnv::new())?;
    }
}
