// jester-core - Built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Primitive callables, registered as vars in the core namespace.
//!
//! Each submodule covers one concern and exposes a `register` function;
//! `register_builtins` wires them all into `jester.core` along with the
//! prompt context vars (`*1` `*2` `*3` `*e`).

pub mod arithmetic;
pub mod atoms;
pub mod collections;
pub mod comparison;
pub mod exceptions;
pub mod io;
pub mod metadata;
pub mod namespaces;
pub mod predicates;
pub mod regex;
pub mod sequences;
pub mod strings;

use jester_reader::JesterVal;

use crate::error::{Error, Result};
use crate::namespace::Namespace;
use crate::runtime::with_runtime;

/// Register every built-in into the core namespace. Idempotent.
pub fn register_builtins() {
    with_runtime(|rt| {
        let core = rt.registry().core_ns();
        arithmetic::register(&core);
        atoms::register(&core);
        collections::register(&core);
        comparison::register(&core);
        exceptions::register(&core);
        io::register(&core);
        metadata::register(&core);
        namespaces::register(&core);
        predicates::register(&core);
        regex::register(&core);
        sequences::register(&core);
        strings::register(&core);
        register_types(&core);
        register_repl_vars(&core);
    });
}

/// Every reified type tag is reachable as a var, so source code can say
/// `(instance? HashMap m)` or `(catch Error e ...)`.
fn register_types(core: &Namespace) {
    for tag in jester_reader::types::all_types() {
        core.intern_with_value(tag.name(), JesterVal::Type(tag));
    }
}

/// The prompt context vars, nil until the prompt populates them.
fn register_repl_vars(core: &Namespace) {
    for name in ["*1", "*2", "*3", "*e"] {
        let var = core.intern(name);
        if !var.is_bound() {
            var.set_root(JesterVal::Nil);
        }
    }
}

// ---------------------------------------------------------------------------
// Shared argument checks
// ---------------------------------------------------------------------------

pub(crate) fn expect_arity(name: &str, args: &[JesterVal], n: usize) -> Result<()> {
    if args.len() != n {
        return Err(Error::arity(Some(name), args.len()));
    }
    Ok(())
}

pub(crate) fn expect_min_arity(name: &str, args: &[JesterVal], min: usize) -> Result<()> {
    if args.len() < min {
        return Err(Error::arity(Some(name), args.len()));
    }
    Ok(())
}

pub(crate) fn expect_arity_range(
    name: &str,
    args: &[JesterVal],
    min: usize,
    max: usize,
) -> Result<()> {
    if args.len() < min || args.len() > max {
        return Err(Error::arity(Some(name), args.len()));
    }
    Ok(())
}
