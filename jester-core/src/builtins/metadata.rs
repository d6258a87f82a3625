// jester-core - Metadata built-ins
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Metadata access and transformation. `with-meta` merges into the
//! existing map and never changes equality or hashing; `reset-meta!` and
//! `alter-meta!` mutate the slots of reference kinds (vars and atoms) in
//! place.

use jester_reader::JesterVal;

use crate::builtins::{expect_arity, expect_min_arity};
use crate::error::{Error, Result};
use crate::eval::{apply, make_native_fn};
use crate::namespace::Namespace;

pub(crate) fn register(ns: &Namespace) {
    ns.intern_with_value("meta", make_native_fn("meta", builtin_meta));
    ns.intern_with_value("with-meta", make_native_fn("with-meta", builtin_with_meta));
    ns.intern_with_value("vary-meta", make_native_fn("vary-meta", builtin_vary_meta));
    ns.intern_with_value(
        "reset-meta!",
        make_native_fn("reset-meta!", builtin_reset_meta),
    );
    ns.intern_with_value(
        "alter-meta!",
        make_native_fn("alter-meta!", builtin_alter_meta),
    );
}

fn builtin_meta(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("meta", args, 1)?;
    Ok(args[0].get_meta().unwrap_or(JesterVal::Nil))
}

fn check_meta_map(name: &str, val: &JesterVal) -> Result<()> {
    if matches!(
        val,
        JesterVal::ArrayMap(_) | JesterVal::HashMap(_) | JesterVal::Nil
    ) {
        Ok(())
    } else {
        Err(Error::type_error_in(name, "map", val.type_name()))
    }
}

fn builtin_with_meta(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("with-meta", args, 2)?;
    check_meta_map("with-meta", &args[1])?;
    if matches!(args[1], JesterVal::Nil) {
        return Ok(args[0].clone());
    }
    args[0].with_meta(args[1].clone()).ok_or_else(|| {
        Error::type_error_in(
            "with-meta",
            "value with metadata support",
            args[0].type_name(),
        )
    })
}

fn builtin_vary_meta(args: &[JesterVal]) -> Result<JesterVal> {
    expect_min_arity("vary-meta", args, 2)?;
    let current = args[0].get_meta().unwrap_or(JesterVal::Nil);
    let mut call_args = vec![current];
    call_args.extend_from_slice(&args[2..]);
    let new_meta = apply(&args[1], call_args)?;
    builtin_with_meta(&[args[0].clone(), new_meta])
}

/// Install new metadata on a reference kind, replacing the old map.
fn builtin_reset_meta(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("reset-meta!", args, 2)?;
    check_meta_map("reset-meta!", &args[1])?;
    let meta = match &args[1] {
        JesterVal::Nil => None,
        other => Some(other.clone()),
    };
    match &args[0] {
        JesterVal::Var(var) => {
            var.reset_meta(meta.clone());
        }
        JesterVal::Atom(atom) => {
            atom.reset_meta(meta.clone());
        }
        other => {
            return Err(Error::type_error_in(
                "reset-meta!",
                "var or atom",
                other.type_name(),
            ));
        }
    }
    Ok(meta.unwrap_or(JesterVal::Nil))
}

/// `(alter-meta! ref f & args)` calls `f(current-meta, args...)` and
/// installs the result.
fn builtin_alter_meta(args: &[JesterVal]) -> Result<JesterVal> {
    expect_min_arity("alter-meta!", args, 2)?;
    let current = match &args[0] {
        JesterVal::Var(var) => var.meta(),
        JesterVal::Atom(atom) => atom.meta(),
        other => {
            return Err(Error::type_error_in(
                "alter-meta!",
                "var or atom",
                other.type_name(),
            ));
        }
    };
    let mut call_args = vec![current.unwrap_or(JesterVal::Nil)];
    call_args.extend_from_slice(&args[2..]);
    let new_meta = apply(&args[1], call_args)?;
    builtin_reset_meta(&[args[0].clone(), new_meta])
}
