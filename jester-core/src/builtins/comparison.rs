// jester-core - Comparison built-ins
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Equality and ordering.
//!
//! `=` is structural equality after realising lazy parts; `==` is numeric
//! equivalence across the exact/inexact divide; the ordered comparisons
//! require numbers; `compare` totally orders the comparable kinds.

use std::cmp::Ordering;

use jester_reader::{num, JesterVal};

use crate::builtins::{expect_arity, expect_min_arity};
use crate::error::{Error, Result};
use crate::eval::{deep_realize, make_native_fn};
use crate::namespace::Namespace;

pub(crate) fn register(ns: &Namespace) {
    ns.intern_with_value("=", make_native_fn("=", builtin_eq));
    ns.intern_with_value("not=", make_native_fn("not=", builtin_not_eq));
    ns.intern_with_value("==", make_native_fn("==", builtin_equiv));
    ns.intern_with_value("<", make_native_fn("<", |args| ordered("<", args, &[Ordering::Less])));
    ns.intern_with_value(
        "<=",
        make_native_fn("<=", |args| {
            ordered("<=", args, &[Ordering::Less, Ordering::Equal])
        }),
    );
    ns.intern_with_value(
        ">",
        make_native_fn(">", |args| ordered(">", args, &[Ordering::Greater])),
    );
    ns.intern_with_value(
        ">=",
        make_native_fn(">=", |args| {
            ordered(">=", args, &[Ordering::Greater, Ordering::Equal])
        }),
    );
    ns.intern_with_value("compare", make_native_fn("compare", builtin_compare));
}

fn builtin_eq(args: &[JesterVal]) -> Result<JesterVal> {
    expect_min_arity("=", args, 1)?;
    let head = deep_realize(&args[0])?;
    for arg in &args[1..] {
        if deep_realize(arg)? != head {
            return Ok(JesterVal::Bool(false));
        }
    }
    Ok(JesterVal::Bool(true))
}

fn builtin_not_eq(args: &[JesterVal]) -> Result<JesterVal> {
    let eq = builtin_eq(args)?;
    Ok(JesterVal::Bool(!eq.is_truthy()))
}

fn builtin_equiv(args: &[JesterVal]) -> Result<JesterVal> {
    expect_min_arity("==", args, 1)?;
    for arg in args {
        if !num::is_number(arg) {
            return Err(Error::type_error_in("==", "number", arg.type_name()));
        }
    }
    for pair in args.windows(2) {
        if !num::num_equiv(&pair[0], &pair[1]) {
            return Ok(JesterVal::Bool(false));
        }
    }
    Ok(JesterVal::Bool(true))
}

fn ordered(name: &str, args: &[JesterVal], accept: &[Ordering]) -> Result<JesterVal> {
    expect_min_arity(name, args, 1)?;
    for pair in args.windows(2) {
        if !num::is_number(&pair[0]) {
            return Err(Error::type_error_in(name, "number", pair[0].type_name()));
        }
        if !num::is_number(&pair[1]) {
            return Err(Error::type_error_in(name, "number", pair[1].type_name()));
        }
        let Some(ordering) = num::num_compare(&pair[0], &pair[1]) else {
            return Ok(JesterVal::Bool(false));
        };
        if !accept.contains(&ordering) {
            return Ok(JesterVal::Bool(false));
        }
    }
    Ok(JesterVal::Bool(true))
}

/// A total order over comparable values: -1, 0 or 1.
pub(crate) fn compare_values(a: &JesterVal, b: &JesterVal) -> Result<Ordering> {
    use JesterVal as V;
    if num::is_number(a) && num::is_number(b) {
        return num::num_compare(a, b)
            .ok_or_else(|| Error::type_error_in("compare", "comparable numbers", "NaN"));
    }
    match (a, b) {
        (V::Nil, V::Nil) => Ok(Ordering::Equal),
        (V::Nil, _) => Ok(Ordering::Less),
        (_, V::Nil) => Ok(Ordering::Greater),
        (V::Bool(x), V::Bool(y)) => Ok(x.cmp(y)),
        (V::Char(x), V::Char(y)) => Ok(x.cmp(y)),
        (V::String(x), V::String(y)) => Ok(x.cmp(y)),
        (V::Keyword(x), V::Keyword(y)) => Ok(x.cmp(y)),
        (V::Symbol(x, _), V::Symbol(y, _)) => Ok(x.cmp(y)),
        (V::Vector(x), V::Vector(y)) => {
            for (ex, ey) in x.iter().zip(y.iter()) {
                match compare_values(ex, ey)? {
                    Ordering::Equal => continue,
                    other => return Ok(other),
                }
            }
            Ok(x.count().cmp(&y.count()))
        }
        _ => Err(Error::type_error_in(
            "compare",
            "comparable values of one kind",
            a.type_name(),
        )),
    }
}

fn builtin_compare(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("compare", args, 2)?;
    let ordering = compare_values(&args[0], &args[1])?;
    Ok(JesterVal::Int(match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }))
}
