// jester-core - Arithmetic built-ins
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Arithmetic over the numeric tower. Checked 64-bit operations fail with
//! an overflow error; exact integer division yields ratios; doubles follow
//! IEEE.

use jester_reader::num;
use jester_reader::JesterVal;

use crate::builtins::{expect_arity, expect_min_arity};
use crate::error::{Error, Result};
use crate::eval::make_native_fn;
use crate::namespace::Namespace;

pub(crate) fn register(ns: &Namespace) {
    ns.intern_with_value("+", make_native_fn("+", builtin_add));
    ns.intern_with_value("-", make_native_fn("-", builtin_sub));
    ns.intern_with_value("*", make_native_fn("*", builtin_mul));
    ns.intern_with_value("/", make_native_fn("/", builtin_div));
    ns.intern_with_value("inc", make_native_fn("inc", builtin_inc));
    ns.intern_with_value("dec", make_native_fn("dec", builtin_dec));
    ns.intern_with_value("quot", make_native_fn("quot", builtin_quot));
    ns.intern_with_value("rem", make_native_fn("rem", builtin_rem));
    ns.intern_with_value("mod", make_native_fn("mod", builtin_mod));
    ns.intern_with_value("max", make_native_fn("max", builtin_max));
    ns.intern_with_value("min", make_native_fn("min", builtin_min));
}

fn check_number<'a>(name: &str, val: &'a JesterVal) -> Result<&'a JesterVal> {
    if num::is_number(val) {
        Ok(val)
    } else {
        Err(Error::type_error_in(name, "number", val.type_name()))
    }
}

fn builtin_add(args: &[JesterVal]) -> Result<JesterVal> {
    let mut acc = JesterVal::Int(0);
    for arg in args {
        acc = num::add(&acc, check_number("+", arg)?)?;
    }
    Ok(acc)
}

fn builtin_sub(args: &[JesterVal]) -> Result<JesterVal> {
    expect_min_arity("-", args, 1)?;
    check_number("-", &args[0])?;
    if args.len() == 1 {
        return Ok(num::sub(&JesterVal::Int(0), &args[0])?);
    }
    let mut acc = args[0].clone();
    for arg in &args[1..] {
        acc = num::sub(&acc, check_number("-", arg)?)?;
    }
    Ok(acc)
}

fn builtin_mul(args: &[JesterVal]) -> Result<JesterVal> {
    let mut acc = JesterVal::Int(1);
    for arg in args {
        acc = num::mul(&acc, check_number("*", arg)?)?;
    }
    Ok(acc)
}

fn builtin_div(args: &[JesterVal]) -> Result<JesterVal> {
    expect_min_arity("/", args, 1)?;
    check_number("/", &args[0])?;
    if args.len() == 1 {
        return Ok(num::div(&JesterVal::Int(1), &args[0])?);
    }
    let mut acc = args[0].clone();
    for arg in &args[1..] {
        acc = num::div(&acc, check_number("/", arg)?)?;
    }
    Ok(acc)
}

fn builtin_inc(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("inc", args, 1)?;
    Ok(num::add(check_number("inc", &args[0])?, &JesterVal::Int(1))?)
}

fn builtin_dec(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("dec", args, 1)?;
    Ok(num::sub(check_number("dec", &args[0])?, &JesterVal::Int(1))?)
}

fn builtin_quot(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("quot", args, 2)?;
    Ok(num::quot(
        check_number("quot", &args[0])?,
        check_number("quot", &args[1])?,
    )?)
}

fn builtin_rem(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("rem", args, 2)?;
    Ok(num::rem(
        check_number("rem", &args[0])?,
        check_number("rem", &args[1])?,
    )?)
}

fn builtin_mod(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("mod", args, 2)?;
    Ok(num::modulo(
        check_number("mod", &args[0])?,
        check_number("mod", &args[1])?,
    )?)
}

fn pick(args: &[JesterVal], name: &str, want_greater: bool) -> Result<JesterVal> {
    expect_min_arity(name, args, 1)?;
    let mut best = check_number(name, &args[0])?.clone();
    for arg in &args[1..] {
        let arg = check_number(name, arg)?;
        let ordering = num::num_compare(arg, &best)
            .ok_or_else(|| Error::type_error_in(name, "comparable numbers", arg.type_name()))?;
        let better = if want_greater {
            ordering == std::cmp::Ordering::Greater
        } else {
            ordering == std::cmp::Ordering::Less
        };
        if better {
            best = arg.clone();
        }
    }
    Ok(best)
}

fn builtin_max(args: &[JesterVal]) -> Result<JesterVal> {
    pick(args, "max", true)
}

fn builtin_min(args: &[JesterVal]) -> Result<JesterVal> {
    pick(args, "min", false)
}
