// jester-core - Exception built-ins
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! `ex-info` exceptions: a message, a data map and an optional cause.
//! Construction snapshots the diagnostic call stack.

use jester_reader::JesterVal;

use crate::builtins::expect_arity_range;
use crate::error::{make_ex_info, Error, Result};
use crate::eval::make_native_fn;
use crate::namespace::Namespace;

pub(crate) fn register(ns: &Namespace) {
    ns.intern_with_value("ex-info", make_native_fn("ex-info", builtin_ex_info));
    ns.intern_with_value("ex-data", make_native_fn("ex-data", builtin_ex_data));
    ns.intern_with_value("ex-message", make_native_fn("ex-message", builtin_ex_message));
    ns.intern_with_value("ex-cause", make_native_fn("ex-cause", builtin_ex_cause));
}

fn builtin_ex_info(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity_range("ex-info", args, 2, 3)?;
    let JesterVal::String(message) = &args[0] else {
        return Err(Error::type_error_in(
            "ex-info",
            "string",
            args[0].type_name(),
        ));
    };
    if !matches!(args[1], JesterVal::ArrayMap(_) | JesterVal::HashMap(_)) {
        return Err(Error::type_error_in(
            "ex-info",
            "map",
            args[1].type_name(),
        ));
    }
    Ok(make_ex_info(message, args[1].clone(), args.get(2).cloned()))
}

fn builtin_ex_data(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity_range("ex-data", args, 1, 1)?;
    match &args[0] {
        JesterVal::ExInfo(e) => Ok(e.data.clone()),
        _ => Ok(JesterVal::Nil),
    }
}

fn builtin_ex_message(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity_range("ex-message", args, 1, 1)?;
    match &args[0] {
        JesterVal::ExInfo(e) => Ok(JesterVal::string(e.message.to_string())),
        JesterVal::EvalError(e) => Ok(JesterVal::string(e.message.to_string())),
        JesterVal::ParseError(e) => Ok(JesterVal::string(e.message.to_string())),
        _ => Ok(JesterVal::Nil),
    }
}

fn builtin_ex_cause(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity_range("ex-cause", args, 1, 1)?;
    match &args[0] {
        JesterVal::ExInfo(e) => Ok(e.cause.clone().unwrap_or(JesterVal::Nil)),
        _ => Ok(JesterVal::Nil),
    }
}
