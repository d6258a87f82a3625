// jester-core - Namespace built-ins
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Namespace manipulation from source code.

use jester_reader::JesterVal;

use crate::builtins::expect_arity;
use crate::error::{Error, Result};
use crate::eval::make_native_fn;
use crate::runtime::with_runtime;

pub(crate) fn register(ns: &crate::namespace::Namespace) {
    ns.intern_with_value("in-ns", make_native_fn("in-ns", builtin_in_ns));
    ns.intern_with_value("find-ns", make_native_fn("find-ns", builtin_find_ns));
    ns.intern_with_value("ns-name", make_native_fn("ns-name", builtin_ns_name));
    ns.intern_with_value("all-ns", make_native_fn("all-ns", builtin_all_ns));
    ns.intern_with_value("the-ns", make_native_fn("the-ns", builtin_the_ns));
}

fn symbol_arg<'a>(name: &str, val: &'a JesterVal) -> Result<&'a jester_reader::Symbol> {
    match val {
        JesterVal::Symbol(sym, _) => Ok(sym),
        other => Err(Error::type_error_in(name, "symbol", other.type_name())),
    }
}

fn builtin_in_ns(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("in-ns", args, 1)?;
    let sym = symbol_arg("in-ns", &args[0])?;
    with_runtime(|rt| {
        let ns = rt.registry().set_current(sym.name());
        ns.refer_all(&rt.registry().core_ns());
        Ok(JesterVal::Namespace(ns.name()))
    })
}

fn builtin_find_ns(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("find-ns", args, 1)?;
    let sym = symbol_arg("find-ns", &args[0])?;
    with_runtime(|rt| match rt.registry().find(sym.name()) {
        Some(ns) => Ok(JesterVal::Namespace(ns.name())),
        None => Ok(JesterVal::Nil),
    })
}

fn builtin_ns_name(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("ns-name", args, 1)?;
    match &args[0] {
        JesterVal::Namespace(sym) => Ok(JesterVal::Symbol(sym.clone(), None)),
        other => Err(Error::type_error_in(
            "ns-name",
            "namespace",
            other.type_name(),
        )),
    }
}

fn builtin_all_ns(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("all-ns", args, 0)?;
    with_runtime(|rt| {
        let mut names: Vec<String> = rt
            .registry()
            .all()
            .into_iter()
            .map(|ns| ns.name().name().to_string())
            .collect();
        names.sort();
        Ok(JesterVal::list(
            names
                .into_iter()
                .map(|n| JesterVal::Namespace(jester_reader::Symbol::new(&n)))
                .collect(),
        ))
    })
}

fn builtin_the_ns(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("the-ns", args, 1)?;
    match &args[0] {
        JesterVal::Namespace(_) => Ok(args[0].clone()),
        JesterVal::Symbol(sym, _) => with_runtime(|rt| match rt.registry().find(sym.name()) {
            Some(ns) => Ok(JesterVal::Namespace(ns.name())),
            None => Err(Error::eval(format!("No namespace: {}", sym))),
        }),
        other => Err(Error::type_error_in(
            "the-ns",
            "namespace or symbol",
            other.type_name(),
        )),
    }
}
