// jester-core - String and naming built-ins
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! String building and the `Named` surface: `name`, `namespace`, symbol
//! and keyword construction, `gensym`.

use std::cell::Cell;
use std::fmt::Write as _;

use jester_reader::{JesterVal, Keyword, Symbol};

use crate::builtins::{expect_arity, expect_arity_range};
use crate::error::{Error, Result};
use crate::eval::{deep_realize, make_native_fn};
use crate::namespace::Namespace;

thread_local! {
    static GENSYM_COUNTER: Cell<u64> = const { Cell::new(0) };
}

pub(crate) fn register(ns: &Namespace) {
    ns.intern_with_value("str", make_native_fn("str", builtin_str));
    ns.intern_with_value("pr-str", make_native_fn("pr-str", builtin_pr_str));
    ns.intern_with_value("name", make_native_fn("name", builtin_name));
    ns.intern_with_value("namespace", make_native_fn("namespace", builtin_namespace));
    ns.intern_with_value("symbol", make_native_fn("symbol", builtin_symbol));
    ns.intern_with_value("keyword", make_native_fn("keyword", builtin_keyword));
    ns.intern_with_value("gensym", make_native_fn("gensym", builtin_gensym));
    ns.intern_with_value("subs", make_native_fn("subs", builtin_subs));
}

fn builtin_str(args: &[JesterVal]) -> Result<JesterVal> {
    let mut out = String::new();
    for arg in args {
        if matches!(arg, JesterVal::Nil) {
            continue;
        }
        let realized = deep_realize(arg)?;
        write!(out, "{}", realized).expect("string formatting never fails");
    }
    Ok(JesterVal::string(out))
}

fn builtin_pr_str(args: &[JesterVal]) -> Result<JesterVal> {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&deep_realize(arg)?.to_readable_string());
    }
    Ok(JesterVal::string(out))
}

fn builtin_name(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("name", args, 1)?;
    match &args[0] {
        JesterVal::String(s) => Ok(JesterVal::String(s.clone())),
        JesterVal::Symbol(sym, _) => Ok(JesterVal::string(sym.name())),
        JesterVal::Keyword(kw) => Ok(JesterVal::string(kw.name())),
        other => Err(Error::type_error_in(
            "name",
            "string, symbol or keyword",
            other.type_name(),
        )),
    }
}

fn builtin_namespace(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("namespace", args, 1)?;
    let ns = match &args[0] {
        JesterVal::Symbol(sym, _) => sym.namespace().map(str::to_string),
        JesterVal::Keyword(kw) => kw.namespace().map(str::to_string),
        other => {
            return Err(Error::type_error_in(
                "namespace",
                "symbol or keyword",
                other.type_name(),
            ));
        }
    };
    Ok(ns.map_or(JesterVal::Nil, JesterVal::string))
}

fn string_arg<'a>(name: &str, val: &'a JesterVal) -> Result<&'a str> {
    match val {
        JesterVal::String(s) => Ok(s),
        other => Err(Error::type_error_in(name, "string", other.type_name())),
    }
}

fn builtin_symbol(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity_range("symbol", args, 1, 2)?;
    if args.len() == 1 {
        if let JesterVal::Symbol(..) = &args[0] {
            return Ok(args[0].clone());
        }
        return Ok(JesterVal::symbol(string_arg("symbol", &args[0])?));
    }
    let ns = string_arg("symbol", &args[0])?;
    let name = string_arg("symbol", &args[1])?;
    Ok(JesterVal::Symbol(Symbol::with_namespace(ns, name), None))
}

fn builtin_keyword(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity_range("keyword", args, 1, 2)?;
    if args.len() == 1 {
        return match &args[0] {
            JesterVal::Keyword(_) => Ok(args[0].clone()),
            JesterVal::Symbol(sym, _) => match sym.namespace() {
                Some(ns) => Ok(JesterVal::Keyword(Keyword::with_namespace(ns, sym.name()))),
                None => Ok(JesterVal::Keyword(Keyword::new(sym.name()))),
            },
            JesterVal::String(s) => Ok(JesterVal::keyword(s)),
            other => Err(Error::type_error_in(
                "keyword",
                "string, symbol or keyword",
                other.type_name(),
            )),
        };
    }
    let ns = string_arg("keyword", &args[0])?;
    let name = string_arg("keyword", &args[1])?;
    Ok(JesterVal::Keyword(Keyword::with_namespace(ns, name)))
}

fn builtin_gensym(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity_range("gensym", args, 0, 1)?;
    let prefix = match args.first() {
        Some(JesterVal::String(s)) => s.to_string(),
        Some(other) => {
            return Err(Error::type_error_in(
                "gensym",
                "string",
                other.type_name(),
            ));
        }
        None => "G__".to_string(),
    };
    let n = GENSYM_COUNTER.with(|c| {
        let n = c.get() + 1;
        c.set(n);
        n
    });
    Ok(JesterVal::Symbol(
        Symbol::new(&format!("{}{}", prefix, n)),
        None,
    ))
}

fn builtin_subs(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity_range("subs", args, 2, 3)?;
    let s = string_arg("subs", &args[0])?;
    let JesterVal::Int(start) = &args[1] else {
        return Err(Error::type_error_in("subs", "integer", args[1].type_name()));
    };
    let chars: Vec<char> = s.chars().collect();
    let end = match args.get(2) {
        Some(JesterVal::Int(end)) => *end,
        Some(other) => {
            return Err(Error::type_error_in("subs", "integer", other.type_name()));
        }
        None => chars.len() as i64,
    };
    if *start < 0 || end < *start || end as usize > chars.len() {
        return Err(Error::index_out_of_bounds(end.max(*start), chars.len()));
    }
    let out: String = chars[*start as usize..end as usize].iter().collect();
    Ok(JesterVal::string(out))
}
