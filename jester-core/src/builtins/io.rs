// jester-core - Printing built-ins
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Output to standard out: `pr`/`prn` print readably, `print`/`println`
//! print plainly. Lazy arguments realise before printing.

use std::io::Write;

use jester_reader::JesterVal;

use crate::error::{Error, Result};
use crate::eval::{deep_realize, make_native_fn};
use crate::namespace::Namespace;

pub(crate) fn register(ns: &Namespace) {
    ns.intern_with_value("pr", make_native_fn("pr", |args| emit(args, true, false)));
    ns.intern_with_value("prn", make_native_fn("prn", |args| emit(args, true, true)));
    ns.intern_with_value(
        "print",
        make_native_fn("print", |args| emit(args, false, false)),
    );
    ns.intern_with_value(
        "println",
        make_native_fn("println", |args| emit(args, false, true)),
    );
    ns.intern_with_value("newline", make_native_fn("newline", builtin_newline));
}

fn emit(args: &[JesterVal], readably: bool, newline: bool) -> Result<JesterVal> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(out, " ").map_err(io_error)?;
        }
        let realized = deep_realize(arg)?;
        if readably {
            write!(out, "{}", realized.to_readable_string()).map_err(io_error)?;
        } else {
            write!(out, "{}", realized).map_err(io_error)?;
        }
    }
    if newline {
        writeln!(out).map_err(io_error)?;
    }
    out.flush().map_err(io_error)?;
    Ok(JesterVal::Nil)
}

fn builtin_newline(args: &[JesterVal]) -> Result<JesterVal> {
    crate::builtins::expect_arity("newline", args, 0)?;
    println!();
    Ok(JesterVal::Nil)
}

fn io_error(e: std::io::Error) -> Error {
    Error::eval(format!("write to stdout: {}", e))
}
