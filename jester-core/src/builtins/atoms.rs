// jester-core - Atom built-ins
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Atoms: the one value kind with externally observable mutation.
//! Mutation is serialised by the single-threaded evaluator.

use jester_reader::{JesterAtom, JesterVal};

use crate::builtins::{expect_arity, expect_min_arity};
use crate::error::{Error, Result};
use crate::eval::{apply, make_native_fn};
use crate::namespace::Namespace;

pub(crate) fn register(ns: &Namespace) {
    ns.intern_with_value("atom", make_native_fn("atom", builtin_atom));
    ns.intern_with_value("reset!", make_native_fn("reset!", builtin_reset));
    ns.intern_with_value("swap!", make_native_fn("swap!", builtin_swap));
}

fn builtin_atom(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("atom", args, 1)?;
    Ok(JesterVal::Atom(JesterAtom::new(args[0].clone())))
}

fn atom_arg<'a>(name: &str, val: &'a JesterVal) -> Result<&'a JesterAtom> {
    match val {
        JesterVal::Atom(atom) => Ok(atom),
        other => Err(Error::type_error_in(name, "atom", other.type_name())),
    }
}

fn builtin_reset(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("reset!", args, 2)?;
    Ok(atom_arg("reset!", &args[0])?.reset(args[1].clone()))
}

/// `(swap! a f & args)` installs `f(current, args...)` and returns it.
fn builtin_swap(args: &[JesterVal]) -> Result<JesterVal> {
    expect_min_arity("swap!", args, 2)?;
    let atom = atom_arg("swap!", &args[0])?;
    let mut call_args = vec![atom.deref()];
    call_args.extend_from_slice(&args[2..]);
    let new_value = apply(&args[1], call_args)?;
    Ok(atom.reset(new_value))
}
