// jester-core - Predicate built-ins
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Type and state predicates, plus `instance?`/`type` over the reified
//! type-tag registry.

use jester_reader::{is_instance, num, JesterVal, SeqVal};

use crate::builtins::{expect_arity, expect_arity_range};
use crate::error::{Error, Result};
use crate::eval::{make_native_fn, seq};
use crate::namespace::Namespace;

pub(crate) fn register(ns: &Namespace) {
    macro_rules! predicate {
        ($name:literal, $test:expr) => {
            ns.intern_with_value(
                $name,
                make_native_fn($name, move |args: &[JesterVal]| {
                    expect_arity($name, args, 1)?;
                    let test: fn(&JesterVal) -> bool = $test;
                    Ok(JesterVal::Bool(test(&args[0])))
                }),
            );
        };
    }

    predicate!("nil?", |v| matches!(v, JesterVal::Nil));
    predicate!("some?", |v| !matches!(v, JesterVal::Nil));
    predicate!("true?", |v| matches!(v, JesterVal::Bool(true)));
    predicate!("false?", |v| matches!(v, JesterVal::Bool(false)));
    predicate!("number?", num::is_number);
    predicate!("int?", |v| matches!(
        v,
        JesterVal::Int(_) | JesterVal::BigInt(_)
    ));
    predicate!("integer?", |v| matches!(
        v,
        JesterVal::Int(_) | JesterVal::BigInt(_)
    ));
    predicate!("float?", |v| matches!(
        v,
        JesterVal::Double(_) | JesterVal::BigFloat(_)
    ));
    predicate!("double?", |v| matches!(v, JesterVal::Double(_)));
    predicate!("ratio?", |v| matches!(v, JesterVal::Ratio(_)));
    predicate!("string?", |v| matches!(v, JesterVal::String(_)));
    predicate!("char?", |v| matches!(v, JesterVal::Char(_)));
    predicate!("boolean?", |v| matches!(v, JesterVal::Bool(_)));
    predicate!("symbol?", |v| matches!(v, JesterVal::Symbol(..)));
    predicate!("keyword?", |v| matches!(v, JesterVal::Keyword(_)));
    predicate!("list?", |v| matches!(v, JesterVal::List(_)));
    predicate!("vector?", |v| matches!(v, JesterVal::Vector(_)));
    predicate!("map?", |v| matches!(
        v,
        JesterVal::ArrayMap(_) | JesterVal::HashMap(_)
    ));
    predicate!("set?", |v| matches!(v, JesterVal::Set(_)));
    predicate!("seq?", |v| matches!(
        v,
        JesterVal::List(_) | JesterVal::Seq(_)
    ));
    predicate!("coll?", |v| matches!(
        v,
        JesterVal::List(_)
            | JesterVal::Vector(_)
            | JesterVal::ArrayMap(_)
            | JesterVal::HashMap(_)
            | JesterVal::Set(_)
            | JesterVal::Seq(_)
    ));
    predicate!("sequential?", |v| matches!(
        v,
        JesterVal::List(_) | JesterVal::Vector(_) | JesterVal::Seq(_)
    ));
    predicate!("fn?", |v| matches!(
        v,
        JesterVal::Fn(_) | JesterVal::NativeFn(_)
    ));
    predicate!("ifn?", |v| matches!(
        v,
        JesterVal::Fn(_)
            | JesterVal::NativeFn(_)
            | JesterVal::Keyword(_)
            | JesterVal::Vector(_)
            | JesterVal::ArrayMap(_)
            | JesterVal::HashMap(_)
            | JesterVal::Set(_)
            | JesterVal::Var(_)
    ));
    predicate!("var?", |v| matches!(v, JesterVal::Var(_)));
    predicate!("atom?", |v| matches!(v, JesterVal::Atom(_)));
    predicate!("delay?", |v| matches!(v, JesterVal::Delay(_)));
    predicate!("zero?", |v| num::signum(v) == Some(0));
    predicate!("pos?", |v| num::signum(v) == Some(1));
    predicate!("neg?", |v| num::signum(v) == Some(-1));

    ns.intern_with_value("not", make_native_fn("not", builtin_not));
    ns.intern_with_value("boolean", make_native_fn("boolean", builtin_boolean));
    ns.intern_with_value("even?", make_native_fn("even?", builtin_even));
    ns.intern_with_value("odd?", make_native_fn("odd?", builtin_odd));
    ns.intern_with_value("empty?", make_native_fn("empty?", builtin_empty));
    ns.intern_with_value("not-empty", make_native_fn("not-empty", builtin_not_empty));
    ns.intern_with_value("contains?", make_native_fn("contains?", builtin_contains));
    ns.intern_with_value("instance?", make_native_fn("instance?", builtin_instance));
    ns.intern_with_value("type", make_native_fn("type", builtin_type));
    ns.intern_with_value("realized?", make_native_fn("realized?", builtin_realized));
}

fn builtin_not(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("not", args, 1)?;
    Ok(JesterVal::Bool(!args[0].is_truthy()))
}

fn builtin_boolean(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("boolean", args, 1)?;
    Ok(JesterVal::Bool(args[0].is_truthy()))
}

fn parity(name: &str, args: &[JesterVal], want_even: bool) -> Result<JesterVal> {
    use num_traits::Zero;
    expect_arity(name, args, 1)?;
    let even = match &args[0] {
        JesterVal::Int(i) => i % 2 == 0,
        JesterVal::BigInt(b) => ((**b).clone() % num_bigint::BigInt::from(2)).is_zero(),
        other => return Err(Error::type_error_in(name, "integer", other.type_name())),
    };
    Ok(JesterVal::Bool(even == want_even))
}

fn builtin_even(args: &[JesterVal]) -> Result<JesterVal> {
    parity("even?", args, true)
}

fn builtin_odd(args: &[JesterVal]) -> Result<JesterVal> {
    parity("odd?", args, false)
}

fn builtin_empty(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("empty?", args, 1)?;
    Ok(JesterVal::Bool(seq(&args[0])? == JesterVal::Nil))
}

fn builtin_not_empty(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("not-empty", args, 1)?;
    if seq(&args[0])? == JesterVal::Nil {
        Ok(JesterVal::Nil)
    } else {
        Ok(args[0].clone())
    }
}

fn builtin_contains(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("contains?", args, 2)?;
    let found = match &args[0] {
        JesterVal::Nil => false,
        JesterVal::ArrayMap(_) | JesterVal::HashMap(_) => {
            jester_reader::map_contains(&args[0], &args[1])
        }
        JesterVal::Set(s) => s.contains(&args[1]),
        JesterVal::Vector(v) => match &args[1] {
            JesterVal::Int(i) => *i >= 0 && (*i as usize) < v.count(),
            _ => false,
        },
        other => {
            return Err(Error::type_error_in(
                "contains?",
                "associative collection",
                other.type_name(),
            ));
        }
    };
    Ok(JesterVal::Bool(found))
}

fn builtin_instance(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("instance?", args, 2)?;
    let JesterVal::Type(tag) = &args[0] else {
        return Err(Error::type_error_in(
            "instance?",
            "type",
            args[0].type_name(),
        ));
    };
    Ok(JesterVal::Bool(is_instance(tag, &args[1])))
}

fn builtin_type(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("type", args, 1)?;
    Ok(JesterVal::Type(args[0].get_type()))
}

fn builtin_realized(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity_range("realized?", args, 1, 1)?;
    match &args[0] {
        JesterVal::Delay(d) => Ok(JesterVal::Bool(d.is_realized())),
        JesterVal::Seq(SeqVal::Lazy(l)) => Ok(JesterVal::Bool(l.is_realized())),
        other => Err(Error::type_error_in(
            "realized?",
            "delay or lazy sequence",
            other.type_name(),
        )),
    }
}
