// jester-core - Sequence built-ins
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The sequence protocol surface plus the lazy combinators.
//!
//! `map` produces a mapping sequence; `filter`, `take` and `range`
//! produce lazy sequences whose thunks are native closures. Forcing runs
//! through the evaluator.

use std::rc::Rc;

use jester_reader::num;
use jester_reader::{cons, ArraySeq, JesterVal, LazySeq, MappingSeq, SeqVal};

use crate::builtins::{expect_arity, expect_arity_range, expect_min_arity};
use crate::error::{Error, Result};
use crate::eval::{
    apply, deref, first, force_delay, make_native_fn, next, rest, seq, seq_elements,
};
use crate::namespace::Namespace;

pub(crate) fn register(ns: &Namespace) {
    ns.intern_with_value("seq", make_native_fn("seq", builtin_seq));
    ns.intern_with_value("first", make_native_fn("first", builtin_first));
    ns.intern_with_value("rest", make_native_fn("rest", builtin_rest));
    ns.intern_with_value("next", make_native_fn("next", builtin_next));
    ns.intern_with_value("second", make_native_fn("second", builtin_second));
    ns.intern_with_value("last", make_native_fn("last", builtin_last));
    ns.intern_with_value("cons", make_native_fn("cons", builtin_cons));
    ns.intern_with_value("concat", make_native_fn("concat", builtin_concat));
    ns.intern_with_value("apply", make_native_fn("apply", builtin_apply));
    ns.intern_with_value("map", make_native_fn("map", builtin_map));
    ns.intern_with_value("filter", make_native_fn("filter", builtin_filter));
    ns.intern_with_value("remove", make_native_fn("remove", builtin_remove));
    ns.intern_with_value("reduce", make_native_fn("reduce", builtin_reduce));
    ns.intern_with_value("range", make_native_fn("range", builtin_range));
    ns.intern_with_value("take", make_native_fn("take", builtin_take));
    ns.intern_with_value("drop", make_native_fn("drop", builtin_drop));
    ns.intern_with_value("doall", make_native_fn("doall", builtin_doall));
    ns.intern_with_value("dorun", make_native_fn("dorun", builtin_dorun));
    ns.intern_with_value("reverse", make_native_fn("reverse", builtin_reverse));
    ns.intern_with_value("into", make_native_fn("into", builtin_into));
    ns.intern_with_value("sort", make_native_fn("sort", builtin_sort));
    ns.intern_with_value("identity", make_native_fn("identity", builtin_identity));
    ns.intern_with_value("force", make_native_fn("force", builtin_force));
    ns.intern_with_value("deref", make_native_fn("deref", builtin_deref));
}

fn builtin_seq(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("seq", args, 1)?;
    seq(&args[0])
}

fn builtin_first(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("first", args, 1)?;
    first(&args[0])
}

fn builtin_rest(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("rest", args, 1)?;
    rest(&args[0])
}

fn builtin_next(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("next", args, 1)?;
    next(&args[0])
}

fn builtin_second(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("second", args, 1)?;
    first(&rest(&args[0])?)
}

fn builtin_last(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("last", args, 1)?;
    let elements = seq_elements(&args[0])?;
    Ok(elements.last().cloned().unwrap_or(JesterVal::Nil))
}

fn builtin_cons(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("cons", args, 2)?;
    let tail = seq(&args[1])?;
    Ok(JesterVal::Seq(cons(args[0].clone(), tail)))
}

fn builtin_concat(args: &[JesterVal]) -> Result<JesterVal> {
    let mut out = Vec::new();
    for coll in args {
        out.extend(seq_elements(coll)?);
    }
    if out.is_empty() {
        return Ok(JesterVal::List(jester_reader::List::new()));
    }
    Ok(JesterVal::Seq(SeqVal::Array(ArraySeq::from_vec(out))))
}

fn builtin_apply(args: &[JesterVal]) -> Result<JesterVal> {
    expect_min_arity("apply", args, 2)?;
    let f = &args[0];
    let mut call_args: Vec<JesterVal> = args[1..args.len() - 1].to_vec();
    call_args.extend(seq_elements(&args[args.len() - 1])?);
    apply(f, call_args)
}

fn builtin_map(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("map", args, 2)?;
    if seq(&args[1])? == JesterVal::Nil {
        return Ok(JesterVal::List(jester_reader::List::new()));
    }
    Ok(JesterVal::Seq(SeqVal::Mapping(Rc::new(MappingSeq {
        f: args[0].clone(),
        source: args[1].clone(),
    }))))
}

fn lazy_filter(pred: JesterVal, coll: JesterVal, invert: bool) -> JesterVal {
    let thunk = make_native_fn("filter-step", move |_args| {
        let mut cur = seq(&coll)?;
        while cur != JesterVal::Nil {
            let head = first(&cur)?;
            let tail = rest(&cur)?;
            let keep = apply(&pred, vec![head.clone()])?.is_truthy() != invert;
            if keep {
                return Ok(JesterVal::Seq(cons(
                    head,
                    lazy_filter(pred.clone(), tail, invert),
                )));
            }
            cur = seq(&tail)?;
        }
        Ok(JesterVal::Nil)
    });
    JesterVal::Seq(SeqVal::Lazy(LazySeq::new(thunk)))
}

fn builtin_filter(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("filter", args, 2)?;
    Ok(lazy_filter(args[0].clone(), args[1].clone(), false))
}

fn builtin_remove(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("remove", args, 2)?;
    Ok(lazy_filter(args[0].clone(), args[1].clone(), true))
}

fn builtin_reduce(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity_range("reduce", args, 2, 3)?;
    let f = &args[0];
    let (mut acc, coll) = if args.len() == 2 {
        let mut s = seq(&args[1])?;
        if s == JesterVal::Nil {
            // No elements and no init: the function decides with no args.
            return apply(f, Vec::new());
        }
        let head = first(&s)?;
        s = rest(&s)?;
        (head, s)
    } else {
        (args[1].clone(), args[2].clone())
    };
    let mut cur = seq(&coll)?;
    while cur != JesterVal::Nil {
        acc = apply(f, vec![acc, first(&cur)?])?;
        cur = next(&cur)?;
    }
    Ok(acc)
}

fn lazy_range(from: JesterVal, to: Option<JesterVal>, step: JesterVal) -> JesterVal {
    let thunk = make_native_fn("range-step", move |_args| {
        if let Some(to) = &to {
            let done = match num::num_compare(&from, to) {
                Some(ordering) => match num::signum(&step) {
                    Some(-1) => ordering != std::cmp::Ordering::Greater,
                    _ => ordering != std::cmp::Ordering::Less,
                },
                None => true,
            };
            if done {
                return Ok(JesterVal::Nil);
            }
        }
        let following = num::add(&from, &step)?;
        Ok(JesterVal::Seq(cons(
            from.clone(),
            lazy_range(following, to.clone(), step.clone()),
        )))
    });
    JesterVal::Seq(SeqVal::Lazy(LazySeq::new(thunk)))
}

fn builtin_range(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity_range("range", args, 0, 3)?;
    for arg in args {
        if !num::is_number(arg) {
            return Err(Error::type_error_in("range", "number", arg.type_name()));
        }
    }
    let (from, to, step) = match args {
        [] => (JesterVal::Int(0), None, JesterVal::Int(1)),
        [end] => (JesterVal::Int(0), Some(end.clone()), JesterVal::Int(1)),
        [start, end] => (start.clone(), Some(end.clone()), JesterVal::Int(1)),
        [start, end, step] => (start.clone(), Some(end.clone()), step.clone()),
        _ => unreachable!("arity checked above"),
    };
    Ok(lazy_range(from, to, step))
}

fn lazy_take(n: i64, coll: JesterVal) -> JesterVal {
    let thunk = make_native_fn("take-step", move |_args| {
        if n <= 0 {
            return Ok(JesterVal::Nil);
        }
        let s = seq(&coll)?;
        if s == JesterVal::Nil {
            return Ok(JesterVal::Nil);
        }
        let head = first(&s)?;
        let tail = rest(&s)?;
        Ok(JesterVal::Seq(cons(head, lazy_take(n - 1, tail))))
    });
    JesterVal::Seq(SeqVal::Lazy(LazySeq::new(thunk)))
}

fn builtin_take(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("take", args, 2)?;
    let JesterVal::Int(n) = &args[0] else {
        return Err(Error::type_error_in("take", "integer", args[0].type_name()));
    };
    Ok(lazy_take(*n, args[1].clone()))
}

fn builtin_drop(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("drop", args, 2)?;
    let JesterVal::Int(n) = &args[0] else {
        return Err(Error::type_error_in("drop", "integer", args[0].type_name()));
    };
    let mut cur = seq(&args[1])?;
    let mut remaining = *n;
    while remaining > 0 && cur != JesterVal::Nil {
        cur = next(&cur)?;
        remaining -= 1;
    }
    if cur == JesterVal::Nil {
        Ok(JesterVal::List(jester_reader::List::new()))
    } else {
        Ok(cur)
    }
}

fn builtin_doall(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("doall", args, 1)?;
    match &args[0] {
        // A mapping seq recomputes per access; materialise it.
        JesterVal::Seq(SeqVal::Mapping(_)) => {
            let elements = seq_elements(&args[0])?;
            if elements.is_empty() {
                Ok(JesterVal::List(jester_reader::List::new()))
            } else {
                Ok(JesterVal::Seq(SeqVal::Array(ArraySeq::from_vec(elements))))
            }
        }
        _ => {
            // Walk the chain so every memo cell realises.
            let mut cur = seq(&args[0])?;
            while cur != JesterVal::Nil {
                cur = next(&cur)?;
            }
            Ok(args[0].clone())
        }
    }
}

fn builtin_dorun(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("dorun", args, 1)?;
    let mut cur = seq(&args[0])?;
    while cur != JesterVal::Nil {
        first(&cur)?;
        cur = next(&cur)?;
    }
    Ok(JesterVal::Nil)
}

fn builtin_reverse(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("reverse", args, 1)?;
    let mut elements = seq_elements(&args[0])?;
    elements.reverse();
    Ok(JesterVal::list(elements))
}

fn builtin_into(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("into", args, 2)?;
    let elements = seq_elements(&args[1])?;
    let mut conj_args = vec![args[0].clone()];
    conj_args.extend(elements);
    super::collections::conj_all(&conj_args)
}

fn builtin_sort(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity_range("sort", args, 1, 2)?;
    let (cmp, coll) = if args.len() == 2 {
        (Some(&args[0]), &args[1])
    } else {
        (None, &args[0])
    };
    let mut elements = seq_elements(coll)?;
    let mut failure: Option<Error> = None;
    elements.sort_by(|a, b| {
        if failure.is_some() {
            return std::cmp::Ordering::Equal;
        }
        let ordering = match cmp {
            Some(f) => apply(f, vec![a.clone(), b.clone()]).and_then(|r| match r {
                JesterVal::Int(i) => Ok(i.cmp(&0)),
                JesterVal::Bool(true) => Ok(std::cmp::Ordering::Less),
                JesterVal::Bool(false) => Ok(std::cmp::Ordering::Greater),
                other => Err(Error::type_error_in(
                    "sort",
                    "comparator result",
                    other.type_name(),
                )),
            }),
            None => super::comparison::compare_values(a, b),
        };
        match ordering {
            Ok(o) => o,
            Err(e) => {
                failure = Some(e);
                std::cmp::Ordering::Equal
            }
        }
    });
    match failure {
        Some(e) => Err(e),
        None => Ok(JesterVal::list(elements)),
    }
}

fn builtin_identity(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("identity", args, 1)?;
    Ok(args[0].clone())
}

fn builtin_force(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("force", args, 1)?;
    match &args[0] {
        JesterVal::Delay(d) => force_delay(d),
        other => Ok(other.clone()),
    }
}

fn builtin_deref(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("deref", args, 1)?;
    deref(&args[0])
}
