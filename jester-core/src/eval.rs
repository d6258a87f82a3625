// jester-core - Evaluator
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The tree-walking evaluator.
//!
//! Walks an `Expr` tree against a chain of local binding frames and the
//! namespace-scoped global environment. Implements closures, variadic
//! dispatch, explicit tail recursion (`recur` produces the internal
//! recur-bindings value, which the enclosing loop or function body
//! observes and rebinds in place), exceptions with catch/finally, and the
//! memoised forcing of delays and lazy sequences.
//!
//! Every function call pushes a diagnostic stack frame and pops it on
//! every exit path, including exceptional exit.

use std::cell::Cell;
use std::rc::Rc;

use jester_reader::{
    is_instance, map_count, map_entries, map_get, seq_from_collection, ArrayMap, ArraySeq,
    JesterDelay, JesterFn, JesterVal, LazySeq, MappingSeq, NativeFn, PersistentHashMap, SeqResult,
    SeqVal,
};

use crate::bindings::LocalEnv;
use crate::error::{Error, Result};
use crate::expr::{CatchClause, Expr, FnArity, FnExpr};
use crate::runtime::{with_runtime, FrameGuard};

/// The implementation type behind every primitive callable.
pub type NativeImpl = Rc<dyn Fn(&[JesterVal]) -> Result<JesterVal>>;

/// Wrap a Rust function or closure as a callable value.
pub fn make_native_fn(
    name: &str,
    f: impl Fn(&[JesterVal]) -> Result<JesterVal> + 'static,
) -> JesterVal {
    let func: NativeImpl = Rc::new(f);
    JesterVal::NativeFn(NativeFn::new(name, Rc::new(func)))
}

// ---------------------------------------------------------------------------
// Recursion depth guard
// ---------------------------------------------------------------------------

thread_local! {
    static EVAL_DEPTH: Cell<usize> = const { Cell::new(0) };
    static MAX_EVAL_DEPTH: Cell<usize> = const { Cell::new(4000) };
}

/// The current nesting depth of function applications.
#[must_use]
pub fn get_eval_depth() -> usize {
    EVAL_DEPTH.with(Cell::get)
}

/// The depth at which evaluation fails instead of overflowing the host
/// stack.
#[must_use]
pub fn get_max_eval_depth() -> usize {
    MAX_EVAL_DEPTH.with(Cell::get)
}

/// Change the depth limit, returning the previous one.
pub fn set_max_eval_depth(limit: usize) -> usize {
    MAX_EVAL_DEPTH.with(|max| max.replace(limit))
}

struct DepthGuard;

impl DepthGuard {
    fn enter() -> Result<Self> {
        let depth = EVAL_DEPTH.with(|d| {
            let depth = d.get() + 1;
            d.set(depth);
            depth
        });
        if depth > get_max_eval_depth() {
            EVAL_DEPTH.with(|d| d.set(d.get() - 1));
            return Err(Error::eval("Evaluation depth limit exceeded"));
        }
        Ok(DepthGuard)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        EVAL_DEPTH.with(|d| d.set(d.get() - 1));
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate one expression against a local environment.
pub fn eval(expr: &Expr, env: &LocalEnv) -> Result<JesterVal> {
    match expr {
        Expr::Literal { value, .. } => Ok(value.clone()),
        Expr::VectorLit { items, .. } => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(eval(item, env)?);
            }
            Ok(JesterVal::vector(out))
        }
        Expr::MapLit { pairs, .. } => {
            // Entries evaluate in source order.
            let mut out = Vec::with_capacity(pairs.len());
            for (k, v) in pairs {
                out.push((eval(k, env)?, eval(v, env)?));
            }
            Ok(build_map(out))
        }
        Expr::SetLit { items, .. } => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(eval(item, env)?);
            }
            Ok(JesterVal::Set(jester_reader::PersistentSet::from_vec(out)))
        }
        Expr::If {
            cond,
            then,
            otherwise,
            ..
        } => {
            if eval(cond, env)?.is_truthy() {
                eval(then, env)
            } else {
                eval(otherwise, env)
            }
        }
        Expr::Do { body, .. } => eval_body(body, env),
        Expr::Let {
            names, inits, body, ..
        } => {
            let env = env.with_frame(vec![JesterVal::Nil; names.len()]);
            for (i, init) in inits.iter().enumerate() {
                let v = eval(init, &env)?;
                env.set_slot(i, v);
            }
            eval_body(body, &env)
        }
        Expr::Loop {
            names, inits, body, ..
        } => {
            let env = env.with_frame(vec![JesterVal::Nil; names.len()]);
            for (i, init) in inits.iter().enumerate() {
                let v = eval(init, &env)?;
                env.set_slot(i, v);
            }
            loop {
                match eval_body(body, &env)? {
                    JesterVal::RecurBindings(vals) => env.rebind_top((*vals).clone()),
                    other => return Ok(other),
                }
            }
        }
        Expr::Recur { args, .. } => {
            let mut vals = Vec::with_capacity(args.len());
            for arg in args {
                vals.push(eval(arg, env)?);
            }
            Ok(JesterVal::RecurBindings(Rc::new(vals)))
        }
        Expr::Fn { fn_expr, .. } => Ok(make_closure(fn_expr, env)),
        Expr::Call {
            info, target, args, ..
        } => {
            if info.is_some() {
                with_runtime(|rt| rt.set_current_info(info.clone()));
            }
            let f = eval(target, env)?;
            let mut evaled = Vec::with_capacity(args.len());
            for arg in args {
                evaled.push(eval(arg, env)?);
            }
            // Argument evaluation may have moved the position; the call
            // site wins for diagnostics.
            if info.is_some() {
                with_runtime(|rt| rt.set_current_info(info.clone()));
            }
            apply(&f, evaled)
        }
        Expr::Def {
            info,
            var,
            value,
            meta,
            is_macro,
            ..
        } => {
            if info.is_some() {
                with_runtime(|rt| rt.set_current_info(info.clone()));
            }
            if let Some(value) = value {
                let v = eval(value, env)?;
                var.set_root(v);
            }
            if *is_macro {
                var.set_macro(true);
            }
            if let Some(meta) = meta {
                var.reset_meta(Some(meta.clone()));
            }
            Ok(JesterVal::Var(var.clone()))
        }
        Expr::VarRef { info, var } => {
            var.deref().ok_or_else(|| {
                if info.is_some() {
                    with_runtime(|rt| rt.set_current_info(info.clone()));
                }
                Error::unbound_var(&var.qualified_name())
            })
        }
        Expr::VarQuote { var, .. } => Ok(JesterVal::Var(var.clone())),
        Expr::BindingRef {
            depth, index, name, ..
        } => env.lookup(*depth, *index).ok_or_else(|| {
            Error::Internal(format!("missing local binding {} ({},{})", name, depth, index))
        }),
        Expr::Throw { info, value } => {
            if info.is_some() {
                with_runtime(|rt| rt.set_current_info(info.clone()));
            }
            let v = eval(value, env)?;
            Err(Error::thrown(v))
        }
        Expr::Try {
            body,
            catches,
            finally,
            ..
        } => {
            let outcome = match eval_body(body, env) {
                Ok(v) => Ok(v),
                Err(err) => handle_catches(err, catches, env),
            };
            if let Some(finally) = finally {
                // Finally runs on every exit path; its own error wins.
                eval_body(finally, env)?;
            }
            outcome
        }
        Expr::Delay { thunk, .. } => {
            let f = make_thunk(thunk, env);
            Ok(JesterVal::Delay(JesterDelay::new(f)))
        }
        Expr::LazySeq { thunk, .. } => {
            let f = make_thunk(thunk, env);
            Ok(JesterVal::Seq(SeqVal::Lazy(LazySeq::new(f))))
        }
        Expr::Meta { meta, target, .. } => {
            let target = eval(target, env)?;
            let meta = eval(meta, env)?;
            if !matches!(meta, JesterVal::ArrayMap(_) | JesterVal::HashMap(_)) {
                return Err(Error::type_error_in("with-meta", "map", meta.type_name()));
            }
            target
                .clone()
                .with_meta(meta)
                .ok_or_else(|| Error::type_error_in("with-meta", "value with metadata support", target.type_name()))
        }
        Expr::Ns { name, .. } => {
            with_runtime(|rt| {
                let ns = rt.registry().set_current(name.name());
                ns.refer_all(&rt.registry().core_ns());
            });
            Ok(JesterVal::Nil)
        }
    }
}

/// Evaluate forms in order; the result is the last one. A recur-bindings
/// value produced in tail position flows through to the enclosing loop.
pub fn eval_body(body: &[Expr], env: &LocalEnv) -> Result<JesterVal> {
    let mut result = JesterVal::Nil;
    for expr in body {
        result = eval(expr, env)?;
    }
    Ok(result)
}

/// Build a map from evaluated entries: array map up to the threshold.
fn build_map(pairs: Vec<(JesterVal, JesterVal)>) -> JesterVal {
    if pairs.len() > jester_reader::HASHMAP_THRESHOLD {
        JesterVal::HashMap(PersistentHashMap::from_entries(pairs))
    } else {
        let mut flat = Vec::with_capacity(pairs.len() * 2);
        for (k, v) in pairs {
            flat.push(k);
            flat.push(v);
        }
        JesterVal::ArrayMap(ArrayMap::from_flat(flat))
    }
}

fn make_closure(fn_expr: &Rc<FnExpr>, env: &LocalEnv) -> JesterVal {
    let erased_expr: Rc<dyn std::any::Any> = Rc::clone(fn_expr) as Rc<dyn std::any::Any>;
    if fn_expr.name.is_some() {
        // The function sees itself through an extra frame, filled in after
        // construction.
        let self_env = env.with_frame(vec![JesterVal::Nil]);
        let f = JesterFn::new(
            fn_expr.name.clone(),
            erased_expr,
            Rc::new(self_env.clone()) as Rc<dyn std::any::Any>,
        );
        let val = JesterVal::Fn(f);
        self_env.set_slot(0, val.clone());
        val
    } else {
        JesterVal::Fn(JesterFn::new(
            None,
            erased_expr,
            Rc::new(env.clone()) as Rc<dyn std::any::Any>,
        ))
    }
}

fn make_thunk(fn_expr: &Rc<FnExpr>, env: &LocalEnv) -> JesterVal {
    JesterVal::Fn(JesterFn::new(
        None,
        Rc::clone(fn_expr) as Rc<dyn std::any::Any>,
        Rc::new(env.clone()) as Rc<dyn std::any::Any>,
    ))
}

fn handle_catches(err: Error, catches: &[CatchClause], env: &LocalEnv) -> Result<JesterVal> {
    if matches!(err, Error::Internal(_)) {
        return Err(err);
    }
    let thrown = err.to_value();
    for clause in catches {
        if is_instance(clause.tag, &thrown) {
            let env = env.with_frame(vec![thrown]);
            return eval_body(&clause.body, &env);
        }
    }
    Err(err)
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Apply a callable value to arguments.
pub fn apply(f: &JesterVal, args: Vec<JesterVal>) -> Result<JesterVal> {
    match f {
        JesterVal::Fn(func) => apply_fn(func, args),
        JesterVal::NativeFn(native) => {
            let _depth = DepthGuard::enter()?;
            let _frame = FrameGuard::push(native.name_rc(), with_runtime(|rt| rt.current_info()));
            let implementation = native
                .func()
                .downcast_ref::<NativeImpl>()
                .ok_or_else(|| {
                    Error::Internal(format!("native fn {} has a foreign payload", native.name()))
                })?
                .clone();
            implementation(&args)
        }
        JesterVal::Keyword(_) => {
            check_call_arity(f, args.len(), 1, 2)?;
            Ok(lookup_in(&args[0], f).unwrap_or_else(|| default_arg(&args)))
        }
        JesterVal::ArrayMap(_) | JesterVal::HashMap(_) => {
            check_call_arity(f, args.len(), 1, 2)?;
            Ok(lookup_in(f, &args[0]).unwrap_or_else(|| default_arg(&args)))
        }
        JesterVal::Set(s) => {
            check_call_arity(f, args.len(), 1, 2)?;
            Ok(s.get(&args[0]).unwrap_or_else(|| default_arg(&args)))
        }
        JesterVal::Vector(v) => {
            check_call_arity(f, args.len(), 1, 1)?;
            let JesterVal::Int(i) = &args[0] else {
                return Err(Error::type_error_in("vector call", "integer", args[0].type_name()));
            };
            let index = usize::try_from(*i)
                .map_err(|_| Error::index_out_of_bounds(*i, v.count()))?;
            v.nth(index)
                .cloned()
                .ok_or_else(|| Error::index_out_of_bounds(*i, v.count()))
        }
        JesterVal::Var(var) => {
            let val = var
                .deref()
                .ok_or_else(|| Error::unbound_var(&var.qualified_name()))?;
            apply(&val, args)
        }
        other => Err(Error::not_callable(other.type_name())),
    }
}

fn default_arg(args: &[JesterVal]) -> JesterVal {
    args.get(1).cloned().unwrap_or(JesterVal::Nil)
}

fn check_call_arity(f: &JesterVal, got: usize, min: usize, max: usize) -> Result<()> {
    if got < min || got > max {
        return Err(Error::arity(Some(f.type_name()), got));
    }
    Ok(())
}

/// `get` semantics over maps, sets, vectors and nil.
#[must_use]
pub fn lookup_in(coll: &JesterVal, key: &JesterVal) -> Option<JesterVal> {
    match coll {
        JesterVal::ArrayMap(_) | JesterVal::HashMap(_) => map_get(coll, key),
        JesterVal::Set(s) => s.get(key),
        JesterVal::Vector(v) => match key {
            JesterVal::Int(i) => usize::try_from(*i).ok().and_then(|i| v.nth(i).cloned()),
            _ => None,
        },
        JesterVal::String(s) => match key {
            JesterVal::Int(i) => usize::try_from(*i)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map(JesterVal::Char),
            _ => None,
        },
        _ => None,
    }
}

fn apply_fn(func: &JesterFn, args: Vec<JesterVal>) -> Result<JesterVal> {
    let fn_expr = func
        .fn_expr()
        .downcast_ref::<FnExpr>()
        .ok_or_else(|| Error::Internal("function body has a foreign payload".to_string()))?;
    let captured = func
        .env()
        .downcast_ref::<LocalEnv>()
        .ok_or_else(|| Error::Internal("function env has a foreign payload".to_string()))?;
    let name: Rc<str> = match func.name() {
        Some(sym) => Rc::from(sym.name()),
        None => Rc::from("fn"),
    };

    for arity in &fn_expr.arities {
        if arity.params.len() == args.len() {
            return eval_arity(arity, captured, args, name);
        }
    }
    if let Some(variadic) = &fn_expr.variadic {
        if args.len() >= variadic.params.len() {
            let fixed = variadic.params.len();
            let mut frame = args[..fixed].to_vec();
            let rest = if args.len() > fixed {
                JesterVal::Seq(SeqVal::Array(ArraySeq::from_vec(args[fixed..].to_vec())))
            } else {
                JesterVal::Nil
            };
            frame.push(rest);
            return eval_arity(variadic, captured, frame, name);
        }
    }
    Err(Error::arity(Some(&name), args.len()))
}

fn eval_arity(
    arity: &FnArity,
    captured: &LocalEnv,
    frame_vals: Vec<JesterVal>,
    name: Rc<str>,
) -> Result<JesterVal> {
    let _depth = DepthGuard::enter()?;
    let _frame = FrameGuard::push(name, with_runtime(|rt| rt.current_info()));
    let env = captured.with_frame(frame_vals);
    loop {
        match eval_body(&arity.body, &env)? {
            JesterVal::RecurBindings(vals) => env.rebind_top((*vals).clone()),
            other => return Ok(other),
        }
    }
}

// ---------------------------------------------------------------------------
// The sequence protocol, with forcing
// ---------------------------------------------------------------------------

/// A sequence over any seqable value; nil for an empty collection. Lazy
/// and mapping sequences force just enough to know whether they are
/// empty.
pub fn seq(val: &JesterVal) -> Result<JesterVal> {
    if let Some(s) = seq_from_collection(val) {
        return Ok(s);
    }
    match val {
        JesterVal::Seq(SeqVal::Lazy(lazy)) => match force_lazy(lazy)? {
            SeqResult::Empty => Ok(JesterVal::Nil),
            SeqResult::Cons(..) => Ok(val.clone()),
        },
        JesterVal::Seq(SeqVal::Mapping(mapping)) => {
            if seq(&mapping.source)? == JesterVal::Nil {
                Ok(JesterVal::Nil)
            } else {
                Ok(val.clone())
            }
        }
        other => Err(Error::type_error_in(
            "seq",
            "seqable collection",
            other.type_name(),
        )),
    }
}

/// The first element of a seqable value; nil when empty.
pub fn first(val: &JesterVal) -> Result<JesterVal> {
    let s = seq(val)?;
    match &s {
        JesterVal::Nil => Ok(JesterVal::Nil),
        JesterVal::List(l) => Ok(l.first().cloned().unwrap_or(JesterVal::Nil)),
        JesterVal::Seq(seq_val) => match seq_val {
            SeqVal::Array(a) => Ok(a.first().cloned().unwrap_or(JesterVal::Nil)),
            SeqVal::Node(n) => Ok(n.first().cloned().unwrap_or(JesterVal::Nil)),
            SeqVal::Vector(v) => Ok(v.first().cloned().unwrap_or(JesterVal::Nil)),
            SeqVal::VectorR(v) => Ok(v.first().cloned().unwrap_or(JesterVal::Nil)),
            SeqVal::Cons(cell) => Ok(cell.first.clone()),
            SeqVal::Lazy(lazy) => match force_lazy(lazy)? {
                SeqResult::Empty => Ok(JesterVal::Nil),
                SeqResult::Cons(f, _) => Ok(f),
            },
            SeqVal::Mapping(mapping) => {
                let head = first(&mapping.source)?;
                apply(&mapping.f, vec![head])
            }
        },
        _ => Err(Error::Internal("seq produced a non-sequence".to_string())),
    }
}

/// Everything but the first element; the empty list when exhausted.
pub fn rest(val: &JesterVal) -> Result<JesterVal> {
    let empty = JesterVal::List(jester_reader::List::new());
    let s = seq(val)?;
    match &s {
        JesterVal::Nil => Ok(empty),
        JesterVal::List(l) => Ok(JesterVal::List(l.rest())),
        JesterVal::Seq(seq_val) => match seq_val {
            SeqVal::Array(a) => Ok(a.rest_val()),
            SeqVal::Node(n) => Ok(n.rest_val()),
            SeqVal::Vector(v) => Ok(v.rest_val()),
            SeqVal::VectorR(v) => Ok(v.rest_val()),
            SeqVal::Cons(cell) => Ok(cell.rest.clone()),
            SeqVal::Lazy(lazy) => match force_lazy(lazy)? {
                SeqResult::Empty => Ok(empty),
                SeqResult::Cons(_, r) => {
                    if r == JesterVal::Nil {
                        Ok(empty)
                    } else {
                        Ok(r)
                    }
                }
            },
            SeqVal::Mapping(mapping) => {
                let source_rest = rest(&mapping.source)?;
                if seq(&source_rest)? == JesterVal::Nil {
                    Ok(empty)
                } else {
                    Ok(JesterVal::Seq(SeqVal::Mapping(Rc::new(MappingSeq {
                        f: mapping.f.clone(),
                        source: source_rest,
                    }))))
                }
            }
        },
        _ => Err(Error::Internal("seq produced a non-sequence".to_string())),
    }
}

/// `next` semantics: the rest, or nil when that is empty.
pub fn next(val: &JesterVal) -> Result<JesterVal> {
    let r = rest(val)?;
    seq(&r)
}

/// Force a lazy sequence's thunk, walking chained lazy results to a
/// concrete cell. Idempotent: the result replaces the thunk.
pub fn force_lazy(lazy: &LazySeq) -> Result<SeqResult> {
    if let Some(result) = lazy.realized_result() {
        return Ok(result);
    }
    let thunk = lazy
        .pending_thunk()
        .expect("unrealised lazy sequence holds a thunk");
    let produced = apply(&thunk, Vec::new())?;
    // The thunk may itself return lazy sequences; walk to a concrete cell.
    if let JesterVal::Seq(SeqVal::Lazy(inner)) = &produced {
        let result = force_lazy(inner)?;
        lazy.set_realized(result.clone());
        return Ok(result);
    }
    let result = match seq(&produced)? {
        JesterVal::Nil => SeqResult::Empty,
        s => SeqResult::Cons(first(&s)?, rest(&s)?),
    };
    lazy.set_realized(result.clone());
    Ok(result)
}

/// Force a delay, caching the result.
pub fn force_delay(delay: &JesterDelay) -> Result<JesterVal> {
    if let Some(cached) = delay.cached() {
        return Ok(cached);
    }
    let thunk = delay
        .pending_thunk()
        .expect("unrealised delay holds a thunk");
    let value = apply(&thunk, Vec::new())?;
    delay.set_realized(value.clone());
    Ok(value)
}

/// Count the elements of a seqable value, forcing as needed.
pub fn seq_count(val: &JesterVal) -> Result<usize> {
    match val {
        JesterVal::Nil => Ok(0),
        JesterVal::String(s) => Ok(s.chars().count()),
        JesterVal::List(l) => Ok(l.count()),
        JesterVal::Vector(v) => Ok(v.count()),
        JesterVal::Set(s) => Ok(s.count()),
        JesterVal::ArrayMap(_) | JesterVal::HashMap(_) => {
            Ok(map_count(val).expect("map kind counts"))
        }
        _ => {
            let mut n = 0usize;
            let mut cur = seq(val)?;
            while cur != JesterVal::Nil {
                n += 1;
                cur = next(&cur)?;
            }
            Ok(n)
        }
    }
}

/// Collect every element of a seqable value, forcing lazy parts.
pub fn seq_elements(val: &JesterVal) -> Result<Vec<JesterVal>> {
    let mut out = Vec::new();
    let mut cur = seq(val)?;
    while cur != JesterVal::Nil {
        out.push(first(&cur)?);
        cur = next(&cur)?;
    }
    Ok(out)
}

/// Fully realise a value for printing or structural comparison: sequences
/// materialise (recursively), collections rebuild with realised elements.
pub fn deep_realize(val: &JesterVal) -> Result<JesterVal> {
    match val {
        JesterVal::List(_) | JesterVal::Seq(_) => {
            let elements = seq_elements(val)?;
            let mut out = Vec::with_capacity(elements.len());
            for e in elements {
                out.push(deep_realize(&e)?);
            }
            Ok(JesterVal::list(out))
        }
        JesterVal::Vector(v) => {
            let mut out = Vec::with_capacity(v.count());
            for e in v.iter() {
                out.push(deep_realize(e)?);
            }
            Ok(JesterVal::vector(out))
        }
        JesterVal::ArrayMap(_) | JesterVal::HashMap(_) => {
            let entries = map_entries(val).expect("map kind has entries");
            let mut out = Vec::with_capacity(entries.len());
            for (k, v) in entries {
                out.push((deep_realize(&k)?, deep_realize(&v)?));
            }
            Ok(build_map(out))
        }
        JesterVal::Set(s) => {
            let mut out = Vec::new();
            for e in s.elements() {
                out.push(deep_realize(&e)?);
            }
            Ok(JesterVal::Set(jester_reader::PersistentSet::from_vec(out)))
        }
        other => Ok(other.clone()),
    }
}

/// Deref a var, atom or delay.
pub fn deref(val: &JesterVal) -> Result<JesterVal> {
    match val {
        JesterVal::Var(var) => var
            .deref()
            .ok_or_else(|| Error::unbound_var(&var.qualified_name())),
        JesterVal::Atom(atom) => Ok(atom.deref()),
        JesterVal::Delay(delay) => force_delay(delay),
        other => Err(Error::type_error_in(
            "deref",
            "var, atom or delay",
            other.type_name(),
        )),
    }
}
