// jester-core - Collection built-ins
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Constructors and operations over the persistent collections.

use jester_reader::{
    map_assoc, map_entry_at, map_without, ArrayMap, ArraySeq, JesterVal, List, PersistentHashMap,
    PersistentSet, PersistentVector, SeqVal, VectorRSeq, HASHMAP_THRESHOLD,
};
use std::rc::Rc;

use crate::builtins::{expect_arity, expect_arity_range, expect_min_arity};
use crate::error::{Error, Result};
use crate::eval::{lookup_in, make_native_fn, seq_count, seq_elements};
use crate::namespace::Namespace;

pub(crate) fn register(ns: &Namespace) {
    ns.intern_with_value("list", make_native_fn("list", builtin_list));
    ns.intern_with_value("vector", make_native_fn("vector", builtin_vector));
    ns.intern_with_value("vec", make_native_fn("vec", builtin_vec));
    ns.intern_with_value("hash-map", make_native_fn("hash-map", builtin_hash_map));
    ns.intern_with_value("array-map", make_native_fn("array-map", builtin_array_map));
    ns.intern_with_value("hash-set", make_native_fn("hash-set", builtin_hash_set));
    ns.intern_with_value("set", make_native_fn("set", builtin_set));
    ns.intern_with_value("conj", make_native_fn("conj", builtin_conj));
    ns.intern_with_value("assoc", make_native_fn("assoc", builtin_assoc));
    ns.intern_with_value("dissoc", make_native_fn("dissoc", builtin_dissoc));
    ns.intern_with_value("disj", make_native_fn("disj", builtin_disj));
    ns.intern_with_value("get", make_native_fn("get", builtin_get));
    ns.intern_with_value("find", make_native_fn("find", builtin_find));
    ns.intern_with_value("nth", make_native_fn("nth", builtin_nth));
    ns.intern_with_value("count", make_native_fn("count", builtin_count));
    ns.intern_with_value("peek", make_native_fn("peek", builtin_peek));
    ns.intern_with_value("pop", make_native_fn("pop", builtin_pop));
    ns.intern_with_value("keys", make_native_fn("keys", builtin_keys));
    ns.intern_with_value("vals", make_native_fn("vals", builtin_vals));
    ns.intern_with_value("merge", make_native_fn("merge", builtin_merge));
    ns.intern_with_value("empty", make_native_fn("empty", builtin_empty));
    ns.intern_with_value("rseq", make_native_fn("rseq", builtin_rseq));
}

fn builtin_list(args: &[JesterVal]) -> Result<JesterVal> {
    Ok(JesterVal::list(args.to_vec()))
}

fn builtin_vector(args: &[JesterVal]) -> Result<JesterVal> {
    Ok(JesterVal::vector(args.to_vec()))
}

fn builtin_vec(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("vec", args, 1)?;
    Ok(JesterVal::vector(seq_elements(&args[0])?))
}

fn kv_pairs(name: &str, args: &[JesterVal]) -> Result<Vec<(JesterVal, JesterVal)>> {
    if args.len() % 2 != 0 {
        return Err(Error::eval(format!(
            "{} expects an even number of forms",
            name
        )));
    }
    Ok(args
        .chunks_exact(2)
        .map(|kv| (kv[0].clone(), kv[1].clone()))
        .collect())
}

fn builtin_hash_map(args: &[JesterVal]) -> Result<JesterVal> {
    let pairs = kv_pairs("hash-map", args)?;
    Ok(JesterVal::HashMap(PersistentHashMap::from_entries(pairs)))
}

fn builtin_array_map(args: &[JesterVal]) -> Result<JesterVal> {
    if args.len() % 2 != 0 {
        return Err(Error::eval("array-map expects an even number of forms"));
    }
    if args.len() / 2 > HASHMAP_THRESHOLD {
        return builtin_hash_map(args);
    }
    Ok(JesterVal::ArrayMap(ArrayMap::from_flat(args.to_vec())))
}

fn builtin_hash_set(args: &[JesterVal]) -> Result<JesterVal> {
    Ok(JesterVal::Set(PersistentSet::from_vec(args.to_vec())))
}

fn builtin_set(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("set", args, 1)?;
    Ok(JesterVal::Set(PersistentSet::from_vec(seq_elements(
        &args[0],
    )?)))
}

fn conj_entry(map: &JesterVal, entry: &JesterVal) -> Result<JesterVal> {
    match entry {
        JesterVal::Vector(v) if v.count() == 2 => {
            let k = v.nth(0).expect("two elements").clone();
            let val = v.nth(1).expect("two elements").clone();
            map_assoc(map, k, val).ok_or_else(|| Error::Internal("map conj on a non-map".into()))
        }
        JesterVal::ArrayMap(_) | JesterVal::HashMap(_) => {
            Ok(jester_reader::map_merge(map, entry))
        }
        other => Err(Error::type_error_in(
            "conj",
            "map entry or map",
            other.type_name(),
        )),
    }
}

fn builtin_conj(args: &[JesterVal]) -> Result<JesterVal> {
    conj_all(args)
}

/// `conj` over a collection and any number of items; also backs `into`.
pub(crate) fn conj_all(args: &[JesterVal]) -> Result<JesterVal> {
    expect_min_arity("conj", args, 1)?;
    let mut coll = args[0].clone();
    for item in &args[1..] {
        coll = match &coll {
            JesterVal::Nil => JesterVal::List(List::new().cons(item.clone())),
            JesterVal::List(l) => JesterVal::List(l.cons(item.clone())),
            JesterVal::Vector(v) => JesterVal::Vector(v.conj(item.clone())),
            JesterVal::Set(s) => JesterVal::Set(s.conj(item.clone())),
            JesterVal::ArrayMap(_) | JesterVal::HashMap(_) => conj_entry(&coll, item)?,
            JesterVal::Seq(_) => {
                JesterVal::Seq(jester_reader::cons(item.clone(), coll.clone()))
            }
            other => {
                return Err(Error::type_error_in(
                    "conj",
                    "collection",
                    other.type_name(),
                ));
            }
        };
    }
    Ok(coll)
}

fn builtin_assoc(args: &[JesterVal]) -> Result<JesterVal> {
    expect_min_arity("assoc", args, 3)?;
    if args.len() % 2 != 1 {
        return Err(Error::eval("assoc expects a collection and key/value pairs"));
    }
    let mut coll = args[0].clone();
    for kv in args[1..].chunks_exact(2) {
        coll = match &coll {
            JesterVal::Nil | JesterVal::ArrayMap(_) | JesterVal::HashMap(_) => {
                map_assoc(&coll, kv[0].clone(), kv[1].clone())
                    .expect("map kinds support assoc")
            }
            JesterVal::Vector(v) => {
                let JesterVal::Int(i) = &kv[0] else {
                    return Err(Error::type_error_in("assoc", "integer index", kv[0].type_name()));
                };
                let index = usize::try_from(*i)
                    .map_err(|_| Error::index_out_of_bounds(*i, v.count()))?;
                JesterVal::Vector(
                    v.assoc_at(index, kv[1].clone())
                        .ok_or_else(|| Error::index_out_of_bounds(*i, v.count()))?,
                )
            }
            other => {
                return Err(Error::type_error_in(
                    "assoc",
                    "map or vector",
                    other.type_name(),
                ));
            }
        };
    }
    Ok(coll)
}

fn builtin_dissoc(args: &[JesterVal]) -> Result<JesterVal> {
    expect_min_arity("dissoc", args, 1)?;
    let mut coll = args[0].clone();
    for key in &args[1..] {
        coll = map_without(&coll, key).ok_or_else(|| {
            Error::type_error_in("dissoc", "map", coll.type_name())
        })?;
    }
    Ok(coll)
}

fn builtin_disj(args: &[JesterVal]) -> Result<JesterVal> {
    expect_min_arity("disj", args, 1)?;
    let JesterVal::Set(mut set) = args[0].clone() else {
        return Err(Error::type_error_in("disj", "set", args[0].type_name()));
    };
    for key in &args[1..] {
        set = set.disj(key);
    }
    Ok(JesterVal::Set(set))
}

fn builtin_get(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity_range("get", args, 2, 3)?;
    Ok(lookup_in(&args[0], &args[1])
        .unwrap_or_else(|| args.get(2).cloned().unwrap_or(JesterVal::Nil)))
}

fn builtin_find(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("find", args, 2)?;
    match map_entry_at(&args[0], &args[1]) {
        Some((k, v)) => Ok(JesterVal::vector(vec![k, v])),
        None => Ok(JesterVal::Nil),
    }
}

fn builtin_nth(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity_range("nth", args, 2, 3)?;
    let JesterVal::Int(i) = &args[1] else {
        return Err(Error::type_error_in("nth", "integer", args[1].type_name()));
    };
    let fallback = args.get(2).cloned();
    let miss = |len: usize| match &fallback {
        Some(d) => Ok(d.clone()),
        None => Err(Error::index_out_of_bounds(*i, len)),
    };
    if *i < 0 {
        return miss(0);
    }
    let index = *i as usize;
    match &args[0] {
        JesterVal::Vector(v) => match v.nth(index) {
            Some(item) => Ok(item.clone()),
            None => miss(v.count()),
        },
        JesterVal::String(s) => match s.chars().nth(index) {
            Some(c) => Ok(JesterVal::Char(c)),
            None => miss(s.chars().count()),
        },
        JesterVal::Nil => miss(0),
        coll => {
            let elements = seq_elements(coll)?;
            match elements.get(index) {
                Some(item) => Ok(item.clone()),
                None => miss(elements.len()),
            }
        }
    }
}

fn builtin_count(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("count", args, 1)?;
    Ok(JesterVal::Int(seq_count(&args[0])? as i64))
}

fn builtin_peek(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("peek", args, 1)?;
    match &args[0] {
        JesterVal::Nil => Ok(JesterVal::Nil),
        JesterVal::List(l) => Ok(l.first().cloned().unwrap_or(JesterVal::Nil)),
        JesterVal::Vector(v) => Ok(v.peek().cloned().unwrap_or(JesterVal::Nil)),
        other => Err(Error::type_error_in(
            "peek",
            "list or vector",
            other.type_name(),
        )),
    }
}

fn builtin_pop(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("pop", args, 1)?;
    match &args[0] {
        JesterVal::List(l) => {
            if l.is_empty() {
                Err(Error::eval("Can't pop an empty list"))
            } else {
                Ok(JesterVal::List(l.rest()))
            }
        }
        JesterVal::Vector(v) => v
            .pop()
            .map(JesterVal::Vector)
            .ok_or_else(|| Error::eval("Can't pop an empty vector")),
        other => Err(Error::type_error_in(
            "pop",
            "list or vector",
            other.type_name(),
        )),
    }
}

fn map_halves(name: &str, args: &[JesterVal], want_keys: bool) -> Result<JesterVal> {
    expect_arity(name, args, 1)?;
    if matches!(args[0], JesterVal::Nil) {
        return Ok(JesterVal::Nil);
    }
    let entries = jester_reader::map_entries(&args[0])
        .ok_or_else(|| Error::type_error_in(name, "map", args[0].type_name()))?;
    if entries.is_empty() {
        return Ok(JesterVal::Nil);
    }
    let items: Vec<JesterVal> = entries
        .into_iter()
        .map(|(k, v)| if want_keys { k } else { v })
        .collect();
    Ok(JesterVal::Seq(SeqVal::Array(ArraySeq::from_vec(items))))
}

fn builtin_keys(args: &[JesterVal]) -> Result<JesterVal> {
    map_halves("keys", args, true)
}

fn builtin_vals(args: &[JesterVal]) -> Result<JesterVal> {
    map_halves("vals", args, false)
}

fn builtin_merge(args: &[JesterVal]) -> Result<JesterVal> {
    if args.is_empty() {
        return Ok(JesterVal::Nil);
    }
    let mut acc = args[0].clone();
    for m in &args[1..] {
        if matches!(m, JesterVal::Nil) {
            continue;
        }
        if !matches!(m, JesterVal::ArrayMap(_) | JesterVal::HashMap(_)) {
            return Err(Error::type_error_in("merge", "map", m.type_name()));
        }
        acc = jester_reader::map_merge(&acc, m);
    }
    Ok(acc)
}

fn builtin_empty(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("empty", args, 1)?;
    Ok(match &args[0] {
        JesterVal::List(_) | JesterVal::Seq(_) => JesterVal::List(List::new()),
        JesterVal::Vector(_) => JesterVal::Vector(PersistentVector::new()),
        JesterVal::ArrayMap(_) => JesterVal::ArrayMap(ArrayMap::new()),
        JesterVal::HashMap(_) => JesterVal::HashMap(PersistentHashMap::new()),
        JesterVal::Set(_) => JesterVal::Set(PersistentSet::new()),
        _ => JesterVal::Nil,
    })
}

fn builtin_rseq(args: &[JesterVal]) -> Result<JesterVal> {
    expect_arity("rseq", args, 1)?;
    let JesterVal::Vector(v) = &args[0] else {
        return Err(Error::type_error_in(
            "rseq",
            "vector",
            args[0].type_name(),
        ));
    };
    if v.is_empty() {
        return Ok(JesterVal::Nil);
    }
    Ok(JesterVal::Seq(SeqVal::VectorR(VectorRSeq::new(Rc::new(
        v.clone(),
    )))))
}
