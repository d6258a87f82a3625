// jester-reader - Value kernel
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The closed value variant for Jester.
//!
//! `JesterVal` is the central enum representing every runtime value. All
//! values participate in the same four contracts: structural equality,
//! hashing consistent with equality, readable/plain printing, and a reified
//! type tag. Composite values produced by the reader additionally carry a
//! source position, and most collection kinds carry a metadata map that is
//! inert for equality and hashing.
//!
//! Reference kinds (functions, vars, atoms, delays, regexes, exceptions)
//! compare and hash by address.

use std::cell::{Cell, RefCell};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use regex::Regex;

use crate::array_map::ArrayMap;
use crate::hash_map::PersistentHashMap;
use crate::intern::{intern, InternedStr};
use crate::keyword::Keyword;
use crate::list::List;
use crate::num;
use crate::seq::{try_realized_elements, SeqVal};
use crate::set::PersistentSet;
use crate::symbol::Symbol;
use crate::types::{self, Type};
use crate::vector::PersistentVector;

// ---------------------------------------------------------------------------
// Source positions and metadata
// ---------------------------------------------------------------------------

/// A source position recorded by the reader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceInfo {
    pub file: Option<InternedStr>,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceInfo {
    /// The filename for diagnostics; `<file>` when unknown.
    #[must_use]
    pub fn filename(&self) -> &str {
        self.file.as_ref().map_or("<file>", InternedStr::as_str)
    }
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.filename(),
            self.start_line,
            self.start_column
        )
    }
}

/// Side data attached to a value: the metadata map and the source position.
/// Never participates in equality or hashing.
#[derive(Clone, Debug, Default)]
pub struct Meta {
    pub map: Option<JesterVal>,
    pub info: Option<SourceInfo>,
}

/// One diagnostic call-stack frame: the called function's name and the call
/// site. Exception values hold snapshots of these.
#[derive(Clone, Debug)]
pub struct TraceFrame {
    pub name: Rc<str>,
    pub info: Option<SourceInfo>,
}

impl fmt::Display for TraceFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.info {
            Some(info) => write!(f, "  {} ({})", self.name, info),
            None => write!(f, "  {}", self.name),
        }
    }
}

// ---------------------------------------------------------------------------
// Reference kinds
// ---------------------------------------------------------------------------

/// A compiled regular expression. Compares and hashes by identity.
#[derive(Clone, Debug)]
pub struct JesterRegex {
    regex: Rc<Regex>,
}

impl JesterRegex {
    #[must_use]
    pub fn new(regex: Regex) -> Self {
        JesterRegex {
            regex: Rc::new(regex),
        }
    }

    /// Compile a pattern; `None` on an invalid pattern.
    #[must_use]
    pub fn try_compile(pattern: &str) -> Option<Self> {
        Regex::new(pattern).ok().map(JesterRegex::new)
    }

    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    #[inline]
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    #[must_use]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.regex) as *const u8 as usize
    }
}

impl PartialEq for JesterRegex {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.regex, &other.regex)
    }
}

impl Eq for JesterRegex {}

/// A user-defined function: a closure over an analyzed function expression
/// and a captured local environment. Both are type-erased because the
/// analyzer and evaluator live a crate above this one.
#[derive(Clone)]
pub struct JesterFn {
    inner: Rc<FnInner>,
}

struct FnInner {
    name: Option<Symbol>,
    fn_expr: Rc<dyn std::any::Any>,
    env: Rc<dyn std::any::Any>,
    meta: Option<JesterVal>,
}

impl JesterFn {
    pub fn new(
        name: Option<Symbol>,
        fn_expr: Rc<dyn std::any::Any>,
        env: Rc<dyn std::any::Any>,
    ) -> Self {
        JesterFn {
            inner: Rc::new(FnInner {
                name,
                fn_expr,
                env,
                meta: None,
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&Symbol> {
        self.inner.name.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn fn_expr(&self) -> &Rc<dyn std::any::Any> {
        &self.inner.fn_expr
    }

    #[inline]
    #[must_use]
    pub fn env(&self) -> &Rc<dyn std::any::Any> {
        &self.inner.env
    }

    #[inline]
    #[must_use]
    pub fn meta(&self) -> Option<&JesterVal> {
        self.inner.meta.as_ref()
    }

    /// A function sharing this one's code and environment with different
    /// metadata. The copy has its own identity.
    #[must_use]
    pub fn with_meta(&self, meta: Option<JesterVal>) -> Self {
        JesterFn {
            inner: Rc::new(FnInner {
                name: self.inner.name.clone(),
                fn_expr: Rc::clone(&self.inner.fn_expr),
                env: Rc::clone(&self.inner.env),
                meta,
            }),
        }
    }

    #[must_use]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const u8 as usize
    }
}

impl fmt::Debug for JesterFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.name {
            Some(name) => write!(f, "#object[Fn {}]", name),
            None => write!(f, "#object[Fn]"),
        }
    }
}

impl PartialEq for JesterFn {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for JesterFn {}

/// A primitive callable not authored in source. The implementation is
/// type-erased; the evaluator downcasts it back to its function type.
#[derive(Clone)]
pub struct NativeFn {
    name: Rc<str>,
    func: Rc<dyn std::any::Any>,
}

impl NativeFn {
    pub fn new(name: impl Into<Rc<str>>, func: Rc<dyn std::any::Any>) -> Self {
        NativeFn {
            name: name.into(),
            func,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name as a shared handle, for diagnostic stack frames.
    #[inline]
    #[must_use]
    pub fn name_rc(&self) -> Rc<str> {
        Rc::clone(&self.name)
    }

    #[inline]
    #[must_use]
    pub fn func(&self) -> &Rc<dyn std::any::Any> {
        &self.func
    }

    #[must_use]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.func) as *const () as usize
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#object[Proc {}]", self.name)
    }
}

impl PartialEq for NativeFn {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for NativeFn {}

/// A named mutable binding slot owned by a namespace. Rebinding is
/// observable through every holder; equality is identity.
#[derive(Clone)]
pub struct JesterVar {
    inner: Rc<VarInner>,
}

#[derive(Debug)]
struct VarInner {
    ns: Option<InternedStr>,
    name: InternedStr,
    root: RefCell<Option<JesterVal>>,
    is_macro: Cell<bool>,
    is_private: Cell<bool>,
    meta: RefCell<Option<JesterVal>>,
}

impl JesterVar {
    /// Create an unbound var.
    pub fn new(ns: Option<&str>, name: &str) -> Self {
        JesterVar {
            inner: Rc::new(VarInner {
                ns: ns.map(intern),
                name: intern(name),
                root: RefCell::new(None),
                is_macro: Cell::new(false),
                is_private: Cell::new(false),
                meta: RefCell::new(None),
            }),
        }
    }

    /// Create a bound var.
    pub fn with_value(ns: Option<&str>, name: &str, value: JesterVal) -> Self {
        let var = JesterVar::new(ns, name);
        var.set_root(value);
        var
    }

    #[inline]
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.inner.ns.as_ref().map(InternedStr::as_str)
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.inner.name.as_str()
    }

    /// `ns/name`, or just `name` for an unqualified var.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match self.namespace() {
            Some(ns) => format!("{}/{}", ns, self.name()),
            None => self.name().to_string(),
        }
    }

    /// The current root value; `None` while unbound.
    #[must_use]
    pub fn deref(&self) -> Option<JesterVal> {
        self.inner.root.borrow().clone()
    }

    #[inline]
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.inner.root.borrow().is_some()
    }

    pub fn set_root(&self, value: JesterVal) {
        *self.inner.root.borrow_mut() = Some(value);
    }

    #[inline]
    #[must_use]
    pub fn is_macro(&self) -> bool {
        self.inner.is_macro.get()
    }

    pub fn set_macro(&self, flag: bool) {
        self.inner.is_macro.set(flag);
    }

    #[inline]
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.inner.is_private.get()
    }

    pub fn set_private(&self, flag: bool) {
        self.inner.is_private.set(flag);
    }

    #[must_use]
    pub fn meta(&self) -> Option<JesterVal> {
        self.inner.meta.borrow().clone()
    }

    /// Replace the metadata map, returning the new value.
    pub fn reset_meta(&self, meta: Option<JesterVal>) -> Option<JesterVal> {
        *self.inner.meta.borrow_mut() = meta.clone();
        meta
    }

    #[must_use]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const u8 as usize
    }
}

impl fmt::Debug for JesterVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#'{}", self.qualified_name())
    }
}

impl PartialEq for JesterVar {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for JesterVar {}

/// The one value kind with externally observable mutation of its deref
/// target. Equality is identity.
#[derive(Clone, Debug)]
pub struct JesterAtom {
    inner: Rc<AtomInner>,
}

#[derive(Debug)]
struct AtomInner {
    value: RefCell<JesterVal>,
    meta: RefCell<Option<JesterVal>>,
}

impl JesterAtom {
    #[must_use]
    pub fn new(value: JesterVal) -> Self {
        JesterAtom {
            inner: Rc::new(AtomInner {
                value: RefCell::new(value),
                meta: RefCell::new(None),
            }),
        }
    }

    #[must_use]
    pub fn deref(&self) -> JesterVal {
        self.inner.value.borrow().clone()
    }

    /// Install a new value, returning it.
    pub fn reset(&self, value: JesterVal) -> JesterVal {
        *self.inner.value.borrow_mut() = value.clone();
        value
    }

    #[must_use]
    pub fn meta(&self) -> Option<JesterVal> {
        self.inner.meta.borrow().clone()
    }

    pub fn reset_meta(&self, meta: Option<JesterVal>) -> Option<JesterVal> {
        *self.inner.meta.borrow_mut() = meta.clone();
        meta
    }

    #[must_use]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const u8 as usize
    }
}

impl PartialEq for JesterAtom {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for JesterAtom {}

/// A memoised thunk: forced at most once, then every deref observes the
/// cached result.
#[derive(Clone, Debug)]
pub struct JesterDelay {
    state: Rc<RefCell<DelayState>>,
}

#[derive(Clone, Debug)]
pub enum DelayState {
    /// Unevaluated; holds a zero-argument callable.
    Pending(JesterVal),
    /// Evaluated; holds the cached result.
    Realized(JesterVal),
}

impl JesterDelay {
    #[must_use]
    pub fn new(thunk: JesterVal) -> Self {
        JesterDelay {
            state: Rc::new(RefCell::new(DelayState::Pending(thunk))),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_realized(&self) -> bool {
        matches!(*self.state.borrow(), DelayState::Realized(_))
    }

    #[must_use]
    pub fn pending_thunk(&self) -> Option<JesterVal> {
        match &*self.state.borrow() {
            DelayState::Pending(thunk) => Some(thunk.clone()),
            DelayState::Realized(_) => None,
        }
    }

    #[must_use]
    pub fn cached(&self) -> Option<JesterVal> {
        match &*self.state.borrow() {
            DelayState::Pending(_) => None,
            DelayState::Realized(v) => Some(v.clone()),
        }
    }

    pub fn set_realized(&self, value: JesterVal) {
        *self.state.borrow_mut() = DelayState::Realized(value);
    }

    #[must_use]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.state) as *const u8 as usize
    }
}

// ---------------------------------------------------------------------------
// Exception values
// ---------------------------------------------------------------------------

/// A user-raised exception: message, data map, optional cause, and a
/// snapshot of the diagnostic call stack at raise time.
#[derive(Debug)]
pub struct ExInfo {
    pub message: Rc<str>,
    pub data: JesterVal,
    pub cause: Option<JesterVal>,
    pub info: Option<SourceInfo>,
    pub stack: Vec<TraceFrame>,
}

/// An evaluation failure reified as a value, catchable by type tag.
#[derive(Debug)]
pub struct EvalErrorVal {
    pub message: Rc<str>,
    pub info: Option<SourceInfo>,
    pub stack: Vec<TraceFrame>,
}

/// A reader failure reified as a value (for the prompt's `*e`).
#[derive(Debug)]
pub struct ParseErrorVal {
    pub message: Rc<str>,
    pub info: Option<SourceInfo>,
}

// ---------------------------------------------------------------------------
// The value enum
// ---------------------------------------------------------------------------

/// Every Jester value.
#[derive(Clone)]
pub enum JesterVal {
    /// The nil value.
    Nil,
    /// Boolean true or false.
    Bool(bool),
    /// Unicode character.
    Char(char),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point number.
    Double(f64),
    /// Arbitrary-precision integer.
    BigInt(Rc<BigInt>),
    /// Arbitrary-precision decimal float.
    BigFloat(Rc<BigDecimal>),
    /// Rational number, normalised at construction.
    Ratio(Rc<num_rational::BigRational>),
    /// Immutable string.
    String(Rc<str>),
    /// Compiled regular expression (identity equality).
    Regex(JesterRegex),
    /// Symbol, with optional metadata/position side-car.
    Symbol(Symbol, Option<Rc<Meta>>),
    /// Keyword (self-evaluating, hash precomputed).
    Keyword(Keyword),
    /// Persistent linked list.
    List(List),
    /// Persistent bit-partitioned vector.
    Vector(PersistentVector),
    /// Small map with insertion order, at most 16 entries.
    ArrayMap(ArrayMap),
    /// Hash array mapped trie map.
    HashMap(PersistentHashMap),
    /// Persistent set over a map.
    Set(PersistentSet),
    /// A concrete sequence (array, cons, lazy, mapping, node, vector walk).
    Seq(SeqVal),
    /// User-defined function (closure).
    Fn(JesterFn),
    /// Primitive callable.
    NativeFn(NativeFn),
    /// Named mutable binding slot.
    Var(JesterVar),
    /// A namespace, denoted by its name.
    Namespace(Symbol),
    /// Reified type tag.
    Type(&'static Type),
    /// Mutable cell.
    Atom(JesterAtom),
    /// Memoised thunk.
    Delay(JesterDelay),
    /// User-raised exception value.
    ExInfo(Rc<ExInfo>),
    /// Evaluation failure as a value.
    EvalError(Rc<EvalErrorVal>),
    /// Reader failure as a value.
    ParseError(Rc<ParseErrorVal>),
    /// Internal: rebinding values travelling from `recur` to its target.
    RecurBindings(Rc<Vec<JesterVal>>),
}

impl JesterVal {
    pub fn int(i: i64) -> Self {
        JesterVal::Int(i)
    }

    pub fn float(f: f64) -> Self {
        JesterVal::Double(f)
    }

    pub fn bool(b: bool) -> Self {
        JesterVal::Bool(b)
    }

    pub fn char(c: char) -> Self {
        JesterVal::Char(c)
    }

    pub fn string(s: impl Into<Rc<str>>) -> Self {
        JesterVal::String(s.into())
    }

    pub fn bigint(b: BigInt) -> Self {
        JesterVal::BigInt(Rc::new(b))
    }

    pub fn bigfloat(b: BigDecimal) -> Self {
        JesterVal::BigFloat(Rc::new(b))
    }

    /// A normalised ratio: `ratio(4, 2)` is the integer 2.
    ///
    /// # Panics
    ///
    /// Panics on a zero denominator; reader and arithmetic paths go through
    /// [`num::make_ratio`] instead.
    pub fn ratio(numer: i64, denom: i64) -> Self {
        num::make_ratio(BigInt::from(numer), BigInt::from(denom))
            .expect("ratio constructor needs a non-zero denominator")
    }

    /// Parse a symbol value from `name` or `ns/name`.
    pub fn symbol(s: &str) -> Self {
        JesterVal::Symbol(Symbol::parse(s), None)
    }

    /// Parse a keyword value from `name` or `ns/name` (no leading colon).
    pub fn keyword(s: &str) -> Self {
        JesterVal::Keyword(Keyword::parse(s))
    }

    pub fn list(items: Vec<JesterVal>) -> Self {
        JesterVal::List(List::from_vec(items))
    }

    pub fn vector(items: Vec<JesterVal>) -> Self {
        JesterVal::Vector(PersistentVector::from_vec(items))
    }

    /// Compile a regex literal; `None` on an invalid pattern.
    pub fn try_regex(pattern: &str) -> Option<Self> {
        JesterRegex::try_compile(pattern).map(JesterVal::Regex)
    }

    /// Logical truth: everything but `nil` and `false`.
    #[inline]
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, JesterVal::Nil | JesterVal::Bool(false))
    }

    /// The reified type tag from the global registry.
    #[must_use]
    pub fn get_type(&self) -> &'static Type {
        types::type_of(self)
    }

    /// The registered type name, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.get_type().name()
    }

    // -- metadata and source info -------------------------------------------

    /// The metadata map, if this kind carries one.
    #[must_use]
    pub fn get_meta(&self) -> Option<JesterVal> {
        match self {
            JesterVal::Symbol(_, extra) => extra.as_ref().and_then(|e| e.map.clone()),
            JesterVal::List(l) => l.meta().and_then(|e| e.map.clone()),
            JesterVal::Vector(v) => v.meta().and_then(|e| e.map.clone()),
            JesterVal::ArrayMap(m) => m.meta().and_then(|e| e.map.clone()),
            JesterVal::HashMap(m) => m.meta().and_then(|e| e.map.clone()),
            JesterVal::Set(s) => s.meta().and_then(|e| e.map.clone()),
            JesterVal::Fn(f) => f.meta().cloned(),
            JesterVal::Var(v) => v.meta(),
            JesterVal::Atom(a) => a.meta(),
            _ => None,
        }
    }

    /// A new value sharing this one's content, with the given map merged
    /// into the existing metadata. `None` when the kind carries no
    /// metadata.
    #[must_use]
    pub fn with_meta(&self, meta: JesterVal) -> Option<JesterVal> {
        match self {
            JesterVal::Symbol(sym, extra) => Some(JesterVal::Symbol(
                sym.clone(),
                merged_meta_slot(extra.as_ref(), meta),
            )),
            JesterVal::List(l) => Some(JesterVal::List(
                l.with_meta_slot(merged_meta_slot(l.meta(), meta)),
            )),
            JesterVal::Vector(v) => Some(JesterVal::Vector(
                v.with_meta_slot(merged_meta_slot(v.meta(), meta)),
            )),
            JesterVal::ArrayMap(m) => Some(JesterVal::ArrayMap(
                m.with_meta_slot(merged_meta_slot(m.meta(), meta)),
            )),
            JesterVal::HashMap(m) => Some(JesterVal::HashMap(
                m.with_meta_slot(merged_meta_slot(m.meta(), meta)),
            )),
            JesterVal::Set(s) => Some(JesterVal::Set(
                s.with_meta_slot(merged_meta_slot(s.meta(), meta)),
            )),
            JesterVal::Fn(f) => {
                let merged = match f.meta() {
                    Some(existing) => map_merge(existing, &meta),
                    None => meta,
                };
                Some(JesterVal::Fn(f.with_meta(Some(merged))))
            }
            _ => None,
        }
    }

    /// The source position recorded by the reader, if any.
    #[must_use]
    pub fn get_info(&self) -> Option<SourceInfo> {
        match self {
            JesterVal::Symbol(_, extra) => extra.as_ref().and_then(|e| e.info.clone()),
            JesterVal::List(l) => l.meta().and_then(|e| e.info.clone()),
            JesterVal::Vector(v) => v.meta().and_then(|e| e.info.clone()),
            JesterVal::ArrayMap(m) => m.meta().and_then(|e| e.info.clone()),
            JesterVal::HashMap(m) => m.meta().and_then(|e| e.info.clone()),
            JesterVal::Set(s) => s.meta().and_then(|e| e.info.clone()),
            JesterVal::ExInfo(e) => e.info.clone(),
            JesterVal::EvalError(e) => e.info.clone(),
            JesterVal::ParseError(e) => e.info.clone(),
            _ => None,
        }
    }

    /// Attach a source position (reader-side). Values that carry no
    /// side-car come back unchanged.
    #[must_use]
    pub fn with_info(self, info: SourceInfo) -> JesterVal {
        fn updated(old: Option<&Rc<Meta>>, info: SourceInfo) -> Option<Rc<Meta>> {
            Some(Rc::new(Meta {
                map: old.and_then(|m| m.map.clone()),
                info: Some(info),
            }))
        }
        match self {
            JesterVal::Symbol(sym, extra) => {
                let slot = updated(extra.as_ref(), info);
                JesterVal::Symbol(sym, slot)
            }
            JesterVal::List(l) => {
                let slot = updated(l.meta(), info);
                JesterVal::List(l.with_meta_slot(slot))
            }
            JesterVal::Vector(v) => {
                let slot = updated(v.meta(), info);
                JesterVal::Vector(v.with_meta_slot(slot))
            }
            JesterVal::ArrayMap(m) => {
                let slot = updated(m.meta(), info);
                JesterVal::ArrayMap(m.with_meta_slot(slot))
            }
            JesterVal::HashMap(m) => {
                let slot = updated(m.meta(), info);
                JesterVal::HashMap(m.with_meta_slot(slot))
            }
            JesterVal::Set(s) => {
                let slot = updated(s.meta(), info);
                JesterVal::Set(s.with_meta_slot(slot))
            }
            other => other,
        }
    }

    /// The escaped, re-readable printed form.
    #[must_use]
    pub fn to_readable_string(&self) -> String {
        let mut out = String::new();
        write_value(&mut out, self, true).expect("string formatting never fails");
        out
    }
}

fn merged_meta_slot(old: Option<&Rc<Meta>>, meta: JesterVal) -> Option<Rc<Meta>> {
    let merged = match old.and_then(|m| m.map.as_ref()) {
        Some(existing) => map_merge(existing, &meta),
        None => meta,
    };
    Some(Rc::new(Meta {
        map: Some(merged),
        info: old.and_then(|m| m.info.clone()),
    }))
}

// ---------------------------------------------------------------------------
// Generic map operations
// ---------------------------------------------------------------------------

/// Key lookup over either map kind.
#[must_use]
pub fn map_get(map: &JesterVal, key: &JesterVal) -> Option<JesterVal> {
    match map {
        JesterVal::ArrayMap(m) => m.get(key).cloned(),
        JesterVal::HashMap(m) => m.get(key).cloned(),
        _ => None,
    }
}

/// Associate over either map kind (array maps may promote). Assoc onto nil
/// starts a fresh array map.
#[must_use]
pub fn map_assoc(map: &JesterVal, key: JesterVal, val: JesterVal) -> Option<JesterVal> {
    match map {
        JesterVal::Nil => Some(ArrayMap::new().assoc(key, val)),
        JesterVal::ArrayMap(m) => Some(m.assoc(key, val)),
        JesterVal::HashMap(m) => Some(JesterVal::HashMap(m.assoc(key, val))),
        _ => None,
    }
}

/// Remove a key over either map kind.
#[must_use]
pub fn map_without(map: &JesterVal, key: &JesterVal) -> Option<JesterVal> {
    match map {
        JesterVal::Nil => Some(JesterVal::Nil),
        JesterVal::ArrayMap(m) => Some(JesterVal::ArrayMap(m.without(key))),
        JesterVal::HashMap(m) => Some(JesterVal::HashMap(m.without(key))),
        _ => None,
    }
}

#[must_use]
pub fn map_contains(map: &JesterVal, key: &JesterVal) -> bool {
    match map {
        JesterVal::ArrayMap(m) => m.contains_key(key),
        JesterVal::HashMap(m) => m.contains_key(key),
        _ => false,
    }
}

#[must_use]
pub fn map_count(map: &JesterVal) -> Option<usize> {
    match map {
        JesterVal::ArrayMap(m) => Some(m.count()),
        JesterVal::HashMap(m) => Some(m.count()),
        _ => None,
    }
}

/// All entries of either map kind, in traversal order.
#[must_use]
pub fn map_entries(map: &JesterVal) -> Option<Vec<(JesterVal, JesterVal)>> {
    match map {
        JesterVal::ArrayMap(m) => Some(m.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        JesterVal::HashMap(m) => Some(m.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        _ => None,
    }
}

/// The `[key value]` entry for a key, over either map kind.
#[must_use]
pub fn map_entry_at(map: &JesterVal, key: &JesterVal) -> Option<(JesterVal, JesterVal)> {
    match map {
        JesterVal::ArrayMap(m) => m.entry_at(key),
        JesterVal::HashMap(m) => m.entry_at(key),
        _ => None,
    }
}

/// Merge the entries of `b` into `a`. Nil merges as the empty map.
#[must_use]
pub fn map_merge(a: &JesterVal, b: &JesterVal) -> JesterVal {
    let mut out = match a {
        JesterVal::ArrayMap(_) | JesterVal::HashMap(_) => a.clone(),
        _ => JesterVal::ArrayMap(ArrayMap::new()),
    };
    if let Some(entries) = map_entries(b) {
        for (k, v) in entries {
            if let Some(next) = map_assoc(&out, k, v) {
                out = next;
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Equality
// ---------------------------------------------------------------------------

fn is_map_kind(val: &JesterVal) -> bool {
    matches!(val, JesterVal::ArrayMap(_) | JesterVal::HashMap(_))
}

fn is_sequential_kind(val: &JesterVal) -> bool {
    matches!(
        val,
        JesterVal::List(_) | JesterVal::Vector(_) | JesterVal::Seq(_)
    )
}

fn map_equals(a: &JesterVal, b: &JesterVal) -> bool {
    let (Some(ca), Some(cb)) = (map_count(a), map_count(b)) else {
        return false;
    };
    if ca != cb {
        return false;
    }
    let Some(entries) = map_entries(a) else {
        return false;
    };
    entries
        .iter()
        .all(|(k, v)| map_get(b, k).map_or(false, |bv| bv == *v))
}

fn set_equals(a: &PersistentSet, b: &PersistentSet) -> bool {
    a.count() == b.count() && a.elements().iter().all(|e| b.contains(e))
}

/// Element-wise comparison of sequential values; pending lazy parts fall
/// back to identity of the memo cell.
fn seq_equals(a: &JesterVal, b: &JesterVal) -> bool {
    match (try_realized_elements(a), try_realized_elements(b)) {
        (Some(xs), Some(ys)) => xs == ys,
        _ => seq_identity(a, b),
    }
}

fn seq_identity(a: &JesterVal, b: &JesterVal) -> bool {
    match (a, b) {
        (JesterVal::Seq(SeqVal::Lazy(x)), JesterVal::Seq(SeqVal::Lazy(y))) => x.addr() == y.addr(),
        (JesterVal::Seq(SeqVal::Mapping(x)), JesterVal::Seq(SeqVal::Mapping(y))) => {
            Rc::ptr_eq(x, y)
        }
        _ => false,
    }
}

impl PartialEq for JesterVal {
    fn eq(&self, other: &Self) -> bool {
        use JesterVal as V;
        if num::is_number(self) && num::is_number(other) {
            return num::num_eq(self, other);
        }
        match (self, other) {
            (V::Nil, V::Nil) => true,
            (V::Bool(a), V::Bool(b)) => a == b,
            (V::Char(a), V::Char(b)) => a == b,
            (V::String(a), V::String(b)) => a == b,
            (V::Regex(a), V::Regex(b)) => a == b,
            (V::Symbol(a, _), V::Symbol(b, _)) => a == b,
            (V::Keyword(a), V::Keyword(b)) => a == b,
            (V::Type(a), V::Type(b)) => std::ptr::eq(*a, *b),
            (V::Namespace(a), V::Namespace(b)) => a == b,
            (V::Var(a), V::Var(b)) => a == b,
            (V::Atom(a), V::Atom(b)) => a == b,
            (V::Delay(a), V::Delay(b)) => a.addr() == b.addr(),
            (V::Fn(a), V::Fn(b)) => a == b,
            (V::NativeFn(a), V::NativeFn(b)) => a == b,
            (V::ExInfo(a), V::ExInfo(b)) => Rc::ptr_eq(a, b),
            (V::EvalError(a), V::EvalError(b)) => Rc::ptr_eq(a, b),
            (V::ParseError(a), V::ParseError(b)) => Rc::ptr_eq(a, b),
            (V::RecurBindings(_), _) | (_, V::RecurBindings(_)) => false,
            (V::Set(a), V::Set(b)) => set_equals(a, b),
            (a, b) if is_map_kind(a) && is_map_kind(b) => map_equals(a, b),
            (a, b) if is_sequential_kind(a) && is_sequential_kind(b) => seq_equals(a, b),
            _ => false,
        }
    }
}

impl Eq for JesterVal {}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Sum per-entry hashes commutatively so equal unordered collections hash
/// equal regardless of traversal order.
fn hash_unordered<H: Hasher, I: IntoIterator<Item = u64>>(items: I, count: usize, state: &mut H) {
    let mut sum: u64 = 0;
    for h in items {
        sum = sum.wrapping_add(h);
    }
    state.write_usize(count);
    state.write_u64(sum);
}

fn hash_of(val: &JesterVal) -> u64 {
    let mut h = DefaultHasher::new();
    val.hash(&mut h);
    h.finish()
}

/// The 32-bit hash used by the hash-map trie.
#[must_use]
pub fn hash32(val: &JesterVal) -> u32 {
    hash_of(val) as u32
}

impl Hash for JesterVal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use JesterVal as V;
        match self {
            V::Int(_) | V::Double(_) | V::BigInt(_) | V::BigFloat(_) | V::Ratio(_) => {
                num::hash_number(self, state);
            }
            V::Nil => state.write_u8(0x00),
            V::Bool(b) => {
                state.write_u8(0x01);
                state.write_u8(u8::from(*b));
            }
            V::Char(c) => {
                state.write_u8(0x02);
                state.write_u32(*c as u32);
            }
            V::String(s) => {
                state.write_u8(0x03);
                state.write(s.as_bytes());
            }
            V::Regex(r) => {
                state.write_u8(0x04);
                state.write_usize(r.addr());
            }
            V::Symbol(sym, _) => {
                state.write_u8(0x05);
                sym.hash(state);
            }
            V::Keyword(k) => {
                state.write_u8(0x06);
                k.hash(state);
            }
            // Ordered fold shared by every sequential kind, so a list, a
            // vector and a seq of the same elements hash identically.
            V::List(_) | V::Vector(_) | V::Seq(_) => {
                state.write_u8(0x07);
                match try_realized_elements(self) {
                    Some(elements) => {
                        state.write_usize(elements.len());
                        for e in &elements {
                            e.hash(state);
                        }
                    }
                    None => {
                        // Pending lazy or mapping seq: identity.
                        match self {
                            V::Seq(SeqVal::Lazy(l)) => state.write_usize(l.addr()),
                            V::Seq(SeqVal::Mapping(m)) => {
                                state.write_usize(Rc::as_ptr(m) as *const u8 as usize);
                            }
                            _ => state.write_u8(0xff),
                        }
                    }
                }
            }
            V::ArrayMap(_) | V::HashMap(_) => {
                state.write_u8(0x08);
                let entries = map_entries(self).unwrap_or_default();
                let count = entries.len();
                hash_unordered(
                    entries.into_iter().map(|(k, v)| {
                        let mut h = DefaultHasher::new();
                        k.hash(&mut h);
                        v.hash(&mut h);
                        h.finish()
                    }),
                    count,
                    state,
                );
            }
            V::Set(s) => {
                state.write_u8(0x09);
                let elements = s.elements();
                let count = elements.len();
                hash_unordered(elements.iter().map(hash_of), count, state);
            }
            V::Fn(f) => {
                state.write_u8(0x0a);
                state.write_usize(f.addr());
            }
            V::NativeFn(f) => {
                state.write_u8(0x0b);
                state.write_usize(f.addr());
            }
            V::Var(v) => {
                state.write_u8(0x0c);
                state.write_usize(v.addr());
            }
            V::Namespace(sym) => {
                state.write_u8(0x0d);
                sym.hash(state);
            }
            V::Type(t) => {
                state.write_u8(0x0e);
                state.write_usize(*t as *const Type as usize);
            }
            V::Atom(a) => {
                state.write_u8(0x0f);
                state.write_usize(a.addr());
            }
            V::Delay(d) => {
                state.write_u8(0x10);
                state.write_usize(d.addr());
            }
            V::ExInfo(e) => {
                state.write_u8(0x20);
                state.write_usize(Rc::as_ptr(e) as usize);
            }
            V::EvalError(e) => {
                state.write_u8(0x21);
                state.write_usize(Rc::as_ptr(e) as usize);
            }
            V::ParseError(e) => {
                state.write_u8(0x22);
                state.write_usize(Rc::as_ptr(e) as usize);
            }
            V::RecurBindings(_) => state.write_u8(0x23),
        }
    }
}

// ---------------------------------------------------------------------------
// Printing
// ---------------------------------------------------------------------------

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn escape_char(c: char) -> String {
    match c {
        '\n' => "\\newline".to_string(),
        ' ' => "\\space".to_string(),
        '\t' => "\\tab".to_string(),
        '\r' => "\\return".to_string(),
        '\u{8}' => "\\backspace".to_string(),
        '\u{c}' => "\\formfeed".to_string(),
        other => format!("\\{}", other),
    }
}

fn write_double<W: fmt::Write>(w: &mut W, d: f64) -> fmt::Result {
    if d.is_nan() {
        write!(w, "##NaN")
    } else if d.is_infinite() {
        write!(w, "{}", if d > 0.0 { "##Inf" } else { "##-Inf" })
    } else if d == d.trunc() && d.abs() < 1e17 {
        write!(w, "{:.1}", d)
    } else {
        write!(w, "{}", d)
    }
}

fn write_elements<W: fmt::Write>(
    w: &mut W,
    items: &[JesterVal],
    readably: bool,
    sep: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            w.write_str(sep)?;
        }
        write_value(w, item, readably)?;
    }
    Ok(())
}

/// Print a value. With `readably` true the output is deterministic and
/// re-readable (strings quoted, characters escaped, regexes wrapped).
pub fn write_value<W: fmt::Write>(w: &mut W, val: &JesterVal, readably: bool) -> fmt::Result {
    use JesterVal as V;
    match val {
        V::Nil => write!(w, "nil"),
        V::Bool(b) => write!(w, "{}", b),
        V::Char(c) => {
            if readably {
                write!(w, "{}", escape_char(*c))
            } else {
                write!(w, "{}", c)
            }
        }
        V::Int(i) => write!(w, "{}", i),
        V::Double(d) => write_double(w, *d),
        V::BigInt(b) => write!(w, "{}N", b),
        V::BigFloat(b) => write!(w, "{}M", b),
        V::Ratio(r) => write!(w, "{}/{}", r.numer(), r.denom()),
        V::String(s) => {
            if readably {
                write!(w, "{}", escape_string(s))
            } else {
                write!(w, "{}", s)
            }
        }
        V::Regex(r) => {
            if readably {
                write!(w, "#\"{}\"", r.pattern())
            } else {
                write!(w, "{}", r.pattern())
            }
        }
        V::Symbol(sym, _) => write!(w, "{}", sym),
        V::Keyword(k) => write!(w, "{}", k),
        V::List(l) => {
            w.write_char('(')?;
            let items: Vec<JesterVal> = l.iter().cloned().collect();
            write_elements(w, &items, readably, " ")?;
            w.write_char(')')
        }
        V::Seq(seq) => match try_realized_elements(val) {
            Some(items) => {
                w.write_char('(')?;
                write_elements(w, &items, readably, " ")?;
                w.write_char(')')
            }
            None => match seq {
                SeqVal::Mapping(_) => write!(w, "#object[MappingSeq]"),
                _ => write!(w, "#object[LazySeq]"),
            },
        },
        V::Vector(v) => {
            w.write_char('[')?;
            let items: Vec<JesterVal> = v.iter().cloned().collect();
            write_elements(w, &items, readably, " ")?;
            w.write_char(']')
        }
        V::ArrayMap(_) | V::HashMap(_) => {
            w.write_char('{')?;
            let entries = map_entries(val).unwrap_or_default();
            for (i, (k, v)) in entries.iter().enumerate() {
                if i > 0 {
                    w.write_str(", ")?;
                }
                write_value(w, k, readably)?;
                w.write_char(' ')?;
                write_value(w, v, readably)?;
            }
            w.write_char('}')
        }
        V::Set(s) => {
            w.write_str("#{")?;
            write_elements(w, &s.elements(), readably, " ")?;
            w.write_char('}')
        }
        V::Fn(f) => match f.name() {
            Some(name) => write!(w, "#object[Fn {}]", name),
            None => write!(w, "#object[Fn]"),
        },
        V::NativeFn(_) => write!(w, "#object[Proc]"),
        V::Var(v) => write!(w, "#'{}", v.qualified_name()),
        V::Namespace(sym) => write!(w, "{}", sym),
        V::Type(t) => write!(w, "{}", t.name()),
        V::Atom(a) => {
            w.write_str("#object[Atom {:val ")?;
            write_value(w, &a.deref(), readably)?;
            w.write_str("}]")
        }
        V::Delay(_) => write!(w, "#object[Delay]"),
        V::ExInfo(e) => match &e.info {
            Some(info) => write!(w, "{}: Exception: {}", info, e.message),
            None => write!(w, "Exception: {}", e.message),
        },
        V::EvalError(e) => match &e.info {
            Some(info) => write!(w, "{}: Eval error: {}", info, e.message),
            None => write!(w, "Eval error: {}", e.message),
        },
        V::ParseError(e) => match &e.info {
            Some(info) => write!(w, "{}: Parse error: {}", info, e.message),
            None => write!(w, "Parse error: {}", e.message),
        },
        V::RecurBindings(_) => write!(w, "#object[RecurBindings]"),
    }
}

impl fmt::Display for JesterVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, false)
    }
}

impl fmt::Debug for JesterVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> JesterVal {
        JesterVal::int(i)
    }

    fn hash_val(v: &JesterVal) -> u64 {
        hash_of(v)
    }

    #[test]
    fn test_equality_reflexive_across_kinds() {
        let samples = vec![
            JesterVal::Nil,
            JesterVal::Bool(true),
            JesterVal::Char('x'),
            int(42),
            JesterVal::float(1.5),
            JesterVal::string("abc"),
            JesterVal::keyword("k"),
            JesterVal::symbol("s"),
            JesterVal::list(vec![int(1), int(2)]),
            JesterVal::vector(vec![int(1), int(2)]),
            JesterVal::Set(PersistentSet::from_vec(vec![int(1)])),
            JesterVal::Atom(JesterAtom::new(int(0))),
        ];
        for v in &samples {
            assert_eq!(v, v, "reflexivity failed for {:?}", v);
        }
    }

    #[test]
    fn test_list_equals_vector_seq() {
        let list = JesterVal::list(vec![int(1), int(2), int(3)]);
        let vector = JesterVal::vector(vec![int(1), int(2), int(3)]);
        let vseq = crate::seq::seq_from_collection(&vector).unwrap();
        assert_eq!(list, vseq);
        assert_eq!(hash_val(&list), hash_val(&vseq));
        // List and vector also compare sequence-to-sequence.
        assert_eq!(list, vector);
        assert_eq!(hash_val(&list), hash_val(&vector));
    }

    #[test]
    fn test_array_map_equals_hash_map() {
        let am = JesterVal::ArrayMap(ArrayMap::from_flat(vec![
            JesterVal::keyword("a"),
            int(1),
            JesterVal::keyword("b"),
            int(2),
        ]));
        let hm = JesterVal::HashMap(PersistentHashMap::from_entries(vec![
            (JesterVal::keyword("b"), int(2)),
            (JesterVal::keyword("a"), int(1)),
        ]));
        assert_eq!(am, hm);
        assert_eq!(hash_val(&am), hash_val(&hm));
    }

    #[test]
    fn test_cross_kind_number_hash() {
        let i = int(7);
        let b = JesterVal::bigint(BigInt::from(7));
        assert_eq!(i, b);
        assert_eq!(hash_val(&i), hash_val(&b));
        // Normalised ratio 7/1 is the integer 7.
        let r = JesterVal::ratio(7, 1);
        assert_eq!(i, r);
        assert_eq!(hash_val(&i), hash_val(&r));
    }

    #[test]
    fn test_metadata_is_inert() {
        let v = JesterVal::vector(vec![int(1), int(2)]);
        let meta = JesterVal::ArrayMap(ArrayMap::from_flat(vec![
            JesterVal::keyword("doc"),
            JesterVal::string("d"),
        ]));
        let with = v.with_meta(meta.clone()).unwrap();
        assert_eq!(v, with);
        assert_eq!(hash_val(&v), hash_val(&with));
        assert_eq!(with.get_meta().unwrap(), meta);
        assert!(v.get_meta().is_none());
    }

    #[test]
    fn test_with_meta_merges() {
        let v = JesterVal::symbol("x");
        let m1 = JesterVal::ArrayMap(ArrayMap::from_flat(vec![
            JesterVal::keyword("a"),
            int(1),
        ]));
        let m2 = JesterVal::ArrayMap(ArrayMap::from_flat(vec![
            JesterVal::keyword("b"),
            int(2),
        ]));
        let merged = v.with_meta(m1).unwrap().with_meta(m2).unwrap();
        let meta = merged.get_meta().unwrap();
        assert_eq!(map_get(&meta, &JesterVal::keyword("a")), Some(int(1)));
        assert_eq!(map_get(&meta, &JesterVal::keyword("b")), Some(int(2)));
    }

    #[test]
    fn test_readable_printing() {
        assert_eq!(JesterVal::string("a\nb").to_readable_string(), "\"a\\nb\"");
        assert_eq!(JesterVal::Char('\n').to_readable_string(), "\\newline");
        assert_eq!(JesterVal::Char('x').to_readable_string(), "\\x");
        assert_eq!(
            JesterVal::list(vec![int(1), JesterVal::keyword("k")]).to_readable_string(),
            "(1 :k)"
        );
        assert_eq!(
            JesterVal::vector(vec![int(1), int(2)]).to_readable_string(),
            "[1 2]"
        );
        assert_eq!(JesterVal::ratio(1, 2).to_readable_string(), "1/2");
        assert_eq!(
            JesterVal::bigint(BigInt::from(5)).to_readable_string(),
            "5N"
        );
        assert_eq!(JesterVal::float(3.0).to_readable_string(), "3.0");
        assert_eq!(JesterVal::try_regex("a+").unwrap().to_readable_string(), "#\"a+\"");
    }

    #[test]
    fn test_plain_printing() {
        assert_eq!(format!("{}", JesterVal::string("hi")), "hi");
        assert_eq!(format!("{}", JesterVal::Char('x')), "x");
        assert_eq!(format!("{}", JesterVal::Nil), "nil");
    }

    #[test]
    fn test_fn_identity_equality() {
        let unit: Rc<dyn std::any::Any> = Rc::new(());
        let f1 = JesterFn::new(None, Rc::clone(&unit), Rc::clone(&unit));
        let f2 = JesterFn::new(None, Rc::clone(&unit), unit);
        assert_eq!(f1, f1.clone());
        assert_ne!(f1, f2);
    }

    #[test]
    fn test_var_rebinding_observable() {
        let var = JesterVar::with_value(Some("user"), "x", int(1));
        let alias = var.clone();
        var.set_root(int(2));
        assert_eq!(alias.deref(), Some(int(2)));
    }

    #[test]
    fn test_atom_identity() {
        let a = JesterAtom::new(int(1));
        let b = JesterAtom::new(int(1));
        assert_ne!(JesterVal::Atom(a.clone()), JesterVal::Atom(b));
        assert_eq!(JesterVal::Atom(a.clone()), JesterVal::Atom(a));
    }
}
