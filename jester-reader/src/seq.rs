// jester-reader - Sequence kinds
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The concrete sequence kinds behind the sequence protocol.
//!
//! Every sequence answers first / rest / is-empty / cons. The kinds here
//! are pure structure: array slices, cons cells, map-entry walks and vector
//! walks. The lazy kinds (`LazySeq`, `MappingSeq`) store unevaluated
//! functions; forcing them means calling into the evaluator, so the
//! evaluator owns forcing and this module only exposes the memo cell.

use std::cell::RefCell;
use std::rc::Rc;

use crate::list::List;
use crate::value::JesterVal;
use crate::vector::PersistentVector;

/// A concrete sequence value.
#[derive(Clone, Debug)]
pub enum SeqVal {
    /// Slice of values plus a position.
    Array(ArraySeq),
    /// Explicit first/rest pair.
    Cons(Rc<ConsCell>),
    /// Deferred sequence with a memoised thunk.
    Lazy(LazySeq),
    /// Lazily maps a function over a source sequence.
    Mapping(Rc<MappingSeq>),
    /// Walk of map entries as `[k v]` pairs.
    Node(NodeSeq),
    /// Forward walk of a vector.
    Vector(VectorSeq),
    /// Reverse walk of a vector.
    VectorR(VectorRSeq),
}

// ---------------------------------------------------------------------------
// Array seq
// ---------------------------------------------------------------------------

/// A sequence over a shared slice; `rest` advances the index.
#[derive(Clone, Debug)]
pub struct ArraySeq {
    arr: Rc<[JesterVal]>,
    index: usize,
}

impl ArraySeq {
    #[must_use]
    pub fn new(arr: Rc<[JesterVal]>) -> Self {
        ArraySeq { arr, index: 0 }
    }

    #[must_use]
    pub fn from_vec(items: Vec<JesterVal>) -> Self {
        ArraySeq {
            arr: Rc::from(items),
            index: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index >= self.arr.len()
    }

    #[must_use]
    pub fn first(&self) -> Option<&JesterVal> {
        self.arr.get(self.index)
    }

    /// The rest as a value: another array seq, or the empty list.
    #[must_use]
    pub fn rest_val(&self) -> JesterVal {
        if self.index + 1 < self.arr.len() {
            JesterVal::Seq(SeqVal::Array(ArraySeq {
                arr: Rc::clone(&self.arr),
                index: self.index + 1,
            }))
        } else {
            JesterVal::List(List::new())
        }
    }

    /// Remaining elements in order.
    #[must_use]
    pub fn remaining(&self) -> &[JesterVal] {
        &self.arr[self.index.min(self.arr.len())..]
    }

    /// Identity handle for address-based hashing.
    #[must_use]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.arr) as *const u8 as usize
    }
}

// ---------------------------------------------------------------------------
// Cons seq
// ---------------------------------------------------------------------------

/// An explicit pair of a first element and a rest sequence.
#[derive(Clone, Debug)]
pub struct ConsCell {
    pub first: JesterVal,
    pub rest: JesterVal,
}

/// Prepend a value onto any sequence value.
#[must_use]
pub fn cons(first: JesterVal, rest: JesterVal) -> SeqVal {
    SeqVal::Cons(Rc::new(ConsCell { first, rest }))
}

// ---------------------------------------------------------------------------
// Lazy seq
// ---------------------------------------------------------------------------

/// A deferred sequence: a thunk producing a sequence on first access. The
/// thunk's result replaces it, so forcing is idempotent and traversal is
/// repeatable.
#[derive(Clone)]
pub struct LazySeq {
    state: Rc<RefCell<LazyState>>,
}

/// Cell state of a lazy sequence.
#[derive(Clone)]
pub enum LazyState {
    /// Unevaluated; holds a zero-argument callable.
    Pending(JesterVal),
    /// Evaluated; holds the produced sequence head.
    Realized(SeqResult),
}

/// The realised head of a lazy sequence.
#[derive(Clone, Debug)]
pub enum SeqResult {
    Empty,
    Cons(JesterVal, JesterVal),
}

impl LazySeq {
    /// Create a pending lazy sequence from a zero-argument callable.
    #[must_use]
    pub fn new(thunk: JesterVal) -> Self {
        LazySeq {
            state: Rc::new(RefCell::new(LazyState::Pending(thunk))),
        }
    }

    /// Create an already-realised lazy sequence from a first/rest pair.
    #[must_use]
    pub fn from_cons(first: JesterVal, rest: JesterVal) -> Self {
        LazySeq {
            state: Rc::new(RefCell::new(LazyState::Realized(SeqResult::Cons(
                first, rest,
            )))),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_realized(&self) -> bool {
        matches!(*self.state.borrow(), LazyState::Realized(_))
    }

    /// The pending thunk, or `None` once realised.
    #[must_use]
    pub fn pending_thunk(&self) -> Option<JesterVal> {
        match &*self.state.borrow() {
            LazyState::Pending(thunk) => Some(thunk.clone()),
            LazyState::Realized(_) => None,
        }
    }

    /// The realised head, or `None` while pending.
    #[must_use]
    pub fn realized_result(&self) -> Option<SeqResult> {
        match &*self.state.borrow() {
            LazyState::Pending(_) => None,
            LazyState::Realized(result) => Some(result.clone()),
        }
    }

    /// Install the realised head. Later callers observe this result.
    pub fn set_realized(&self, result: SeqResult) {
        *self.state.borrow_mut() = LazyState::Realized(result);
    }

    /// Identity handle for address-based equality and hashing.
    #[must_use]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.state) as *const u8 as usize
    }
}

impl std::fmt::Debug for LazySeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &*self.state.borrow() {
            LazyState::Pending(_) => write!(f, "#<lazy-seq pending>"),
            LazyState::Realized(SeqResult::Empty) => write!(f, "()"),
            LazyState::Realized(SeqResult::Cons(first, rest)) => {
                write!(f, "({:?} . {:?})", first, rest)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping seq
// ---------------------------------------------------------------------------

/// Lazily maps a callable over a source sequence. The evaluator computes
/// first/rest by applying the function.
#[derive(Clone, Debug)]
pub struct MappingSeq {
    pub f: JesterVal,
    pub source: JesterVal,
}

// ---------------------------------------------------------------------------
// Node seq (map entries)
// ---------------------------------------------------------------------------

/// A walk over map entries, each a two-element `[k v]` vector. The entry
/// array is computed once and shared by every tail.
#[derive(Clone, Debug)]
pub struct NodeSeq {
    entries: Rc<[JesterVal]>,
    index: usize,
}

impl NodeSeq {
    /// Build from `(key, value)` pairs.
    #[must_use]
    pub fn from_pairs<I: IntoIterator<Item = (JesterVal, JesterVal)>>(pairs: I) -> Self {
        let entries: Vec<JesterVal> = pairs
            .into_iter()
            .map(|(k, v)| JesterVal::Vector(PersistentVector::from_vec(vec![k, v])))
            .collect();
        NodeSeq {
            entries: Rc::from(entries),
            index: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index >= self.entries.len()
    }

    #[must_use]
    pub fn first(&self) -> Option<&JesterVal> {
        self.entries.get(self.index)
    }

    #[must_use]
    pub fn rest_val(&self) -> JesterVal {
        if self.index + 1 < self.entries.len() {
            JesterVal::Seq(SeqVal::Node(NodeSeq {
                entries: Rc::clone(&self.entries),
                index: self.index + 1,
            }))
        } else {
            JesterVal::List(List::new())
        }
    }

    #[must_use]
    pub fn remaining(&self) -> &[JesterVal] {
        &self.entries[self.index.min(self.entries.len())..]
    }
}

// ---------------------------------------------------------------------------
// Vector seqs
// ---------------------------------------------------------------------------

/// Forward walk of a vector.
#[derive(Clone, Debug)]
pub struct VectorSeq {
    vec: Rc<PersistentVector>,
    index: usize,
}

impl VectorSeq {
    #[must_use]
    pub fn new(vec: Rc<PersistentVector>) -> Self {
        VectorSeq { vec, index: 0 }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index >= self.vec.count()
    }

    #[must_use]
    pub fn first(&self) -> Option<&JesterVal> {
        self.vec.nth(self.index)
    }

    #[must_use]
    pub fn rest_val(&self) -> JesterVal {
        if self.index + 1 < self.vec.count() {
            JesterVal::Seq(SeqVal::Vector(VectorSeq {
                vec: Rc::clone(&self.vec),
                index: self.index + 1,
            }))
        } else {
            JesterVal::List(List::new())
        }
    }

    /// Remaining elements in order.
    #[must_use]
    pub fn remaining(&self) -> Vec<JesterVal> {
        (self.index..self.vec.count())
            .filter_map(|i| self.vec.nth(i).cloned())
            .collect()
    }
}

/// Reverse walk of a vector; `remaining` counts down from the end.
#[derive(Clone, Debug)]
pub struct VectorRSeq {
    vec: Rc<PersistentVector>,
    remaining: usize,
}

impl VectorRSeq {
    #[must_use]
    pub fn new(vec: Rc<PersistentVector>) -> Self {
        let remaining = vec.count();
        VectorRSeq { vec, remaining }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    #[must_use]
    pub fn first(&self) -> Option<&JesterVal> {
        if self.remaining == 0 {
            None
        } else {
            self.vec.nth(self.remaining - 1)
        }
    }

    #[must_use]
    pub fn rest_val(&self) -> JesterVal {
        if self.remaining > 1 {
            JesterVal::Seq(SeqVal::VectorR(VectorRSeq {
                vec: Rc::clone(&self.vec),
                remaining: self.remaining - 1,
            }))
        } else {
            JesterVal::List(List::new())
        }
    }

    /// Remaining elements, last first.
    #[must_use]
    pub fn remaining_elements(&self) -> Vec<JesterVal> {
        (0..self.remaining)
            .rev()
            .filter_map(|i| self.vec.nth(i).cloned())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Structure-only traversal
// ---------------------------------------------------------------------------

/// Materialise the elements of a sequential value without forcing anything.
///
/// Returns `None` when the value is not sequential or when traversal would
/// need the evaluator (a pending lazy seq or a mapping seq). Used by
/// structural equality, hashing and printing; the evaluator realises lazy
/// parts before user-visible comparisons.
#[must_use]
pub fn try_realized_elements(val: &JesterVal) -> Option<Vec<JesterVal>> {
    let mut out = Vec::new();
    let mut cur = val.clone();
    loop {
        match cur {
            JesterVal::Nil => return Some(out),
            JesterVal::List(l) => {
                out.extend(l.iter().cloned());
                return Some(out);
            }
            JesterVal::Vector(v) => {
                out.extend(v.iter().cloned());
                return Some(out);
            }
            JesterVal::Seq(seq) => match seq {
                SeqVal::Array(a) => {
                    out.extend_from_slice(a.remaining());
                    return Some(out);
                }
                SeqVal::Node(n) => {
                    out.extend_from_slice(n.remaining());
                    return Some(out);
                }
                SeqVal::Vector(vs) => {
                    out.extend(vs.remaining());
                    return Some(out);
                }
                SeqVal::VectorR(vs) => {
                    out.extend(vs.remaining_elements());
                    return Some(out);
                }
                SeqVal::Cons(cell) => {
                    out.push(cell.first.clone());
                    cur = cell.rest.clone();
                }
                SeqVal::Lazy(lazy) => match lazy.realized_result() {
                    Some(SeqResult::Empty) => return Some(out),
                    Some(SeqResult::Cons(first, rest)) => {
                        out.push(first);
                        cur = rest;
                    }
                    None => return None,
                },
                SeqVal::Mapping(_) => return None,
            },
            _ => return None,
        }
    }
}

/// A sequence view over a collection, built without forcing.
///
/// `Some(Nil)` means the collection is empty; `None` means the value needs
/// the evaluator to sequence (pending lazy or mapping seqs) or is not
/// seqable at all; the caller distinguishes those two.
#[must_use]
pub fn seq_from_collection(val: &JesterVal) -> Option<JesterVal> {
    match val {
        JesterVal::Nil => Some(JesterVal::Nil),
        JesterVal::List(l) => {
            if l.is_empty() {
                Some(JesterVal::Nil)
            } else {
                Some(val.clone())
            }
        }
        JesterVal::Vector(v) => {
            if v.is_empty() {
                Some(JesterVal::Nil)
            } else {
                Some(JesterVal::Seq(SeqVal::Vector(VectorSeq::new(Rc::new(
                    v.clone(),
                )))))
            }
        }
        JesterVal::ArrayMap(m) => {
            if m.is_empty() {
                Some(JesterVal::Nil)
            } else {
                Some(JesterVal::Seq(SeqVal::Node(NodeSeq::from_pairs(
                    m.iter().map(|(k, v)| (k.clone(), v.clone())),
                ))))
            }
        }
        JesterVal::HashMap(m) => {
            if m.is_empty() {
                Some(JesterVal::Nil)
            } else {
                Some(JesterVal::Seq(SeqVal::Node(NodeSeq::from_pairs(
                    m.iter().map(|(k, v)| (k.clone(), v.clone())),
                ))))
            }
        }
        JesterVal::Set(s) => {
            if s.is_empty() {
                Some(JesterVal::Nil)
            } else {
                Some(JesterVal::Seq(SeqVal::Array(ArraySeq::from_vec(
                    s.elements(),
                ))))
            }
        }
        JesterVal::String(s) => {
            if s.is_empty() {
                Some(JesterVal::Nil)
            } else {
                Some(JesterVal::Seq(SeqVal::Array(ArraySeq::from_vec(
                    s.chars().map(JesterVal::Char).collect(),
                ))))
            }
        }
        JesterVal::Seq(seq) => match seq {
            SeqVal::Array(a) if a.is_empty() => Some(JesterVal::Nil),
            SeqVal::Node(n) if n.is_empty() => Some(JesterVal::Nil),
            SeqVal::Vector(v) if v.is_empty() => Some(JesterVal::Nil),
            SeqVal::VectorR(v) if v.is_empty() => Some(JesterVal::Nil),
            SeqVal::Array(_) | SeqVal::Node(_) | SeqVal::Vector(_) | SeqVal::VectorR(_) => {
                Some(val.clone())
            }
            SeqVal::Cons(_) => Some(val.clone()),
            SeqVal::Lazy(lazy) => match lazy.realized_result() {
                Some(SeqResult::Empty) => Some(JesterVal::Nil),
                Some(SeqResult::Cons(..)) => Some(val.clone()),
                None => None,
            },
            SeqVal::Mapping(_) => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> JesterVal {
        JesterVal::Int(i)
    }

    #[test]
    fn test_array_seq_walk() {
        let s = ArraySeq::from_vec(vec![int(1), int(2)]);
        assert_eq!(s.first(), Some(&int(1)));
        let rest = s.rest_val();
        match &rest {
            JesterVal::Seq(SeqVal::Array(r)) => assert_eq!(r.first(), Some(&int(2))),
            other => panic!("expected array seq, got {:?}", other),
        }
        match &rest {
            JesterVal::Seq(SeqVal::Array(r)) => {
                assert!(matches!(r.rest_val(), JesterVal::List(l) if l.is_empty()));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_lazy_seq_memoises() {
        let lazy = LazySeq::new(JesterVal::Nil);
        assert!(!lazy.is_realized());
        lazy.set_realized(SeqResult::Cons(int(1), JesterVal::Nil));
        assert!(lazy.is_realized());
        // A clone shares the memo cell.
        let alias = lazy.clone();
        assert!(alias.is_realized());
    }

    #[test]
    fn test_vector_seq_order() {
        let v = Rc::new(PersistentVector::from_vec(vec![int(1), int(2), int(3)]));
        let fwd = JesterVal::Seq(SeqVal::Vector(VectorSeq::new(Rc::clone(&v))));
        assert_eq!(
            try_realized_elements(&fwd).unwrap(),
            vec![int(1), int(2), int(3)]
        );
        let rev = JesterVal::Seq(SeqVal::VectorR(VectorRSeq::new(v)));
        assert_eq!(
            try_realized_elements(&rev).unwrap(),
            vec![int(3), int(2), int(1)]
        );
    }

    #[test]
    fn test_pending_lazy_blocks_traversal() {
        let lazy = JesterVal::Seq(SeqVal::Lazy(LazySeq::new(JesterVal::Nil)));
        assert!(try_realized_elements(&lazy).is_none());
    }
}
