// jester-reader - Reified type tags
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Process-global registry of reified type tags.
//!
//! Tags come in two flavours: concrete tags naming a single value kind
//! (`Int`, `ArrayMap`, `LazySeq`, ...) and capability tags naming a set of
//! kinds that share behaviour (`Associative`, `Counted`, `Seq`, ...).
//! `is_instance` answers both: a concrete tag matches exactly its kind, a
//! capability tag matches every kind exhibiting the capability.
//!
//! The registry is populated once and is read-only thereafter; tags are
//! compared by address.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use crate::seq::SeqVal;
use crate::value::JesterVal;

/// A reified type tag.
pub struct Type {
    name: &'static str,
    tag: Tag,
}

/// What a tag denotes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tag {
    Concrete(Concrete),
    Capability(Capability),
}

/// Concrete value kinds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Concrete {
    ArrayMap,
    ArraySeq,
    Atom,
    BigFloat,
    BigInt,
    Bool,
    Char,
    ConsSeq,
    Delay,
    Double,
    EvalError,
    ExInfo,
    Fn,
    HashMap,
    Int,
    Keyword,
    LazySeq,
    List,
    MapSet,
    MappingSeq,
    Namespace,
    Nil,
    NodeSeq,
    ParseError,
    Proc,
    Ratio,
    RecurBindings,
    Regex,
    String,
    Symbol,
    Type,
    Var,
    Vector,
    VectorRSeq,
    VectorSeq,
}

/// Capability sets shared by several kinds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Capability {
    Associative,
    Callable,
    Collection,
    Comparable,
    Counted,
    Deref,
    Error,
    Gettable,
    Indexed,
    Map,
    Named,
    Number,
    Pending,
    Ref,
    Reversible,
    Seq,
    Seqable,
    Sequential,
    Set,
    Stack,
}

impl Type {
    /// The registered name of this tag.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The tag payload.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.tag
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.name)
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self as *const Type as usize).hash(state);
    }
}

macro_rules! concrete {
    ($name:literal, $kind:ident) => {
        Type {
            name: $name,
            tag: Tag::Concrete(Concrete::$kind),
        }
    };
}

macro_rules! capability {
    ($name:literal, $kind:ident) => {
        Type {
            name: $name,
            tag: Tag::Capability(Capability::$kind),
        }
    };
}

/// Every registered tag, concrete and capability.
static TYPES: &[Type] = &[
    capability!("Associative", Associative),
    capability!("Callable", Callable),
    capability!("Collection", Collection),
    capability!("Comparable", Comparable),
    capability!("Counted", Counted),
    capability!("Deref", Deref),
    capability!("Error", Error),
    capability!("Gettable", Gettable),
    capability!("Indexed", Indexed),
    capability!("Map", Map),
    capability!("Named", Named),
    capability!("Number", Number),
    capability!("Pending", Pending),
    capability!("Ref", Ref),
    capability!("Reversible", Reversible),
    capability!("Seq", Seq),
    capability!("Seqable", Seqable),
    capability!("Sequential", Sequential),
    capability!("Set", Set),
    capability!("Stack", Stack),
    concrete!("ArrayMap", ArrayMap),
    concrete!("ArraySeq", ArraySeq),
    concrete!("Atom", Atom),
    concrete!("BigFloat", BigFloat),
    concrete!("BigInt", BigInt),
    concrete!("Bool", Bool),
    concrete!("Char", Char),
    concrete!("ConsSeq", ConsSeq),
    concrete!("Delay", Delay),
    concrete!("Double", Double),
    concrete!("EvalError", EvalError),
    concrete!("ExInfo", ExInfo),
    concrete!("Fn", Fn),
    concrete!("HashMap", HashMap),
    concrete!("Int", Int),
    concrete!("Keyword", Keyword),
    concrete!("LazySeq", LazySeq),
    concrete!("List", List),
    concrete!("MapSet", MapSet),
    concrete!("MappingSeq", MappingSeq),
    concrete!("Namespace", Namespace),
    concrete!("Nil", Nil),
    concrete!("NodeSeq", NodeSeq),
    concrete!("ParseError", ParseError),
    concrete!("Proc", Proc),
    concrete!("Ratio", Ratio),
    concrete!("RecurBindings", RecurBindings),
    concrete!("Regex", Regex),
    concrete!("String", String),
    concrete!("Symbol", Symbol),
    concrete!("Type", Type),
    concrete!("Var", Var),
    concrete!("Vector", Vector),
    concrete!("VectorRSeq", VectorRSeq),
    concrete!("VectorSeq", VectorSeq),
];

static BY_NAME: OnceLock<HashMap<&'static str, &'static Type>> = OnceLock::new();

/// Look up a tag by its registered name.
#[must_use]
pub fn by_name(name: &str) -> Option<&'static Type> {
    BY_NAME
        .get_or_init(|| TYPES.iter().map(|t| (t.name, t)).collect())
        .get(name)
        .copied()
}

/// Every registered tag, in registration order.
pub fn all_types() -> impl Iterator<Item = &'static Type> {
    TYPES.iter()
}

/// Look up a concrete tag. Infallible: every concrete kind is registered.
#[must_use]
pub fn concrete(kind: Concrete) -> &'static Type {
    TYPES
        .iter()
        .find(|t| t.tag == Tag::Concrete(kind))
        .expect("concrete kind registered at build time")
}

/// The concrete tag for a value.
#[must_use]
pub fn type_of(val: &JesterVal) -> &'static Type {
    let kind = match val {
        JesterVal::Nil => Concrete::Nil,
        JesterVal::Bool(_) => Concrete::Bool,
        JesterVal::Char(_) => Concrete::Char,
        JesterVal::Int(_) => Concrete::Int,
        JesterVal::Double(_) => Concrete::Double,
        JesterVal::BigInt(_) => Concrete::BigInt,
        JesterVal::BigFloat(_) => Concrete::BigFloat,
        JesterVal::Ratio(_) => Concrete::Ratio,
        JesterVal::String(_) => Concrete::String,
        JesterVal::Regex(_) => Concrete::Regex,
        JesterVal::Symbol(..) => Concrete::Symbol,
        JesterVal::Keyword(_) => Concrete::Keyword,
        JesterVal::List(_) => Concrete::List,
        JesterVal::Vector(_) => Concrete::Vector,
        JesterVal::ArrayMap(_) => Concrete::ArrayMap,
        JesterVal::HashMap(_) => Concrete::HashMap,
        JesterVal::Set(_) => Concrete::MapSet,
        JesterVal::Seq(seq) => match seq {
            SeqVal::Array(_) => Concrete::ArraySeq,
            SeqVal::Cons(_) => Concrete::ConsSeq,
            SeqVal::Lazy(_) => Concrete::LazySeq,
            SeqVal::Mapping(_) => Concrete::MappingSeq,
            SeqVal::Node(_) => Concrete::NodeSeq,
            SeqVal::Vector(_) => Concrete::VectorSeq,
            SeqVal::VectorR(_) => Concrete::VectorRSeq,
        },
        JesterVal::Fn(_) => Concrete::Fn,
        JesterVal::NativeFn(_) => Concrete::Proc,
        JesterVal::Var(_) => Concrete::Var,
        JesterVal::Namespace(_) => Concrete::Namespace,
        JesterVal::Type(_) => Concrete::Type,
        JesterVal::Atom(_) => Concrete::Atom,
        JesterVal::Delay(_) => Concrete::Delay,
        JesterVal::ExInfo(_) => Concrete::ExInfo,
        JesterVal::EvalError(_) => Concrete::EvalError,
        JesterVal::ParseError(_) => Concrete::ParseError,
        JesterVal::RecurBindings(_) => Concrete::RecurBindings,
    };
    concrete(kind)
}

/// True when the value matches the tag: exactly for a concrete tag, by
/// capability for a capability tag. `nil` is an instance of nothing.
#[must_use]
pub fn is_instance(tag: &Type, val: &JesterVal) -> bool {
    if matches!(val, JesterVal::Nil) {
        return false;
    }
    match tag.tag {
        Tag::Concrete(_) => std::ptr::eq(type_of(val), tag),
        Tag::Capability(cap) => has_capability(cap, val),
    }
}

fn has_capability(cap: Capability, val: &JesterVal) -> bool {
    use JesterVal as V;
    match cap {
        Capability::Associative => {
            matches!(val, V::Vector(_) | V::ArrayMap(_) | V::HashMap(_))
        }
        Capability::Callable => matches!(
            val,
            V::Fn(_)
                | V::NativeFn(_)
                | V::Keyword(_)
                | V::Vector(_)
                | V::ArrayMap(_)
                | V::HashMap(_)
                | V::Set(_)
                | V::Var(_)
        ),
        Capability::Collection => matches!(
            val,
            V::List(_) | V::Vector(_) | V::ArrayMap(_) | V::HashMap(_) | V::Set(_)
        ),
        Capability::Comparable => matches!(
            val,
            V::Int(_)
                | V::Double(_)
                | V::BigInt(_)
                | V::BigFloat(_)
                | V::Ratio(_)
                | V::String(_)
                | V::Char(_)
                | V::Bool(_)
                | V::Keyword(_)
                | V::Symbol(..)
                | V::Vector(_)
        ),
        Capability::Counted => matches!(
            val,
            V::String(_) | V::List(_) | V::Vector(_) | V::ArrayMap(_) | V::HashMap(_) | V::Set(_)
        ),
        Capability::Deref => matches!(val, V::Var(_) | V::Atom(_) | V::Delay(_)),
        Capability::Error => matches!(val, V::ExInfo(_) | V::EvalError(_) | V::ParseError(_)),
        Capability::Gettable => matches!(
            val,
            V::Vector(_) | V::ArrayMap(_) | V::HashMap(_) | V::Set(_)
        ),
        Capability::Indexed => matches!(val, V::Vector(_) | V::String(_)),
        Capability::Map => matches!(val, V::ArrayMap(_) | V::HashMap(_)),
        Capability::Named => matches!(val, V::Keyword(_) | V::Symbol(..)),
        Capability::Number => matches!(
            val,
            V::Int(_) | V::Double(_) | V::BigInt(_) | V::BigFloat(_) | V::Ratio(_)
        ),
        Capability::Pending => matches!(val, V::Delay(_) | V::Seq(SeqVal::Lazy(_))),
        Capability::Ref => matches!(val, V::Var(_) | V::Atom(_)),
        Capability::Reversible => matches!(val, V::Vector(_)),
        Capability::Seq => matches!(val, V::List(_) | V::Seq(_)),
        Capability::Seqable => matches!(
            val,
            V::List(_)
                | V::Seq(_)
                | V::Vector(_)
                | V::ArrayMap(_)
                | V::HashMap(_)
                | V::Set(_)
                | V::String(_)
        ),
        Capability::Sequential => matches!(val, V::List(_) | V::Vector(_) | V::Seq(_)),
        Capability::Set => matches!(val, V::Set(_)),
        Capability::Stack => matches!(val, V::List(_) | V::Vector(_)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name_finds_concrete_and_capability() {
        assert!(by_name("ArrayMap").is_some());
        assert!(by_name("Seq").is_some());
        assert!(by_name("NoSuchType").is_none());
    }

    #[test]
    fn test_tags_compare_by_address() {
        let a = by_name("Int").unwrap();
        let b = by_name("Int").unwrap();
        assert_eq!(a, b);
        assert_ne!(by_name("Int").unwrap(), by_name("Double").unwrap());
    }

    #[test]
    fn test_nil_is_instance_of_nothing() {
        let nil_tag = by_name("Nil").unwrap();
        assert!(!is_instance(nil_tag, &JesterVal::Nil));
    }

    #[test]
    fn test_concrete_instance() {
        let int_tag = by_name("Int").unwrap();
        assert!(is_instance(int_tag, &JesterVal::Int(1)));
        assert!(!is_instance(int_tag, &JesterVal::Bool(true)));
    }

    #[test]
    fn test_capability_instance() {
        let number = by_name("Number").unwrap();
        assert!(is_instance(number, &JesterVal::Int(1)));
        assert!(is_instance(number, &JesterVal::Double(1.5)));
        assert!(!is_instance(number, &JesterVal::Bool(true)));
    }
}
