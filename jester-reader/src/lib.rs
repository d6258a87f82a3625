// jester-reader - Value kernel, persistent collections and reader
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # jester-reader
//!
//! The value kernel for the Jester programming language: the closed
//! `JesterVal` variant, string interning, symbols and keywords, the type
//! tag registry, the persistent collections (array map, HAMT hash map,
//! bit-partitioned vector, set), the sequence kinds, the numeric tower,
//! and the lexer + reader that turn source text into values with source
//! positions.

pub mod array_map;
pub mod hash_map;
pub mod intern;
pub mod keyword;
pub mod lexer;
pub mod list;
pub mod num;
pub mod reader;
pub mod seq;
pub mod set;
pub mod symbol;
pub mod types;
pub mod value;
pub mod vector;

pub use array_map::{ArrayMap, HASHMAP_THRESHOLD};
pub use bigdecimal::BigDecimal;
pub use hash_map::PersistentHashMap;
pub use intern::{intern, InternedStr};
pub use keyword::Keyword;
pub use lexer::{Lexer, LexerError, Token};
pub use list::List;
pub use num_bigint::BigInt;
pub use num_rational::BigRational;
pub use reader::{ReadError, Reader};
pub use seq::{
    cons, seq_from_collection, try_realized_elements, ArraySeq, ConsCell, LazySeq, LazyState,
    MappingSeq, NodeSeq, SeqResult, SeqVal, VectorRSeq, VectorSeq,
};
pub use set::PersistentSet;
pub use symbol::Symbol;
pub use types::{by_name as type_by_name, is_instance, type_of, Capability, Concrete, Tag, Type};
pub use value::{
    hash32, map_assoc, map_contains, map_count, map_entries, map_entry_at, map_get, map_merge,
    map_without, write_value, DelayState, EvalErrorVal, ExInfo, JesterAtom, JesterDelay, JesterFn,
    JesterRegex, JesterVal, JesterVar, Meta, NativeFn, ParseErrorVal, SourceInfo, TraceFrame,
};
pub use vector::PersistentVector;
