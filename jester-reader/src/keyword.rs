// jester-reader - Keyword type
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Keywords are interned, self-evaluating identifiers like `:foo` or
//! `:ns/foo`.
//!
//! Like symbols they carry interned namespace/name handles; unlike symbols
//! they precompute their hash at construction, since keywords are the
//! dominant map-key kind and get hashed constantly.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::intern::{intern, InternedStr};

/// A keyword with an optional namespace.
#[derive(Clone)]
pub struct Keyword {
    ns: Option<InternedStr>,
    name: InternedStr,
    hash: u32,
}

/// Fold interned-handle addresses into a 32-bit hash (fnv-1a).
fn hash_handles(ns: Option<&InternedStr>, name: &InternedStr) -> u32 {
    let mut h: u32 = 0x811c_9dc5;
    let mut step = |word: usize| {
        for b in word.to_le_bytes() {
            h ^= u32::from(b);
            h = h.wrapping_mul(0x0100_0193);
        }
    };
    step(name.addr());
    step(ns.map_or(0, InternedStr::addr));
    h
}

impl Keyword {
    /// Create a keyword with no namespace. The name excludes the leading `:`.
    pub fn new(name: &str) -> Self {
        let name = intern(name);
        let hash = hash_handles(None, &name);
        Keyword {
            ns: None,
            name,
            hash,
        }
    }

    /// Create a keyword with a namespace.
    pub fn with_namespace(ns: &str, name: &str) -> Self {
        let ns = intern(ns);
        let name = intern(name);
        let hash = hash_handles(Some(&ns), &name);
        Keyword {
            ns: Some(ns),
            name,
            hash,
        }
    }

    /// Parse a keyword from a string like `foo` or `ns/foo` (no leading `:`).
    pub fn parse(s: &str) -> Self {
        match s.find('/') {
            Some(_) if s == "/" => Keyword::new("/"),
            Some(idx) => Keyword::with_namespace(&s[..idx], &s[idx + 1..]),
            None => Keyword::new(s),
        }
    }

    /// The namespace part, if any.
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.ns.as_ref().map(InternedStr::as_str)
    }

    /// The name part.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The precomputed 32-bit hash.
    #[inline]
    #[must_use]
    pub fn hash_value(&self) -> u32 {
        self.hash
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns {
            Some(ns) => write!(f, ":{}/{}", ns, self.name),
            None => write!(f, ":{}", self.name),
        }
    }
}

impl fmt::Debug for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keyword({})", self)
    }
}

impl PartialEq for Keyword {
    fn eq(&self, other: &Self) -> bool {
        self.ns == other.ns && self.name == other.name
    }
}

impl Eq for Keyword {}

impl PartialOrd for Keyword {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Keyword {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (&self.ns, &other.ns) {
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, None) => self.name.as_str().cmp(other.name.as_str()),
            (Some(a), Some(b)) => match a.as_str().cmp(b.as_str()) {
                std::cmp::Ordering::Equal => self.name.as_str().cmp(other.name.as_str()),
                other => other,
            },
        }
    }
}

impl Hash for Keyword {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_keyword() {
        let kw = Keyword::new("foo");
        assert_eq!(kw.name(), "foo");
        assert!(kw.namespace().is_none());
        assert_eq!(format!("{}", kw), ":foo");
    }

    #[test]
    fn test_namespaced_keyword() {
        let kw = Keyword::with_namespace("db", "id");
        assert_eq!(kw.name(), "id");
        assert_eq!(kw.namespace(), Some("db"));
        assert_eq!(format!("{}", kw), ":db/id");
    }

    #[test]
    fn test_equality_and_hash() {
        let a = Keyword::new("foo");
        let b = Keyword::new("foo");
        assert_eq!(a, b);
        assert_eq!(a.hash_value(), b.hash_value());

        let c = Keyword::with_namespace("x", "foo");
        assert_ne!(a, c);
    }

    #[test]
    fn test_parse() {
        let kw = Keyword::parse("ns/name");
        assert_eq!(kw.namespace(), Some("ns"));
        assert_eq!(kw.name(), "name");
    }
}
