// jester-reader - Symbol type
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Symbols are identifiers with an optional namespace part.
//!
//! Both the namespace and the name are interned handles, so symbol equality
//! is two pointer comparisons and hashing is computed from handle addresses.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::intern::{intern, InternedStr};

/// A symbol with an optional namespace.
#[derive(Clone)]
pub struct Symbol {
    ns: Option<InternedStr>,
    name: InternedStr,
}

impl Symbol {
    /// Create a symbol with no namespace.
    pub fn new(name: &str) -> Self {
        Symbol {
            ns: None,
            name: intern(name),
        }
    }

    /// Create a symbol with a namespace.
    pub fn with_namespace(ns: &str, name: &str) -> Self {
        Symbol {
            ns: Some(intern(ns)),
            name: intern(name),
        }
    }

    /// Parse a symbol from a string like `foo` or `ns/foo`.
    ///
    /// The division symbol `/` and names like `ns//` keep Clojure's reading:
    /// a lone `/` is the name itself.
    pub fn parse(s: &str) -> Self {
        match s.find('/') {
            Some(_) if s == "/" => Symbol::new("/"),
            Some(idx) => Symbol::with_namespace(&s[..idx], &s[idx + 1..]),
            None => Symbol::new(s),
        }
    }

    /// The namespace part, if any.
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.ns.as_ref().map(InternedStr::as_str)
    }

    /// The namespace handle, if any.
    #[inline]
    #[must_use]
    pub fn namespace_handle(&self) -> Option<&InternedStr> {
        self.ns.as_ref()
    }

    /// The name part.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The name handle.
    #[inline]
    #[must_use]
    pub fn name_handle(&self) -> &InternedStr {
        &self.name
    }

    /// Whether this symbol has a namespace.
    #[inline]
    #[must_use]
    pub fn has_namespace(&self) -> bool {
        self.ns.is_some()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns {
            Some(ns) => write!(f, "{}/{}", ns, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        // Interned handles: pointer equality suffices.
        self.ns == other.ns && self.name == other.name
    }
}

impl Eq for Symbol {}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
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

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ns.as_ref().map_or(0, InternedStr::addr).hash(state);
        self.name.addr().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_symbol() {
        let sym = Symbol::new("foo");
        assert_eq!(sym.name(), "foo");
        assert!(sym.namespace().is_none());
        assert_eq!(format!("{}", sym), "foo");
    }

    #[test]
    fn test_namespaced_symbol() {
        let sym = Symbol::with_namespace("user", "foo");
        assert_eq!(sym.name(), "foo");
        assert_eq!(sym.namespace(), Some("user"));
        assert_eq!(format!("{}", sym), "user/foo");
    }

    #[test]
    fn test_parse_namespaced() {
        let sym = Symbol::parse("user/foo");
        assert_eq!(sym.name(), "foo");
        assert_eq!(sym.namespace(), Some("user"));
    }

    #[test]
    fn test_parse_slash_symbol() {
        let sym = Symbol::parse("/");
        assert_eq!(sym.name(), "/");
        assert!(sym.namespace().is_none());
    }

    #[test]
    fn test_equality_via_interning() {
        assert_eq!(Symbol::new("foo"), Symbol::new("foo"));
        assert_ne!(Symbol::new("foo"), Symbol::new("bar"));
        assert_ne!(Symbol::new("foo"), Symbol::with_namespace("a", "foo"));
    }

    #[test]
    fn test_ordering() {
        assert!(Symbol::new("a") < Symbol::new("b"));
        // Non-namespaced sorts before namespaced.
        assert!(Symbol::new("z") < Symbol::with_namespace("a", "a"));
    }
}
