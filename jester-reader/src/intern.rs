// jester-reader - Process-wide string interning
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Process-wide string intern pool.
//!
//! `intern` canonicalises a string so that equal content shares one stable
//! handle. Symbols and keywords are built from interned handles, which means
//! namespace and name comparisons reduce to pointer equality.
//!
//! # Memory behaviour
//!
//! Interned strings are never deallocated: the pool keeps a strong `Arc` for
//! every distinct string seen during the program's lifetime. Memory grows
//! monotonically with unique names, which is modest for typical programs but
//! worth knowing for long-running processes that `gensym` heavily.
//!
//! # Thread safety
//!
//! The pool is behind a `Mutex`, so handle creation is thread-safe; handle
//! comparison and hashing are lock-free after creation.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, OnceLock};

/// A stable handle to an interned string.
///
/// Two handles for the same content are pointer-equal, so equality and
/// hashing are O(1) and independent of string length.
#[derive(Clone)]
pub struct InternedStr {
    inner: Arc<str>,
}

static POOL: OnceLock<Mutex<HashMap<String, Arc<str>>>> = OnceLock::new();

fn pool() -> &'static Mutex<HashMap<String, Arc<str>>> {
    POOL.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Intern a string, returning the canonical handle for its content.
pub fn intern(s: &str) -> InternedStr {
    let mut pool = pool()
        .lock()
        .expect("string intern pool mutex poisoned: another thread panicked while holding it");
    if let Some(existing) = pool.get(s) {
        return InternedStr {
            inner: Arc::clone(existing),
        };
    }
    let inner: Arc<str> = Arc::from(s);
    pool.insert(s.to_string(), Arc::clone(&inner));
    InternedStr { inner }
}

impl InternedStr {
    /// The interned content.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Address of the canonical storage; usable as an identity key.
    #[inline]
    #[must_use]
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const u8 as usize
    }
}

impl fmt::Display for InternedStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl fmt::Debug for InternedStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InternedStr({:?})", &*self.inner)
    }
}

impl PartialEq for InternedStr {
    fn eq(&self, other: &Self) -> bool {
        // Interning guarantees equal content shares one allocation.
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for InternedStr {}

impl PartialOrd for InternedStr {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InternedStr {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Hash for InternedStr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_shares_storage() {
        let a = intern("foo");
        let b = intern("foo");
        assert_eq!(a, b);
        assert_eq!(a.addr(), b.addr());
    }

    #[test]
    fn test_distinct_content_distinct_handles() {
        let a = intern("foo");
        let b = intern("bar");
        assert_ne!(a, b);
        assert_ne!(a.addr(), b.addr());
    }

    #[test]
    fn test_content_preserved() {
        let a = intern("hello world");
        assert_eq!(a.as_str(), "hello world");
        assert_eq!(format!("{}", a), "hello world");
    }
}
