// jester-reader - Array map
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Small persistent map backed by a flat array of alternating key/value
//! slots.
//!
//! Lookup is linear, which beats hashing for small maps. Iteration order is
//! insertion order; equality ignores order. An `assoc` that would push the
//! map past [`HASHMAP_THRESHOLD`] entries returns an equivalent hash map
//! instead.

use std::rc::Rc;

use crate::hash_map::PersistentHashMap;
use crate::value::{JesterVal, Meta};

/// Maximum number of key/value pairs an array map holds before `assoc`
/// promotes it to a hash map.
pub const HASHMAP_THRESHOLD: usize = 16;

/// A persistent map as a flat array of alternating keys and values.
#[derive(Clone, Debug)]
pub struct ArrayMap {
    entries: Rc<[JesterVal]>,
    meta: Option<Rc<Meta>>,
}

impl ArrayMap {
    /// The empty array map.
    #[must_use]
    pub fn new() -> Self {
        ArrayMap {
            entries: Rc::from(Vec::new()),
            meta: None,
        }
    }

    /// Build from a flat alternating key/value array. Later duplicates of a
    /// key overwrite earlier ones.
    #[must_use]
    pub fn from_flat(flat: Vec<JesterVal>) -> Self {
        debug_assert!(flat.len() % 2 == 0, "array map needs key/value pairs");
        let mut entries: Vec<JesterVal> = Vec::with_capacity(flat.len());
        let mut it = flat.into_iter();
        while let (Some(k), Some(v)) = (it.next(), it.next()) {
            match index_of(&entries, &k) {
                Some(i) => entries[i + 1] = v,
                None => {
                    entries.push(k);
                    entries.push(v);
                }
            }
        }
        ArrayMap {
            entries: Rc::from(entries),
            meta: None,
        }
    }

    /// Number of key/value pairs.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len() / 2
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Linear lookup.
    #[must_use]
    pub fn get(&self, key: &JesterVal) -> Option<&JesterVal> {
        index_of(&self.entries, key).map(|i| &self.entries[i + 1])
    }

    #[must_use]
    pub fn contains_key(&self, key: &JesterVal) -> bool {
        index_of(&self.entries, key).is_some()
    }

    /// The map entry for a key as a `(key, value)` pair.
    #[must_use]
    pub fn entry_at(&self, key: &JesterVal) -> Option<(JesterVal, JesterVal)> {
        index_of(&self.entries, key).map(|i| (self.entries[i].clone(), self.entries[i + 1].clone()))
    }

    /// Associate a key with a value. Returns a new array map, or an
    /// equivalent hash map once the entry count would exceed the threshold.
    #[must_use]
    pub fn assoc(&self, key: JesterVal, val: JesterVal) -> JesterVal {
        if let Some(i) = index_of(&self.entries, &key) {
            let mut entries = self.entries.to_vec();
            entries[i + 1] = val;
            return JesterVal::ArrayMap(ArrayMap {
                entries: Rc::from(entries),
                meta: self.meta.clone(),
            });
        }
        if self.count() >= HASHMAP_THRESHOLD {
            let mut hm = PersistentHashMap::new();
            for (k, v) in self.iter() {
                hm = hm.assoc(k.clone(), v.clone());
            }
            return JesterVal::HashMap(hm.assoc(key, val).with_meta_slot(self.meta.clone()));
        }
        let mut entries = self.entries.to_vec();
        entries.push(key);
        entries.push(val);
        JesterVal::ArrayMap(ArrayMap {
            entries: Rc::from(entries),
            meta: self.meta.clone(),
        })
    }

    /// Remove a key. Returns a new array map; unchanged content when the
    /// key is absent.
    #[must_use]
    pub fn without(&self, key: &JesterVal) -> Self {
        match index_of(&self.entries, key) {
            None => self.clone(),
            Some(i) => {
                let mut entries = self.entries.to_vec();
                entries.drain(i..i + 2);
                ArrayMap {
                    entries: Rc::from(entries),
                    meta: self.meta.clone(),
                }
            }
        }
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&JesterVal, &JesterVal)> {
        self.entries.chunks_exact(2).map(|kv| (&kv[0], &kv[1]))
    }

    /// The flat backing array, shared with all sequence views.
    #[inline]
    #[must_use]
    pub fn flat_entries(&self) -> Rc<[JesterVal]> {
        Rc::clone(&self.entries)
    }

    #[inline]
    #[must_use]
    pub fn meta(&self) -> Option<&Rc<Meta>> {
        self.meta.as_ref()
    }

    /// Same content with different side-car data.
    #[must_use]
    pub fn with_meta_slot(&self, meta: Option<Rc<Meta>>) -> Self {
        ArrayMap {
            entries: Rc::clone(&self.entries),
            meta,
        }
    }
}

impl Default for ArrayMap {
    fn default() -> Self {
        Self::new()
    }
}

fn index_of(entries: &[JesterVal], key: &JesterVal) -> Option<usize> {
    (0..entries.len())
        .step_by(2)
        .find(|&i| entries[i] == *key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword::Keyword;

    fn kw(s: &str) -> JesterVal {
        JesterVal::Keyword(Keyword::new(s))
    }

    fn int(i: i64) -> JesterVal {
        JesterVal::Int(i)
    }

    #[test]
    fn test_assoc_and_get() {
        let m = ArrayMap::new();
        let m = match m.assoc(kw("a"), int(1)) {
            JesterVal::ArrayMap(m) => m,
            other => panic!("expected array map, got {:?}", other),
        };
        assert_eq!(m.count(), 1);
        assert_eq!(m.get(&kw("a")), Some(&int(1)));
        assert_eq!(m.get(&kw("b")), None);
    }

    #[test]
    fn test_assoc_overwrites() {
        let m = ArrayMap::from_flat(vec![kw("a"), int(1)]);
        let m2 = match m.assoc(kw("a"), int(2)) {
            JesterVal::ArrayMap(m) => m,
            other => panic!("expected array map, got {:?}", other),
        };
        assert_eq!(m2.count(), 1);
        assert_eq!(m2.get(&kw("a")), Some(&int(2)));
        // The original is unchanged.
        assert_eq!(m.get(&kw("a")), Some(&int(1)));
    }

    #[test]
    fn test_without() {
        let m = ArrayMap::from_flat(vec![kw("a"), int(1), kw("b"), int(2)]);
        let m2 = m.without(&kw("a"));
        assert_eq!(m2.count(), 1);
        assert!(!m2.contains_key(&kw("a")));
        assert_eq!(m.count(), 2);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let m = ArrayMap::from_flat(vec![kw("b"), int(1), kw("a"), int(2), kw("c"), int(3)]);
        let keys: Vec<String> = m.iter().map(|(k, _)| format!("{:?}", k)).collect();
        assert_eq!(keys.len(), 3);
        assert!(keys[0].contains('b') && keys[1].contains('a') && keys[2].contains('c'));
    }

    #[test]
    fn test_promotes_past_threshold() {
        let mut m = JesterVal::ArrayMap(ArrayMap::new());
        for i in 0..HASHMAP_THRESHOLD as i64 {
            m = match m {
                JesterVal::ArrayMap(am) => am.assoc(int(i), int(i)),
                other => panic!("promoted too early: {:?}", other),
            };
        }
        assert!(matches!(m, JesterVal::ArrayMap(_)));
        // The 17th distinct key promotes.
        let promoted = match m {
            JesterVal::ArrayMap(am) => am.assoc(int(100), int(100)),
            _ => unreachable!(),
        };
        match promoted {
            JesterVal::HashMap(hm) => {
                assert_eq!(hm.count(), HASHMAP_THRESHOLD + 1);
                assert_eq!(hm.get(&int(100)), Some(&int(100)));
                assert_eq!(hm.get(&int(3)), Some(&int(3)));
            }
            other => panic!("expected hash map, got {:?}", other),
        }
    }
}
