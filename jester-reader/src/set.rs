// jester-reader - Persistent set
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Persistent set as a thin wrapper over the persistent maps: each element
//! maps to itself. Small sets sit on an array map and promote to the hash
//! map together with it.

use std::rc::Rc;

use crate::array_map::ArrayMap;
use crate::value::{JesterVal, Meta};

/// A persistent set.
#[derive(Clone, Debug)]
pub struct PersistentSet {
    map: Rc<JesterVal>,
    meta: Option<Rc<Meta>>,
}

fn inner_assoc(map: &JesterVal, key: JesterVal, val: JesterVal) -> JesterVal {
    match map {
        JesterVal::ArrayMap(am) => am.assoc(key, val),
        JesterVal::HashMap(hm) => JesterVal::HashMap(hm.assoc(key, val)),
        _ => unreachable!("set backing is always a map"),
    }
}

impl PersistentSet {
    /// The empty set.
    #[must_use]
    pub fn new() -> Self {
        PersistentSet {
            map: Rc::new(JesterVal::ArrayMap(ArrayMap::new())),
            meta: None,
        }
    }

    /// Build from elements; duplicates collapse.
    #[must_use]
    pub fn from_vec(items: Vec<JesterVal>) -> Self {
        let mut s = PersistentSet::new();
        for item in items {
            s = s.conj(item);
        }
        s
    }

    /// Add an element.
    #[must_use]
    pub fn conj(&self, val: JesterVal) -> Self {
        if self.contains(&val) {
            return self.clone();
        }
        PersistentSet {
            map: Rc::new(inner_assoc(&self.map, val.clone(), val)),
            meta: self.meta.clone(),
        }
    }

    /// Remove an element.
    #[must_use]
    pub fn disj(&self, val: &JesterVal) -> Self {
        let map = match self.map.as_ref() {
            JesterVal::ArrayMap(am) => JesterVal::ArrayMap(am.without(val)),
            JesterVal::HashMap(hm) => JesterVal::HashMap(hm.without(val)),
            _ => unreachable!("set backing is always a map"),
        };
        PersistentSet {
            map: Rc::new(map),
            meta: self.meta.clone(),
        }
    }

    /// Membership test.
    #[must_use]
    pub fn contains(&self, val: &JesterVal) -> bool {
        match self.map.as_ref() {
            JesterVal::ArrayMap(am) => am.contains_key(val),
            JesterVal::HashMap(hm) => hm.contains_key(val),
            _ => unreachable!("set backing is always a map"),
        }
    }

    /// The stored element equal to `val`, if present.
    #[must_use]
    pub fn get(&self, val: &JesterVal) -> Option<JesterVal> {
        match self.map.as_ref() {
            JesterVal::ArrayMap(am) => am.get(val).cloned(),
            JesterVal::HashMap(hm) => hm.get(val).cloned(),
            _ => unreachable!("set backing is always a map"),
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        match self.map.as_ref() {
            JesterVal::ArrayMap(am) => am.count(),
            JesterVal::HashMap(hm) => hm.count(),
            _ => unreachable!("set backing is always a map"),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// The elements in traversal order.
    #[must_use]
    pub fn elements(&self) -> Vec<JesterVal> {
        match self.map.as_ref() {
            JesterVal::ArrayMap(am) => am.iter().map(|(k, _)| k.clone()).collect(),
            JesterVal::HashMap(hm) => hm.iter().map(|(k, _)| k.clone()).collect(),
            _ => unreachable!("set backing is always a map"),
        }
    }

    #[inline]
    #[must_use]
    pub fn meta(&self) -> Option<&Rc<Meta>> {
        self.meta.as_ref()
    }

    /// Same content with different side-car data.
    #[must_use]
    pub fn with_meta_slot(&self, meta: Option<Rc<Meta>>) -> Self {
        PersistentSet {
            map: Rc::clone(&self.map),
            meta,
        }
    }
}

impl Default for PersistentSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> JesterVal {
        JesterVal::Int(i)
    }

    #[test]
    fn test_conj_and_contains() {
        let s = PersistentSet::from_vec(vec![int(1), int(2), int(2)]);
        assert_eq!(s.count(), 2);
        assert!(s.contains(&int(1)));
        assert!(!s.contains(&int(3)));
    }

    #[test]
    fn test_disj() {
        let s = PersistentSet::from_vec(vec![int(1), int(2)]);
        let s2 = s.disj(&int(1));
        assert!(!s2.contains(&int(1)));
        assert!(s.contains(&int(1)));
    }

    #[test]
    fn test_promotes_with_many_elements() {
        let s = PersistentSet::from_vec((0..100).map(int).collect());
        assert_eq!(s.count(), 100);
        for i in 0..100 {
            assert!(s.contains(&int(i)));
        }
    }
}
