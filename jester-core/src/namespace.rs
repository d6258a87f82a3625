// jester-core - Namespaces
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Namespaces: named tables of vars, plus referrals and aliases to other
//! namespaces.
//!
//! Resolution order for an unqualified symbol is local vars, then refers,
//! then the core namespace (the registry adds the last step). `def` interns
//! into the current namespace.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use jester_reader::{JesterVal, JesterVar, Keyword, Symbol};

/// A namespace holding var bindings.
#[derive(Clone)]
pub struct Namespace {
    inner: Rc<RefCell<NsInner>>,
}

struct NsInner {
    name: Symbol,
    vars: HashMap<String, JesterVar>,
    refers: HashMap<String, JesterVar>,
    aliases: HashMap<String, Namespace>,
}

impl Namespace {
    /// Create a namespace with the given name.
    pub fn new(name: &str) -> Self {
        Namespace {
            inner: Rc::new(RefCell::new(NsInner {
                name: Symbol::new(name),
                vars: HashMap::new(),
                refers: HashMap::new(),
                aliases: HashMap::new(),
            })),
        }
    }

    /// The namespace name as a symbol.
    #[inline]
    #[must_use]
    pub fn name(&self) -> Symbol {
        self.inner.borrow().name.clone()
    }

    /// Intern a var, creating an unbound one on first use. Idempotent.
    pub fn intern(&self, name: &str) -> JesterVar {
        let mut inner = self.inner.borrow_mut();
        if let Some(var) = inner.vars.get(name) {
            return var.clone();
        }
        let ns_name = inner.name.name().to_string();
        let var = JesterVar::new(Some(&ns_name), name);
        inner.vars.insert(name.to_string(), var.clone());
        var
    }

    /// Intern a var and set its root value.
    pub fn intern_with_value(&self, name: &str, value: JesterVal) -> JesterVar {
        let var = self.intern(name);
        var.set_root(value);
        var
    }

    /// Find a var owned by this namespace; refers and aliases excluded.
    #[must_use]
    pub fn find_var(&self, name: &str) -> Option<JesterVar> {
        self.inner.borrow().vars.get(name).cloned()
    }

    /// Resolve an unqualified symbol against local vars, then refers.
    /// Qualified symbols resolve through this namespace's aliases.
    #[must_use]
    pub fn resolve(&self, sym: &Symbol) -> Option<JesterVar> {
        let inner = self.inner.borrow();
        if let Some(ns_name) = sym.namespace() {
            if let Some(aliased) = inner.aliases.get(ns_name) {
                return aliased.find_var(sym.name());
            }
            return None;
        }
        if let Some(var) = inner.vars.get(sym.name()) {
            return Some(var.clone());
        }
        inner.refers.get(sym.name()).cloned()
    }

    /// Map a name to a var from another namespace.
    pub fn refer(&self, name: &str, var: JesterVar) {
        self.inner
            .borrow_mut()
            .refers
            .insert(name.to_string(), var);
    }

    /// Copy every public mapping of `other` into this namespace's refers.
    pub fn refer_all(&self, other: &Namespace) {
        let publics = other.publics();
        let mut inner = self.inner.borrow_mut();
        for (name, var) in publics {
            inner.refers.insert(name, var);
        }
    }

    /// Alias another namespace for qualified lookup.
    pub fn add_alias(&self, alias: &str, ns: Namespace) {
        self.inner
            .borrow_mut()
            .aliases
            .insert(alias.to_string(), ns);
    }

    /// All vars owned by this namespace.
    #[must_use]
    pub fn vars(&self) -> HashMap<String, JesterVar> {
        self.inner.borrow().vars.clone()
    }

    /// Vars not marked private.
    #[must_use]
    pub fn publics(&self) -> HashMap<String, JesterVar> {
        self.inner
            .borrow()
            .vars
            .iter()
            .filter(|(_, var)| !var.is_private())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl std::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#<Namespace {}>", self.name())
    }
}

/// The global table of namespaces plus the current-namespace pointer.
#[derive(Clone)]
pub struct NamespaceRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

struct RegistryInner {
    namespaces: HashMap<String, Namespace>,
    current: Namespace,
}

impl NamespaceRegistry {
    /// The core namespace every other namespace sees.
    pub const CORE_NS: &'static str = "jester.core";

    /// A registry holding the core namespace and `user`, with `user`
    /// current.
    #[must_use]
    pub fn new() -> Self {
        let core = Namespace::new(Self::CORE_NS);
        let user = Namespace::new("user");
        let mut namespaces = HashMap::new();
        namespaces.insert(Self::CORE_NS.to_string(), core);
        namespaces.insert("user".to_string(), user.clone());
        NamespaceRegistry {
            inner: Rc::new(RefCell::new(RegistryInner {
                namespaces,
                current: user,
            })),
        }
    }

    #[must_use]
    pub fn core_ns(&self) -> Namespace {
        self.find(Self::CORE_NS)
            .expect("core namespace created at registry construction")
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<Namespace> {
        self.inner.borrow().namespaces.get(name).cloned()
    }

    /// Find a namespace, creating it (with core referred) on first use.
    pub fn find_or_create(&self, name: &str) -> Namespace {
        if let Some(ns) = self.find(name) {
            return ns;
        }
        let ns = Namespace::new(name);
        ns.refer_all(&self.core_ns());
        self.inner
            .borrow_mut()
            .namespaces
            .insert(name.to_string(), ns.clone());
        ns
    }

    /// The current namespace.
    #[must_use]
    pub fn current(&self) -> Namespace {
        self.inner.borrow().current.clone()
    }

    /// Switch the current namespace, creating it if needed.
    pub fn set_current(&self, name: &str) -> Namespace {
        let ns = self.find_or_create(name);
        self.inner.borrow_mut().current = ns.clone();
        ns
    }

    /// Resolve a symbol: qualified through its namespace (alias first,
    /// then by full name), unqualified through the current namespace and
    /// then the core namespace.
    #[must_use]
    pub fn resolve(&self, sym: &Symbol) -> Option<JesterVar> {
        let current = self.current();
        if let Some(ns_name) = sym.namespace() {
            if let Some(var) = current.resolve(sym) {
                return Some(var);
            }
            return self.find(ns_name).and_then(|ns| ns.find_var(sym.name()));
        }
        if let Some(var) = current.resolve(sym) {
            return Some(var);
        }
        let core = self.core_ns();
        core.find_var(sym.name()).filter(|v| !v.is_private())
    }

    /// Every registered namespace.
    #[must_use]
    pub fn all(&self) -> Vec<Namespace> {
        self.inner.borrow().namespaces.values().cloned().collect()
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Feature keyword for a reader dialect.
#[must_use]
pub fn dialect_feature(dialect: Dialect) -> Keyword {
    match dialect {
        Dialect::Edn | Dialect::Clj => Keyword::new("clj"),
        Dialect::Cljs => Keyword::new("cljs"),
        Dialect::Joker => Keyword::new("joker"),
    }
}

/// Source dialect for reading and linting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    Clj,
    Cljs,
    Joker,
    Edn,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_idempotent() {
        let ns = Namespace::new("t");
        let a = ns.intern("x");
        let b = ns.intern("x");
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolution_order() {
        let registry = NamespaceRegistry::new();
        let core = registry.core_ns();
        core.intern_with_value("shared", JesterVal::Int(1));

        // Core fallback.
        let sym = Symbol::new("shared");
        assert!(registry.resolve(&sym).is_some());

        // A local var shadows the core fallback.
        let user = registry.current();
        user.intern_with_value("shared", JesterVal::Int(2));
        let resolved = registry.resolve(&sym).unwrap();
        assert_eq!(resolved.deref(), Some(JesterVal::Int(2)));
    }

    #[test]
    fn test_refer_all_copies_publics_only() {
        let a = Namespace::new("a");
        a.intern_with_value("pub", JesterVal::Int(1));
        let private = a.intern_with_value("priv", JesterVal::Int(2));
        private.set_private(true);

        let b = Namespace::new("b");
        b.refer_all(&a);
        assert!(b.resolve(&Symbol::new("pub")).is_some());
        assert!(b.resolve(&Symbol::new("priv")).is_none());
    }

    #[test]
    fn test_qualified_resolution() {
        let registry = NamespaceRegistry::new();
        let other = registry.find_or_create("other");
        other.intern_with_value("x", JesterVal::Int(3));
        let resolved = registry.resolve(&Symbol::with_namespace("other", "x")).unwrap();
        assert_eq!(resolved.deref(), Some(JesterVal::Int(3)));
    }
}
