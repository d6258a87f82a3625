// jester-core - Ambient runtime
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The ambient runtime: one per evaluating thread.
//!
//! Carries the namespace registry and current namespace, the diagnostic
//! call stack, the position of the expression currently being evaluated,
//! the reader feature set, and the linter state. Everything is
//! interior-mutable; the evaluator is single-threaded and cooperative, so
//! no synchronisation is needed.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use jester_reader::{Keyword, SourceInfo, TraceFrame};

use crate::namespace::{dialect_feature, Dialect, Namespace, NamespaceRegistry};

thread_local! {
    static RUNTIME: Runtime = Runtime::new();
}

/// Run a closure against the ambient runtime.
pub fn with_runtime<R>(f: impl FnOnce(&Runtime) -> R) -> R {
    RUNTIME.with(f)
}

/// A lint diagnostic accumulated during parse-only analysis.
#[derive(Clone, Debug)]
pub struct LintWarning {
    pub message: String,
    pub info: Option<SourceInfo>,
}

impl std::fmt::Display for LintWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.info {
            Some(info) => write!(f, "{}: Parse warning: {}", info, self.message),
            None => write!(f, "Parse warning: {}", self.message),
        }
    }
}

/// The process-wide runtime state.
pub struct Runtime {
    registry: NamespaceRegistry,
    callstack: RefCell<Vec<TraceFrame>>,
    current_info: RefCell<Option<SourceInfo>>,
    features: RefCell<HashSet<Keyword>>,
    linter_mode: Cell<bool>,
    dialect: Cell<Dialect>,
    warnings: RefCell<Vec<LintWarning>>,
}

impl Runtime {
    fn new() -> Self {
        let mut features = HashSet::new();
        features.insert(Keyword::new("joker"));
        Runtime {
            registry: NamespaceRegistry::new(),
            callstack: RefCell::new(Vec::new()),
            current_info: RefCell::new(None),
            features: RefCell::new(features),
            linter_mode: Cell::new(false),
            dialect: Cell::new(Dialect::Joker),
            warnings: RefCell::new(Vec::new()),
        }
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    #[must_use]
    pub fn current_ns(&self) -> Namespace {
        self.registry.current()
    }

    // -- diagnostic call stack ----------------------------------------------

    pub fn push_frame(&self, frame: TraceFrame) {
        self.callstack.borrow_mut().push(frame);
    }

    pub fn pop_frame(&self) {
        self.callstack.borrow_mut().pop();
    }

    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.callstack.borrow().len()
    }

    /// A copy of the active call stack, outermost call first.
    #[must_use]
    pub fn stack_snapshot(&self) -> Vec<TraceFrame> {
        self.callstack.borrow().clone()
    }

    // -- current expression -------------------------------------------------

    /// Record the position of the expression being evaluated, for error
    /// reporting. Returns the previous position.
    pub fn set_current_info(&self, info: Option<SourceInfo>) -> Option<SourceInfo> {
        std::mem::replace(&mut *self.current_info.borrow_mut(), info)
    }

    #[must_use]
    pub fn current_info(&self) -> Option<SourceInfo> {
        self.current_info.borrow().clone()
    }

    // -- features and dialect -----------------------------------------------

    #[must_use]
    pub fn features(&self) -> HashSet<Keyword> {
        self.features.borrow().clone()
    }

    /// Configure linter mode: records the dialect, swaps the feature set to
    /// the dialect's, and starts accumulating warnings.
    pub fn configure_linter(&self, dialect: Dialect) {
        self.linter_mode.set(true);
        self.dialect.set(dialect);
        let mut features = self.features.borrow_mut();
        features.clear();
        features.insert(dialect_feature(dialect));
    }

    #[inline]
    #[must_use]
    pub fn linter_mode(&self) -> bool {
        self.linter_mode.get()
    }

    #[inline]
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect.get()
    }

    // -- lint warnings ------------------------------------------------------

    pub fn add_warning(&self, message: impl Into<String>, info: Option<SourceInfo>) {
        self.warnings.borrow_mut().push(LintWarning {
            message: message.into(),
            info,
        });
    }

    /// Drain accumulated warnings in source order.
    #[must_use]
    pub fn take_warnings(&self) -> Vec<LintWarning> {
        std::mem::take(&mut self.warnings.borrow_mut())
    }
}

/// A frame pushed for the duration of a call; pops on every exit path.
pub struct FrameGuard;

impl FrameGuard {
    #[must_use]
    pub fn push(name: Rc<str>, info: Option<SourceInfo>) -> Self {
        with_runtime(|rt| rt.push_frame(TraceFrame { name, info }));
        FrameGuard
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        with_runtime(|rt| rt.pop_frame());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_guard_pops_on_drop() {
        let before = with_runtime(|rt| rt.stack_depth());
        {
            let _guard = FrameGuard::push(Rc::from("f"), None);
            assert_eq!(with_runtime(|rt| rt.stack_depth()), before + 1);
        }
        assert_eq!(with_runtime(|rt| rt.stack_depth()), before);
    }

    #[test]
    fn test_linter_configuration_swaps_features() {
        with_runtime(|rt| {
            rt.configure_linter(Dialect::Cljs);
            assert!(rt.linter_mode());
            assert!(rt.features().contains(&Keyword::new("cljs")));
            assert!(!rt.features().contains(&Keyword::new("joker")));
        });
    }
}
