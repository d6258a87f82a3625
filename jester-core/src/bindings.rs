// jester-core - Local binding frames
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The local environment: an immutable chain of fixed-size frames.
//!
//! Each `let`, `loop` or function call prepends one frame; a binding
//! reference is a `(depth, index)` pair, depth 0 being the innermost
//! frame. Slots are interior-mutable so `let` can fill them sequentially
//! and `recur` can rebind its target frame in place without growing the
//! host stack.

use std::cell::RefCell;
use std::rc::Rc;

use jester_reader::JesterVal;

/// A chain of binding frames. Cloning shares the chain.
#[derive(Clone, Debug, Default)]
pub struct LocalEnv {
    top: Option<Rc<Frame>>,
}

#[derive(Debug)]
struct Frame {
    slots: RefCell<Vec<JesterVal>>,
    parent: Option<Rc<Frame>>,
}

impl LocalEnv {
    /// The empty environment.
    #[must_use]
    pub fn new() -> Self {
        LocalEnv { top: None }
    }

    /// A new environment with one more frame on top.
    #[must_use]
    pub fn with_frame(&self, values: Vec<JesterVal>) -> Self {
        LocalEnv {
            top: Some(Rc::new(Frame {
                slots: RefCell::new(values),
                parent: self.top.clone(),
            })),
        }
    }

    /// The value at `(depth, index)`. `None` indicates an analyzer bug.
    #[must_use]
    pub fn lookup(&self, depth: usize, index: usize) -> Option<JesterVal> {
        let mut frame = self.top.as_deref()?;
        for _ in 0..depth {
            frame = frame.parent.as_deref()?;
        }
        frame.slots.borrow().get(index).cloned()
    }

    /// Overwrite one slot of the innermost frame.
    pub fn set_slot(&self, index: usize, value: JesterVal) {
        if let Some(frame) = self.top.as_deref() {
            frame.slots.borrow_mut()[index] = value;
        }
    }

    /// Replace every slot of the innermost frame: the `recur` rebind.
    pub fn rebind_top(&self, values: Vec<JesterVal>) {
        if let Some(frame) = self.top.as_deref() {
            *frame.slots.borrow_mut() = values;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> JesterVal {
        JesterVal::Int(i)
    }

    #[test]
    fn test_lookup_by_depth_and_index() {
        let env = LocalEnv::new()
            .with_frame(vec![int(1), int(2)])
            .with_frame(vec![int(10)]);
        assert_eq!(env.lookup(0, 0), Some(int(10)));
        assert_eq!(env.lookup(1, 0), Some(int(1)));
        assert_eq!(env.lookup(1, 1), Some(int(2)));
        assert_eq!(env.lookup(2, 0), None);
    }

    #[test]
    fn test_chain_is_shared_not_copied() {
        let base = LocalEnv::new().with_frame(vec![int(1)]);
        let a = base.with_frame(vec![int(2)]);
        let b = base.with_frame(vec![int(3)]);
        assert_eq!(a.lookup(1, 0), Some(int(1)));
        assert_eq!(b.lookup(1, 0), Some(int(1)));
        assert_eq!(a.lookup(0, 0), Some(int(2)));
        assert_eq!(b.lookup(0, 0), Some(int(3)));
    }

    #[test]
    fn test_rebind_top_in_place() {
        let base = LocalEnv::new().with_frame(vec![int(1)]);
        let inner = base.with_frame(vec![int(2)]);
        // An alias sees the rebinding: the frame mutates in place.
        let alias = inner.clone();
        inner.rebind_top(vec![int(99)]);
        assert_eq!(alias.lookup(0, 0), Some(int(99)));
        assert_eq!(base.lookup(0, 0), Some(int(1)));
    }

    #[test]
    fn test_set_slot() {
        let env = LocalEnv::new().with_frame(vec![JesterVal::Nil, JesterVal::Nil]);
        env.set_slot(0, int(5));
        env.set_slot(1, int(6));
        assert_eq!(env.lookup(0, 0), Some(int(5)));
        assert_eq!(env.lookup(0, 1), Some(int(6)));
    }
}
