//! Suspension of size/move feedback during bulk geometry changes
//!
//! Applying a frame to the native window makes it report size and move
//! events straight back. While a [`SuspendScope`] is alive those reports
//! are dropped, so no intermediate state reaches the compositor.

use std::cell::Cell;
use std::rc::Rc;

/// Shared single-thread flag; clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct NotificationGate {
    depth: Rc<Cell<u32>>,
}

impl NotificationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspend notifications until the returned scope is dropped.
    ///
    /// Scopes nest.
    pub fn suspend(&self) -> SuspendScope {
        self.depth.set(self.depth.get() + 1);
        SuspendScope {
            depth: Rc::clone(&self.depth),
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.depth.get() > 0
    }
}

/// Released on drop, including on early return.
#[derive(Debug)]
#[must_use = "notifications resume as soon as the scope is dropped"]
pub struct SuspendScope {
    depth: Rc<Cell<u32>>,
}

impl Drop for SuspendScope {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
