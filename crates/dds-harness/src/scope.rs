// crates/dds-harness/src/scope.rs
// ============================================================================
// Module: Cleanup Scope
// Description: Deferred release actions bound to a test's lifetime.
// Purpose: Guarantee teardown on normal exit, error return, and panic.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! A [`Scope`] collects cleanup actions as resources are acquired. Closing
//! the scope runs them in reverse registration order and reports the first
//! failure. A scope that is dropped without being closed (early return or
//! panic unwinding) still runs every action; failures are logged because
//! `Drop` cannot return them.
//! Invariants:
//! - Each action runs exactly once.
//! - A failing action does not prevent later actions from running.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use tracing::warn;

use crate::error::HarnessResult;

/// Deferred cleanup action.
type Action = Box<dyn FnOnce() -> HarnessResult<()> + Send>;

// ============================================================================
// SECTION: Scope
// ============================================================================

/// Owner of deferred cleanup actions.
#[derive(Default)]
pub struct Scope {
    /// Pending actions in registration order.
    actions: Vec<Action>,
}

impl Scope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action to run when the scope ends.
    pub fn defer(&mut self, action: impl FnOnce() -> HarnessResult<()> + Send + 'static) {
        self.actions.push(Box::new(action));
    }

    /// Returns the number of pending actions.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.actions.len()
    }

    /// Runs all pending actions, newest first.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by an action. Remaining actions still run.
    pub fn close(mut self) -> HarnessResult<()> {
        self.unwind()
    }

    /// Drains and runs the pending actions.
    fn unwind(&mut self) -> HarnessResult<()> {
        let mut first_error = None;
        while let Some(action) = self.actions.pop() {
            if let Err(err) = action() {
                if first_error.is_none() {
                    first_error = Some(err);
                } else {
                    warn!(error = %err, "additional cleanup failure");
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        if let Err(err) = self.unwind() {
            warn!(error = %err, "cleanup failed while leaving scope");
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope").field("pending", &self.actions.len()).finish()
    }
}
