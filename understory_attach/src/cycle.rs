// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cycle detection policy for edge insertion.

use core::fmt;

use crate::types::ElementId;

/// How [`Graph`](crate::Graph) reacts when an edge would close a cycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CycleHandling {
    /// Panic in debug builds; in release builds the edge is rejected with an error.
    #[default]
    DebugAssert,
    /// Reject the edge with [`CycleError`].
    Error,
    /// Drop the edge silently and report success.
    Ignore,
    /// Skip detection entirely. Path walks over a cyclic graph do not terminate.
    Allow,
}

/// An edge was rejected because it would make `parent` a descendant of `child`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CycleError {
    /// The element that would have gained the parent.
    pub child: ElementId,
    /// The would-be parent. `child` is already one of its ancestors.
    pub parent: ElementId,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attaching {:?} under {:?} would create a cycle",
            self.child, self.parent
        )
    }
}

impl core::error::Error for CycleError {}
