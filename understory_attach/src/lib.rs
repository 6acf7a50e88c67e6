// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_attach --heading-base-level=0

//! Understory Attach: a multi-parent, multi-root attachment graph with change subscriptions.
//!
//! Understory Attach models the containment structure a UI or scene graph builds on top of
//! its widgets: elements that may have more than one parent, may be mounted on more than
//! one root host, and carry a handful of boolean gate flags.
//!
//! - Elements form a DAG through ordered primary parent edges.
//! - Each element may also name a single alternate parent, modelling a secondary,
//!   application-defined hierarchy (for example a logical owner distinct from the
//!   visual container).
//! - Elements are mounted directly on root hosts ([`RootId`]) such as windows or scenes.
//! - Disposal is one-way; [`Graph::remove`] also unlinks and frees the element.
//!
//! ## Observing changes
//!
//! Observers register an [`Interest`] per element under a [`SubscriberId`]. Mutations do not
//! call back into observers; they queue [`Notification`]s that the host drains with
//! [`Graph::take_notifications`]. This keeps every mutation free of reentrancy: an observer
//! reacts only after the mutation that triggered it has finished.
//!
//! Subscribing never queues a notification by itself, and unsubscribing discards anything
//! already queued for that element and subscriber.
//!
//! ## Cycles
//!
//! The graph must stay acyclic along both the primary hierarchy and the alternate-or-primary
//! traversal. [`CycleHandling`] selects what happens when an edge would close a cycle.
//!
//! ## API overview
//!
//! - [`Graph`]: container managing elements, root hosts, and subscriptions.
//! - [`ElementId`]: generational handle of an element.
//! - [`ElementFlags`]: visibility, alternate visibility, enablement, and input enablement.
//! - [`Event`] / [`Notification`]: queued change records.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod cycle;
mod graph;
mod types;

pub use cycle::{CycleError, CycleHandling};
pub use graph::Graph;
pub use types::{ElementFlags, ElementId, Event, Interest, Notification, RootId, SubscriberId};
