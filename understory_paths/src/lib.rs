// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_paths --heading-base-level=0

//! Understory Paths: reactive root-to-target path tracking for attachment graphs.
//!
//! ## Overview
//!
//! In a graph where an element can have several parents and be attached to several roots,
//! "where is this element shown" is a set of paths rather than a single chain. This crate
//! computes every root-to-target path of one target element and keeps that set current as
//! the graph changes.
//!
//! It does not own the graph. A host exposes its elements through the [`AttachmentGraph`]
//! trait: ordered parents, an optional alternate parent, gate attributes, root attachments,
//! and keyed subscriptions whose notices the host queues and hands out on request.
//!
//! ## Walking
//!
//! [`PathWalker`] runs a depth-first walk upward from the target.
//!
//! - Parents are followed in declaration order; paths come out in that order.
//! - A head whose root attachments satisfy the [`RootPredicate`] closes a path, and the walk
//!   still continues above it.
//! - Disposed elements are skipped; elements failing an enforced [`Gates`] bit are recorded
//!   but not expanded.
//! - With [`TrackerConfig::alternate`], an element's alternate parent replaces its primary
//!   parents.
//!
//! ## Tracking
//!
//! [`PathTracker`] owns one walker and one subscriber key. After every recompute its
//! subscriptions cover exactly the elements the walk visited, with the bundle from
//! [`TrackerConfig::channels`]. The exposed [`PathList`] is only replaced when the paths
//! actually changed, so consumers can compare by pointer or by [`PathTracker::revision`].
//!
//! [`TrackerSet`] groups trackers over one host, drains the host's notice queue, and
//! recomputes each affected tracker once per drained batch.
//!
//! ## Example
//!
//! ```rust
//! use understory_attach::Graph;
//! use understory_paths::{PathTracker, TrackerConfig};
//!
//! let mut graph = Graph::new();
//! let window = graph.create_root();
//! let r = graph.insert();
//! let a = graph.insert();
//! let b = graph.insert();
//! let t = graph.insert();
//! graph.mount(r, window);
//! graph.add_parent(a, r).unwrap();
//! graph.add_parent(b, r).unwrap();
//! graph.add_parent(t, a).unwrap();
//! graph.add_parent(t, b).unwrap();
//!
//! let tracker = PathTracker::new(&mut graph, t, TrackerConfig::new());
//! let paths: Vec<_> = tracker.paths().iter().map(|p| p.as_slice().to_vec()).collect();
//! assert_eq!(paths, vec![vec![r, a, t], vec![r, b, t]]);
//! ```
//!
//! ## Adapters
//!
//! The [`adapters`] module provides integration with other Understory crates:
//!
//! - **Attach Adapter** (`attach_adapter` feature): implements [`AttachmentGraph`] for
//!   `understory_attach::Graph`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod adapters;

mod graph;
mod path;
mod set;
mod tracker;
mod types;
mod walker;

pub use graph::AttachmentGraph;
pub use path::Path;
pub use set::TrackerSet;
pub use tracker::{PathList, PathTracker};
pub use types::{Channels, Gates, Notice, RootPredicate, TrackerConfig};
pub use walker::PathWalker;
