// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapters to integrate with other Understory crates.
//!
//! Each adapter is gated behind a feature flag so the core stays independent of
//! any particular host graph.
//!
//! ## Available Adapters
//!
//! - [`attach`] (`attach_adapter` feature): implements
//!   [`AttachmentGraph`](crate::AttachmentGraph) for [`understory_attach::Graph`].

#[cfg(feature = "attach_adapter")]
pub mod attach;
