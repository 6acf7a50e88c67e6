// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host graph boundary.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use crate::types::{Channels, Gates, Notice};

/// Read and subscription access to an external attachment graph.
///
/// The host owns every element and all edges; trackers only read through this
/// trait and register keyed subscriptions, which they are responsible for
/// removing again.
///
/// Implementations must uphold:
/// - `parents` keeps a stable declaration order; it determines path order.
/// - `is_disposed` is one-way and also reports true for dangling handles.
/// - `subscribe` and `unsubscribe` are idempotent per `(element, subscriber)`.
/// - `subscribe` never queues a notice by itself; only later changes do.
/// - After `unsubscribe`, no notice for that pair is handed out by
///   `drain_notices`, including ones queued earlier.
pub trait AttachmentGraph {
    /// Handle of an element.
    type Element: Copy + Eq + Hash + Debug;
    /// Handle of a root an element can be attached to.
    type Root: Copy + Eq + Debug;
    /// Key of one observer.
    type Subscriber: Copy + Eq + Hash + Debug;

    /// Whether the element is disposed (or dangling).
    fn is_disposed(&self, element: Self::Element) -> bool;

    /// Ordered primary parents.
    fn parents(&self, element: Self::Element) -> &[Self::Element];

    /// The single alternate parent, if any.
    fn alternate_parent(&self, element: Self::Element) -> Option<Self::Element>;

    /// The gate attributes that currently hold on the element.
    fn gates(&self, element: Self::Element) -> Gates;

    /// Roots the element is attached to.
    fn root_attachments(&self, element: Self::Element) -> &[Self::Root];

    /// Allocate a fresh subscriber key.
    fn new_subscriber(&mut self) -> Self::Subscriber;

    /// Register or replace the subscription of `subscriber` on `element`.
    fn subscribe(
        &mut self,
        element: Self::Element,
        subscriber: Self::Subscriber,
        channels: Channels,
    );

    /// Remove the subscription of `subscriber` on `element`, if any.
    fn unsubscribe(&mut self, element: Self::Element, subscriber: Self::Subscriber);

    /// Move queued notices, oldest first, into `out`.
    fn drain_notices(&mut self, out: &mut Vec<Notice<Self::Subscriber, Self::Element>>);
}
