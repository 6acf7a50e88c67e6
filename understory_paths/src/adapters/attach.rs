// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapter for Understory Attach.
//!
//! ## Feature
//!
//! Enable with `attach_adapter` (on by default).
//!
//! ## Notes
//!
//! Root attachments are the root hosts an element is mounted on directly.
//! Gate and channel flags are translated bit by bit; see [`gates_of`],
//! [`interest_of`], and the `From<Event>` conversion into [`Channels`].

use alloc::vec::Vec;

use understory_attach::{ElementFlags, ElementId, Event, Graph, Interest, RootId, SubscriberId};

use crate::graph::AttachmentGraph;
use crate::types::{Channels, Gates, Notice};

impl AttachmentGraph for Graph {
    type Element = ElementId;
    type Root = RootId;
    type Subscriber = SubscriberId;

    fn is_disposed(&self, element: ElementId) -> bool {
        Self::is_disposed(self, element)
    }

    fn parents(&self, element: ElementId) -> &[ElementId] {
        self.parents_of(element)
    }

    fn alternate_parent(&self, element: ElementId) -> Option<ElementId> {
        self.alternate_parent_of(element)
    }

    fn gates(&self, element: ElementId) -> Gates {
        self.flags(element).map_or(Gates::empty(), gates_of)
    }

    fn root_attachments(&self, element: ElementId) -> &[RootId] {
        Self::root_attachments(self, element)
    }

    fn new_subscriber(&mut self) -> SubscriberId {
        Self::new_subscriber(self)
    }

    fn subscribe(&mut self, element: ElementId, subscriber: SubscriberId, channels: Channels) {
        Self::subscribe(self, element, subscriber, interest_of(channels));
    }

    fn unsubscribe(&mut self, element: ElementId, subscriber: SubscriberId) {
        Self::unsubscribe(self, element, subscriber);
    }

    fn drain_notices(&mut self, out: &mut Vec<Notice<SubscriberId, ElementId>>) {
        out.extend(self.drain_notifications().map(|n| Notice {
            subscriber: n.subscriber,
            element: n.element,
            channels: n.event.into(),
        }));
    }
}

/// Translate element flags into walk gates.
pub fn gates_of(flags: ElementFlags) -> Gates {
    let mut out = Gates::empty();
    out.set(Gates::VISIBLE, flags.contains(ElementFlags::VISIBLE));
    out.set(
        Gates::ALTERNATE_VISIBLE,
        flags.contains(ElementFlags::ALTERNATE_VISIBLE),
    );
    out.set(Gates::ENABLED, flags.contains(ElementFlags::ENABLED));
    out.set(
        Gates::INPUT_ENABLED,
        flags.contains(ElementFlags::INPUT_ENABLED),
    );
    out
}

/// Translate tracker channels into graph interest.
pub fn interest_of(channels: Channels) -> Interest {
    const TABLE: [(Channels, Interest); 9] = [
        (Channels::PARENT_ADDED, Interest::PARENT_ADDED),
        (Channels::PARENT_REMOVED, Interest::PARENT_REMOVED),
        (Channels::ROOTS_CHANGED, Interest::ROOTS_CHANGED),
        (Channels::DISPOSED, Interest::DISPOSED),
        (Channels::VISIBLE, Interest::VISIBLE),
        (Channels::ALTERNATE_VISIBLE, Interest::ALTERNATE_VISIBLE),
        (Channels::ENABLED, Interest::ENABLED),
        (Channels::INPUT_ENABLED, Interest::INPUT_ENABLED),
        (Channels::ALTERNATE_PARENT, Interest::ALTERNATE_PARENT),
    ];
    TABLE
        .iter()
        .filter(|(c, _)| channels.contains(*c))
        .fold(Interest::empty(), |acc, (_, i)| acc | *i)
}

impl From<Event> for Channels {
    fn from(event: Event) -> Self {
        match event {
            Event::ParentAdded(_) => Self::PARENT_ADDED,
            Event::ParentRemoved(_) => Self::PARENT_REMOVED,
            Event::RootsChanged => Self::ROOTS_CHANGED,
            Event::Disposed => Self::DISPOSED,
            Event::FlagChanged(flag) => Self::of_gates(gates_of(flag)),
            Event::AlternateParentChanged => Self::ALTERNATE_PARENT,
        }
    }
}
