// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the attachment graph: identifiers, flags, and change events.

/// Identifier for an element in the graph (generational).
///
/// A stale identifier (its slot was freed by [`Graph::remove`](crate::Graph::remove))
/// reads as disposed and is ignored by every mutation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u32, pub(crate) u32);

impl ElementId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Identifier for a root host (a window, scene, or stage) that elements are mounted on.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct RootId(pub(crate) u32);

/// Key of one observer registered with the graph.
///
/// Allocated by [`Graph::new_subscriber`](crate::Graph::new_subscriber); never reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub(crate) u32);

bitflags::bitflags! {
    /// Per-element boolean attributes that path consumers may gate on.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// Element is visible in the primary hierarchy.
        const VISIBLE           = 0b0000_0001;
        /// Element is visible in the alternate hierarchy.
        const ALTERNATE_VISIBLE = 0b0000_0010;
        /// Element is enabled.
        const ENABLED           = 0b0000_0100;
        /// Element accepts input.
        const INPUT_ENABLED     = 0b0000_1000;
    }
}

impl Default for ElementFlags {
    fn default() -> Self {
        Self::all()
    }
}

bitflags::bitflags! {
    /// The set of change channels a subscriber listens to on one element.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Interest: u16 {
        /// A parent edge was added.
        const PARENT_ADDED      = 1 << 0;
        /// A parent edge was removed.
        const PARENT_REMOVED    = 1 << 1;
        /// The set of root hosts the element is mounted on changed.
        const ROOTS_CHANGED     = 1 << 2;
        /// The element was disposed.
        const DISPOSED          = 1 << 3;
        /// [`ElementFlags::VISIBLE`] flipped.
        const VISIBLE           = 1 << 4;
        /// [`ElementFlags::ALTERNATE_VISIBLE`] flipped.
        const ALTERNATE_VISIBLE = 1 << 5;
        /// [`ElementFlags::ENABLED`] flipped.
        const ENABLED           = 1 << 6;
        /// [`ElementFlags::INPUT_ENABLED`] flipped.
        const INPUT_ENABLED     = 1 << 7;
        /// The alternate parent was set, replaced, or cleared.
        const ALTERNATE_PARENT  = 1 << 8;
    }
}

impl Interest {
    /// The interest bit that observes changes of a single flag.
    ///
    /// Returns an empty set unless `flag` is exactly one [`ElementFlags`] bit.
    pub fn of_flag(flag: ElementFlags) -> Self {
        if flag == ElementFlags::VISIBLE {
            Self::VISIBLE
        } else if flag == ElementFlags::ALTERNATE_VISIBLE {
            Self::ALTERNATE_VISIBLE
        } else if flag == ElementFlags::ENABLED {
            Self::ENABLED
        } else if flag == ElementFlags::INPUT_ENABLED {
            Self::INPUT_ENABLED
        } else {
            Self::empty()
        }
    }
}

/// A change observed on one element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The given element became a parent of the observed element.
    ParentAdded(ElementId),
    /// The given element stopped being a parent of the observed element.
    ParentRemoved(ElementId),
    /// The observed element was mounted on or unmounted from a root host.
    RootsChanged,
    /// The observed element was disposed. Delivered once; the element drops
    /// all of its subscriptions afterwards.
    Disposed,
    /// A single flag changed; the payload is that flag.
    FlagChanged(ElementFlags),
    /// The alternate parent changed.
    AlternateParentChanged,
}

impl Event {
    /// The interest bit a subscriber needs to receive this event.
    pub fn interest(&self) -> Interest {
        match self {
            Self::ParentAdded(_) => Interest::PARENT_ADDED,
            Self::ParentRemoved(_) => Interest::PARENT_REMOVED,
            Self::RootsChanged => Interest::ROOTS_CHANGED,
            Self::Disposed => Interest::DISPOSED,
            Self::FlagChanged(flag) => Interest::of_flag(*flag),
            Self::AlternateParentChanged => Interest::ALTERNATE_PARENT,
        }
    }
}

/// A queued delivery of an [`Event`] to one subscriber.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Who should receive it.
    pub subscriber: SubscriberId,
    /// The element the event happened on.
    pub element: ElementId,
    /// What happened.
    pub event: Event,
}
