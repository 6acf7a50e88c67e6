// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration and notification vocabulary shared by the walker and the tracker.

use core::fmt;

bitflags::bitflags! {
    /// Boolean element attributes a walk can be gated on.
    ///
    /// In a [`TrackerConfig`], a set bit means the gate is enforced: an element whose
    /// attribute is false ends the walk upward at that element.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Gates: u8 {
        /// Visible in the primary hierarchy.
        const VISIBLE           = 0b0000_0001;
        /// Visible in the alternate hierarchy.
        const ALTERNATE_VISIBLE = 0b0000_0010;
        /// Enabled.
        const ENABLED           = 0b0000_0100;
        /// Accepts input.
        const INPUT_ENABLED     = 0b0000_1000;
    }
}

bitflags::bitflags! {
    /// Per-element change channels a tracker subscribes to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Channels: u16 {
        /// A parent edge was added.
        const PARENT_ADDED      = 1 << 0;
        /// A parent edge was removed.
        const PARENT_REMOVED    = 1 << 1;
        /// The element's root attachments changed.
        const ROOTS_CHANGED     = 1 << 2;
        /// The element was disposed.
        const DISPOSED          = 1 << 3;
        /// [`Gates::VISIBLE`] flipped.
        const VISIBLE           = 1 << 4;
        /// [`Gates::ALTERNATE_VISIBLE`] flipped.
        const ALTERNATE_VISIBLE = 1 << 5;
        /// [`Gates::ENABLED`] flipped.
        const ENABLED           = 1 << 6;
        /// [`Gates::INPUT_ENABLED`] flipped.
        const INPUT_ENABLED     = 1 << 7;
        /// The alternate parent changed.
        const ALTERNATE_PARENT  = 1 << 8;

        /// Channels every tracked element is subscribed to, whatever the configuration.
        const STRUCTURE = Self::PARENT_ADDED.bits()
            | Self::PARENT_REMOVED.bits()
            | Self::ROOTS_CHANGED.bits()
            | Self::DISPOSED.bits();
    }
}

impl Channels {
    /// The change channels observing the given gates.
    pub fn of_gates(gates: Gates) -> Self {
        let mut out = Self::empty();
        out.set(Self::VISIBLE, gates.contains(Gates::VISIBLE));
        out.set(
            Self::ALTERNATE_VISIBLE,
            gates.contains(Gates::ALTERNATE_VISIBLE),
        );
        out.set(Self::ENABLED, gates.contains(Gates::ENABLED));
        out.set(Self::INPUT_ENABLED, gates.contains(Gates::INPUT_ENABLED));
        out
    }
}

/// Decides whether the walk head closes a path, based on its root attachments.
#[derive(Clone, Copy)]
pub enum RootPredicate<R> {
    /// The head is attached to at least one root.
    Any,
    /// The head is attached to this exact root.
    Specific(R),
    /// An application-supplied test over the head's root attachments.
    Custom(fn(&[R]) -> bool),
}

impl<R: PartialEq> RootPredicate<R> {
    /// Evaluate the predicate against one element's root attachments.
    pub fn matches(&self, roots: &[R]) -> bool {
        match self {
            Self::Any => !roots.is_empty(),
            Self::Specific(root) => roots.contains(root),
            Self::Custom(f) => f(roots),
        }
    }
}

impl<R> Default for RootPredicate<R> {
    fn default() -> Self {
        Self::Any
    }
}

impl<R: fmt::Debug> fmt::Debug for RootPredicate<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::Specific(root) => f.debug_tuple("Specific").field(root).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Construction-time configuration of a path tracker.
///
/// ```
/// use understory_paths::{Channels, Gates, RootPredicate, TrackerConfig};
///
/// let config = TrackerConfig::<u32>::new()
///     .with_roots(RootPredicate::Specific(7))
///     .enforce_visible()
///     .enforce_enabled();
/// assert_eq!(config.enforce, Gates::VISIBLE | Gates::ENABLED);
/// assert!(config.channels().contains(Channels::STRUCTURE | Channels::VISIBLE));
/// assert!(!config.channels().contains(Channels::ALTERNATE_PARENT));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TrackerConfig<R> {
    /// Which heads close a path.
    pub roots: RootPredicate<R>,
    /// Walk the alternate parent instead of the primary parents when one is set.
    pub alternate: bool,
    /// Gates that must hold on every element from the target up to a path's root.
    pub enforce: Gates,
}

impl<R> TrackerConfig<R> {
    /// Any root, primary parents, no gates.
    pub fn new() -> Self {
        Self {
            roots: RootPredicate::Any,
            alternate: false,
            enforce: Gates::empty(),
        }
    }

    /// Replace the root predicate.
    pub fn with_roots(mut self, roots: RootPredicate<R>) -> Self {
        self.roots = roots;
        self
    }

    /// Walk alternate parents where present.
    pub fn alternate(mut self) -> Self {
        self.alternate = true;
        self
    }

    /// Enforce [`Gates::VISIBLE`].
    pub fn enforce_visible(mut self) -> Self {
        self.enforce |= Gates::VISIBLE;
        self
    }

    /// Enforce [`Gates::ALTERNATE_VISIBLE`].
    pub fn enforce_alternate_visible(mut self) -> Self {
        self.enforce |= Gates::ALTERNATE_VISIBLE;
        self
    }

    /// Enforce [`Gates::ENABLED`].
    pub fn enforce_enabled(mut self) -> Self {
        self.enforce |= Gates::ENABLED;
        self
    }

    /// Enforce [`Gates::INPUT_ENABLED`].
    pub fn enforce_input_enabled(mut self) -> Self {
        self.enforce |= Gates::INPUT_ENABLED;
        self
    }

    /// The subscription bundle attached to every tracked element.
    pub fn channels(&self) -> Channels {
        let mut out = Channels::STRUCTURE | Channels::of_gates(self.enforce);
        out.set(Channels::ALTERNATE_PARENT, self.alternate);
        out
    }
}

impl<R> Default for TrackerConfig<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// One change notification addressed to one subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Notice<S, K> {
    /// The subscriber the host queued it for.
    pub subscriber: S,
    /// The element that changed.
    pub element: K,
    /// What changed.
    pub channels: Channels,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_predicates() {
        assert!(!RootPredicate::<u32>::Any.matches(&[]));
        assert!(RootPredicate::<u32>::Any.matches(&[3]));
        assert!(RootPredicate::Specific(3).matches(&[1, 3]));
        assert!(!RootPredicate::Specific(2).matches(&[1, 3]));
        let two_roots: RootPredicate<u32> = RootPredicate::Custom(|roots| roots.len() == 2);
        assert!(two_roots.matches(&[1, 3]));
        assert!(!two_roots.matches(&[1]));
    }

    #[test]
    fn channels_follow_configuration() {
        let plain = TrackerConfig::<u32>::new();
        assert_eq!(plain.channels(), Channels::STRUCTURE);

        let full = TrackerConfig::<u32>::new()
            .alternate()
            .enforce_visible()
            .enforce_alternate_visible()
            .enforce_enabled()
            .enforce_input_enabled();
        assert_eq!(full.enforce, Gates::all());
        assert_eq!(full.channels(), Channels::all());
    }
}
