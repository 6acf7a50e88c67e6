// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener synchronizer: keeps one subscription per visited element and a
//! change-minimal exposed path list.

use alloc::rc::Rc;
use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::graph::AttachmentGraph;
use crate::path::Path;
use crate::types::{Channels, TrackerConfig};
use crate::walker::PathWalker;

/// Shared, immutable list of paths exposed by a [`PathTracker`].
pub type PathList<K> = Rc<[Path<K>]>;

/// Tracks every root-to-target path of one target element.
///
/// ## Lifecycle
///
/// - [`PathTracker::new`] allocates a subscriber key from the host and walks once.
/// - Each delivered notification goes through [`PathTracker::notify`], which
///   re-walks when the notification concerns a tracked element and a channel of
///   the subscription bundle.
/// - [`PathTracker::dispose`] removes every subscription and releases the list.
///   Any other use of the tracker afterwards panics, except
///   [`PathTracker::is_disposed`]; a second `dispose` is a no-op.
///
/// Dropping a tracker without disposing it leaves its subscriptions registered
/// with the host.
///
/// ## Exposed value
///
/// [`PathTracker::paths`] returns a shared [`PathList`]. A recompute that finds
/// the same paths in the same order keeps the previous list allocation, so
/// consumers can use [`Rc::ptr_eq`] (or [`PathTracker::revision`]) to skip work.
///
/// ## Subscriptions
///
/// After every recompute the elements holding a subscription are exactly the
/// elements the walk visited. Disposed elements are never visited, so they are
/// dropped from the set. The subscription bundle is
/// [`TrackerConfig::channels`].
///
/// ## Reentrancy
///
/// A recompute borrows the host graph for the whole walk, so the graph cannot
/// be mutated, and no nested recompute can start, until it returns.
///
/// ## Example
///
/// ```rust
/// use understory_attach::{ElementFlags, Graph};
/// use understory_paths::{PathTracker, TrackerConfig};
///
/// let mut graph = Graph::new();
/// let window = graph.create_root();
/// let r = graph.insert();
/// let a = graph.insert();
/// let t = graph.insert();
/// graph.mount(r, window);
/// graph.add_parent(a, r).unwrap();
/// graph.add_parent(t, a).unwrap();
///
/// let mut tracker = PathTracker::new(&mut graph, t, TrackerConfig::new().enforce_visible());
/// assert_eq!(tracker.paths()[0].as_slice(), &[r, a, t]);
///
/// graph.set_flag(a, ElementFlags::VISIBLE, false);
/// for n in graph.take_notifications() {
///     tracker.notify(&mut graph, n.element, n.event.into());
/// }
/// assert!(tracker.paths().is_empty());
///
/// tracker.dispose(&mut graph);
/// ```
pub struct PathTracker<G: AttachmentGraph + ?Sized> {
    subscriber: G::Subscriber,
    target: G::Element,
    config: TrackerConfig<G::Root>,
    channels: Channels,
    walker: PathWalker<G::Element>,
    tracked: HashSet<G::Element>,
    paths: PathList<G::Element>,
    revision: u64,
    disposed: bool,
}

impl<G: AttachmentGraph + ?Sized> core::fmt::Debug for PathTracker<G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PathTracker")
            .field("subscriber", &self.subscriber)
            .field("target", &self.target)
            .field("config", &self.config)
            .field("tracked", &self.tracked.len())
            .field("paths", &self.paths)
            .field("revision", &self.revision)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl<G: AttachmentGraph + ?Sized> PathTracker<G> {
    /// Create a tracker for `target` and run the initial walk.
    pub fn new(graph: &mut G, target: G::Element, config: TrackerConfig<G::Root>) -> Self {
        let subscriber = graph.new_subscriber();
        let mut tracker = Self {
            subscriber,
            target,
            channels: config.channels(),
            config,
            walker: PathWalker::new(),
            tracked: HashSet::new(),
            paths: Rc::from(Vec::new()),
            revision: 0,
            disposed: false,
        };
        tracker.recompute(graph);
        tracker
    }

    /// Re-walk the graph, resynchronize subscriptions, and update the exposed list.
    ///
    /// Returns true if the exposed list was replaced.
    pub fn recompute(&mut self, graph: &mut G) -> bool {
        self.assert_live();
        self.walker.walk(&*graph, self.target, &self.config);

        let mut attached = 0_usize;
        for &element in self.walker.visited() {
            if self.tracked.insert(element) {
                attach(graph, self.subscriber, element, self.channels);
                attached += 1;
            }
        }
        let mut detached = 0_usize;
        let visited = self.walker.visited();
        let subscriber = self.subscriber;
        self.tracked.retain(|&element| {
            let keep = visited.contains(&element);
            if !keep {
                detach(graph, subscriber, element);
                detached += 1;
            }
            keep
        });
        debug_assert_eq!(
            self.tracked.len(),
            self.walker.visited().len(),
            "tracked set mirrors the visited set"
        );

        tracing::trace!(
            target_element = ?self.target,
            paths = self.walker.paths().len(),
            visited = self.tracked.len(),
            attached,
            detached,
            "walked attachment graph"
        );

        if *self.paths == *self.walker.paths() {
            return false;
        }
        self.paths = Rc::from(self.walker.paths());
        self.revision += 1;
        tracing::debug!(
            target_element = ?self.target,
            paths = self.paths.len(),
            revision = self.revision,
            "path list changed"
        );
        true
    }

    /// Deliver one notification about `element`.
    ///
    /// Recomputes when `element` is tracked and `channels` intersects the
    /// subscription bundle; returns true if the exposed list was replaced.
    pub fn notify(&mut self, graph: &mut G, element: G::Element, channels: Channels) -> bool {
        self.assert_live();
        if !self.wants(element, channels) {
            return false;
        }
        self.recompute(graph)
    }

    /// Remove every subscription and release the exposed list.
    ///
    /// Calling this again is a no-op.
    pub fn dispose(&mut self, graph: &mut G) {
        if self.disposed {
            return;
        }
        let count = self.tracked.len();
        for element in self.tracked.drain() {
            detach(graph, self.subscriber, element);
        }
        self.paths = Rc::from(Vec::new());
        self.walker = PathWalker::new();
        self.disposed = true;
        tracing::debug!(
            target_element = ?self.target,
            detached = count,
            "disposed path tracker"
        );
    }

    /// The current root-to-target paths.
    pub fn paths(&self) -> &PathList<G::Element> {
        self.assert_live();
        &self.paths
    }

    /// Number of times the exposed list has been replaced.
    pub fn revision(&self) -> u64 {
        self.assert_live();
        self.revision
    }

    /// The tracked target element.
    pub fn target(&self) -> G::Element {
        self.assert_live();
        self.target
    }

    /// The configuration this tracker was created with.
    pub fn config(&self) -> &TrackerConfig<G::Root> {
        self.assert_live();
        &self.config
    }

    /// The subscriber key registered with the host.
    pub fn subscriber(&self) -> G::Subscriber {
        self.assert_live();
        self.subscriber
    }

    /// The channels subscribed on every tracked element.
    pub fn channels(&self) -> Channels {
        self.assert_live();
        self.channels
    }

    /// Whether `element` currently holds this tracker's subscription.
    pub fn is_tracking(&self, element: G::Element) -> bool {
        self.assert_live();
        self.tracked.contains(&element)
    }

    /// Elements currently holding this tracker's subscription, in no particular order.
    pub fn tracked(&self) -> impl Iterator<Item = G::Element> + '_ {
        self.assert_live();
        self.tracked.iter().copied()
    }

    /// Whether [`PathTracker::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Whether a notice about `element` on `channels` should trigger a recompute.
    pub(crate) fn wants(&self, element: G::Element, channels: Channels) -> bool {
        self.channels.intersects(channels) && self.tracked.contains(&element)
    }

    fn assert_live(&self) {
        assert!(
            !self.disposed,
            "PathTracker for {:?} used after dispose",
            self.target
        );
    }
}

/// Attach the subscription bundle to one element.
fn attach<G>(graph: &mut G, subscriber: G::Subscriber, element: G::Element, channels: Channels)
where
    G: AttachmentGraph + ?Sized,
{
    graph.subscribe(element, subscriber, channels);
}

/// Detach the subscription bundle from one element.
///
/// Shared by the per-walk diff and by [`PathTracker::dispose`].
fn detach<G>(graph: &mut G, subscriber: G::Subscriber, element: G::Element)
where
    G: AttachmentGraph + ?Sized,
{
    graph.unsubscribe(element, subscriber);
}
