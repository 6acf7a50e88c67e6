// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch of host notifications to many trackers.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::graph::AttachmentGraph;
use crate::tracker::{PathList, PathTracker};
use crate::types::{Notice, TrackerConfig};

/// A group of [`PathTracker`]s sharing one host graph.
///
/// Trackers are keyed by their subscriber key. [`TrackerSet::flush`] drains the
/// host's notice queue and routes every notice to the tracker it is addressed
/// to. Within one drained batch each affected tracker recomputes once: the
/// graph cannot change between notices of the same batch, so further walks
/// would produce the same result.
///
/// ```rust
/// use understory_attach::Graph;
/// use understory_paths::{TrackerConfig, TrackerSet};
///
/// let mut graph = Graph::new();
/// let window = graph.create_root();
/// let panel = graph.insert();
/// let label = graph.insert();
/// graph.add_parent(label, panel).unwrap();
///
/// let mut set = TrackerSet::new();
/// let key = set.insert(&mut graph, label, TrackerConfig::new());
/// assert!(set.paths(key).unwrap().is_empty());
///
/// graph.mount(panel, window);
/// assert_eq!(set.flush(&mut graph), vec![key]);
/// assert_eq!(set.paths(key).unwrap()[0].as_slice(), &[panel, label]);
/// ```
pub struct TrackerSet<G: AttachmentGraph + ?Sized> {
    trackers: HashMap<G::Subscriber, PathTracker<G>>,
    notices: Vec<Notice<G::Subscriber, G::Element>>,
    due: Vec<G::Subscriber>,
}

impl<G: AttachmentGraph + ?Sized> core::fmt::Debug for TrackerSet<G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TrackerSet")
            .field("trackers", &self.trackers.len())
            .finish_non_exhaustive()
    }
}

impl<G: AttachmentGraph + ?Sized> Default for TrackerSet<G> {
    fn default() -> Self {
        Self {
            trackers: HashMap::new(),
            notices: Vec::new(),
            due: Vec::new(),
        }
    }
}

impl<G: AttachmentGraph + ?Sized> TrackerSet<G> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker for `target` and return its key.
    pub fn insert(
        &mut self,
        graph: &mut G,
        target: G::Element,
        config: TrackerConfig<G::Root>,
    ) -> G::Subscriber {
        let tracker = PathTracker::new(graph, target, config);
        let key = tracker.subscriber();
        self.trackers.insert(key, tracker);
        key
    }

    /// Dispose and drop the tracker under `key`, returning whether it existed.
    pub fn remove(&mut self, graph: &mut G, key: G::Subscriber) -> bool {
        let Some(mut tracker) = self.trackers.remove(&key) else {
            return false;
        };
        tracker.dispose(graph);
        true
    }

    /// Dispose and drop every tracker.
    pub fn clear(&mut self, graph: &mut G) {
        for (_, mut tracker) in self.trackers.drain() {
            tracker.dispose(graph);
        }
    }

    /// The tracker under `key`.
    pub fn get(&self, key: G::Subscriber) -> Option<&PathTracker<G>> {
        self.trackers.get(&key)
    }

    /// The current paths of the tracker under `key`.
    pub fn paths(&self, key: G::Subscriber) -> Option<&PathList<G::Element>> {
        self.trackers.get(&key).map(PathTracker::paths)
    }

    /// Number of trackers.
    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    /// Whether the set holds no trackers.
    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    /// Drain host notices and recompute the trackers they concern.
    ///
    /// Returns the keys whose exposed list changed, in the order their first
    /// relevant notice was queued. Notices for unknown keys are dropped.
    pub fn flush(&mut self, graph: &mut G) -> Vec<G::Subscriber> {
        let mut changed = Vec::new();
        loop {
            self.notices.clear();
            graph.drain_notices(&mut self.notices);
            if self.notices.is_empty() {
                break;
            }
            self.due.clear();
            for notice in &self.notices {
                let Some(tracker) = self.trackers.get(&notice.subscriber) else {
                    continue;
                };
                if tracker.wants(notice.element, notice.channels)
                    && !self.due.contains(&notice.subscriber)
                {
                    self.due.push(notice.subscriber);
                }
            }
            tracing::trace!(
                notices = self.notices.len(),
                trackers = self.due.len(),
                "flushing attachment notices"
            );
            for key in &self.due {
                let Some(tracker) = self.trackers.get_mut(key) else {
                    continue;
                };
                if tracker.recompute(graph) && !changed.contains(key) {
                    changed.push(*key);
                }
            }
        }
        changed
    }
}

#[cfg(all(test, feature = "attach_adapter"))]
mod tests {
    use super::*;
    use alloc::vec;
    use understory_attach::{ElementFlags, Graph};

    #[test]
    fn flush_routes_to_affected_trackers_only() {
        let mut graph = Graph::new();
        let window = graph.create_root();
        let left = graph.insert();
        let right = graph.insert();
        let a = graph.insert();
        let b = graph.insert();
        graph.mount(left, window);
        graph.mount(right, window);
        graph.add_parent(a, left).unwrap();
        graph.add_parent(b, right).unwrap();

        let mut set = TrackerSet::new();
        let ka = set.insert(&mut graph, a, TrackerConfig::new().enforce_visible());
        let kb = set.insert(&mut graph, b, TrackerConfig::new().enforce_visible());
        assert_eq!(set.len(), 2);

        graph.set_flag(left, ElementFlags::VISIBLE, false);
        assert_eq!(set.flush(&mut graph), vec![ka]);
        assert!(set.paths(ka).unwrap().is_empty());
        assert_eq!(set.paths(kb).unwrap().len(), 1);

        assert!(set.flush(&mut graph).is_empty());
    }

    #[test]
    fn batch_recomputes_each_tracker_once() {
        let mut graph = Graph::new();
        let window = graph.create_root();
        let r = graph.insert();
        let t = graph.insert();
        graph.add_parent(t, r).unwrap();

        let mut set = TrackerSet::new();
        let key = set.insert(&mut graph, t, TrackerConfig::new().enforce_enabled());
        let before = set.get(key).unwrap().revision();

        graph.mount(r, window);
        graph.set_flag(r, ElementFlags::ENABLED, false);
        graph.set_flag(r, ElementFlags::ENABLED, true);
        assert_eq!(set.flush(&mut graph), vec![key]);
        assert_eq!(set.get(key).unwrap().revision(), before + 1);
        assert_eq!(set.paths(key).unwrap()[0].as_slice(), &[r, t]);
    }

    #[test]
    fn removed_tracker_gets_nothing() {
        let mut graph = Graph::new();
        let window = graph.create_root();
        let r = graph.insert();
        let t = graph.insert();
        graph.add_parent(t, r).unwrap();
        let mut set = TrackerSet::new();
        let key = set.insert(&mut graph, t, TrackerConfig::new());

        graph.mount(r, window);
        assert!(set.remove(&mut graph, key));
        assert!(!set.remove(&mut graph, key));
        assert!(!graph.has_pending());
        assert_eq!(graph.subscriber_count(r), 0);
        assert_eq!(graph.subscriber_count(t), 0);
        assert!(set.flush(&mut graph).is_empty());
        assert!(set.is_empty());
    }

    #[test]
    fn clear_disposes_everything() {
        let mut graph = Graph::new();
        let r = graph.insert();
        let t = graph.insert();
        graph.add_parent(t, r).unwrap();
        let mut set = TrackerSet::new();
        set.insert(&mut graph, t, TrackerConfig::new());
        set.insert(&mut graph, r, TrackerConfig::new());
        assert_eq!(graph.subscriber_count(r), 2);
        set.clear(&mut graph);
        assert_eq!(graph.subscriber_count(r), 0);
        assert_eq!(graph.subscriber_count(t), 0);
        assert!(set.is_empty());
    }
}
