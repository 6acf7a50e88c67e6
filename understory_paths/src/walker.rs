// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path walker: upward backtracking DFS from a target to its roots.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashSet;

use crate::graph::AttachmentGraph;
use crate::path::Path;
use crate::types::TrackerConfig;

/// Enumerates every root-to-target path of one target under a configuration.
///
/// The walker keeps its scratch buffers between walks, so reusing one walker
/// for repeated recomputation does not allocate once the buffers have grown.
///
/// Walking rules, applied at each head element:
/// - A disposed head ends the branch and is not recorded as visited.
/// - Otherwise the head is visited. If an enforced gate is false, the branch ends.
/// - If the root predicate accepts the head's root attachments, a copy of the
///   current path is recorded.
/// - The walk continues through the alternate parent (alternate mode, when set)
///   or through every primary parent in declaration order.
#[derive(Clone, Debug)]
pub struct PathWalker<K> {
    /// Live path, target first and head last.
    buffer: Vec<K>,
    /// Next parent index to try, one entry per expanded buffer element.
    frames: Vec<usize>,
    visited: HashSet<K>,
    paths: Vec<Path<K>>,
}

impl<K> Default for PathWalker<K> {
    fn default() -> Self {
        Self {
            buffer: Vec::new(),
            frames: Vec::new(),
            visited: HashSet::new(),
            paths: Vec::new(),
        }
    }
}

impl<K: Copy + Eq + Hash + Debug> PathWalker<K> {
    /// Create a walker with empty scratch buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk from `target` and replace the previous results.
    ///
    /// A cycle reachable from `target` is a precondition violation: debug builds
    /// panic, release builds never terminate.
    pub fn walk<G>(&mut self, graph: &G, target: K, config: &TrackerConfig<G::Root>)
    where
        G: AttachmentGraph<Element = K> + ?Sized,
    {
        self.buffer.clear();
        self.frames.clear();
        self.visited.clear();
        self.paths.clear();

        self.buffer.push(target);
        if !self.enter(graph, target, config) {
            self.buffer.pop();
            return;
        }

        while let Some(next) = self.frames.last_mut() {
            let head = self.buffer[self.buffer.len() - 1];
            let idx = *next;
            *next += 1;
            match upward(graph, head, config.alternate, idx) {
                Some(parent) => {
                    debug_assert!(
                        !self.buffer.contains(&parent),
                        "attachment graph contains a cycle through {parent:?}"
                    );
                    self.buffer.push(parent);
                    if !self.enter(graph, parent, config) {
                        self.buffer.pop();
                    }
                }
                None => {
                    self.frames.pop();
                    self.buffer.pop();
                }
            }
        }
        debug_assert!(self.buffer.is_empty(), "walk buffer fully unwound");
    }

    /// Paths found by the last walk, in discovery order.
    pub fn paths(&self) -> &[Path<K>] {
        &self.paths
    }

    /// Elements visited by the last walk.
    pub fn visited(&self) -> &HashSet<K> {
        &self.visited
    }

    /// Process the head just pushed; returns true if it was expanded.
    fn enter<G>(&mut self, graph: &G, head: K, config: &TrackerConfig<G::Root>) -> bool
    where
        G: AttachmentGraph<Element = K> + ?Sized,
    {
        if graph.is_disposed(head) {
            return false;
        }
        self.visited.insert(head);
        if !graph.gates(head).contains(config.enforce) {
            return false;
        }
        if config.roots.matches(graph.root_attachments(head)) {
            self.paths.push(Path::from_walk(&self.buffer));
        }
        self.frames.push(0);
        true
    }
}

/// The `idx`-th element to continue upward to from `head`.
fn upward<G>(graph: &G, head: G::Element, alternate: bool, idx: usize) -> Option<G::Element>
where
    G: AttachmentGraph + ?Sized,
{
    if alternate && let Some(parent) = graph.alternate_parent(head) {
        return (idx == 0).then_some(parent);
    }
    graph.parents(head).get(idx).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Channels, Gates, Notice, RootPredicate};
    use alloc::vec;

    /// A fixed graph over `u32` elements for exercising walk order.
    #[derive(Default)]
    struct Fixture {
        parents: Vec<Vec<u32>>,
        alternate: Vec<Option<u32>>,
        gates: Vec<Gates>,
        roots: Vec<Vec<u8>>,
        disposed: Vec<bool>,
    }

    impl Fixture {
        fn with_len(n: usize) -> Self {
            Self {
                parents: vec![Vec::new(); n],
                alternate: vec![None; n],
                gates: vec![Gates::all(); n],
                roots: vec![Vec::new(); n],
                disposed: vec![false; n],
            }
        }

        fn edge(&mut self, child: u32, parent: u32) -> &mut Self {
            self.parents[child as usize].push(parent);
            self
        }

        fn mount(&mut self, element: u32, root: u8) -> &mut Self {
            self.roots[element as usize].push(root);
            self
        }
    }

    impl AttachmentGraph for Fixture {
        type Element = u32;
        type Root = u8;
        type Subscriber = u32;

        fn is_disposed(&self, element: u32) -> bool {
            self.disposed[element as usize]
        }
        fn parents(&self, element: u32) -> &[u32] {
            &self.parents[element as usize]
        }
        fn alternate_parent(&self, element: u32) -> Option<u32> {
            self.alternate[element as usize]
        }
        fn gates(&self, element: u32) -> Gates {
            self.gates[element as usize]
        }
        fn root_attachments(&self, element: u32) -> &[u8] {
            &self.roots[element as usize]
        }
        fn new_subscriber(&mut self) -> u32 {
            0
        }
        fn subscribe(&mut self, _: u32, _: u32, _: Channels) {}
        fn unsubscribe(&mut self, _: u32, _: u32) {}
        fn drain_notices(&mut self, _: &mut Vec<Notice<u32, u32>>) {}
    }

    fn walk(graph: &Fixture, target: u32, config: &TrackerConfig<u8>) -> Vec<Vec<u32>> {
        let mut walker = PathWalker::new();
        walker.walk(graph, target, config);
        walker.paths().iter().map(|p| p.to_vec()).collect()
    }

    fn visited(graph: &Fixture, target: u32, config: &TrackerConfig<u8>) -> Vec<u32> {
        let mut walker = PathWalker::new();
        walker.walk(graph, target, config);
        let mut out: Vec<u32> = walker.visited().iter().copied().collect();
        out.sort_unstable();
        out
    }

    #[test]
    fn diamond_yields_one_path_per_route_in_parent_order() {
        // 0 = R, 1 = A, 2 = B, 3 = T
        let mut g = Fixture::with_len(4);
        g.edge(1, 0).edge(2, 0).edge(3, 1).edge(3, 2).mount(0, 0);
        let config = TrackerConfig::new();
        assert_eq!(walk(&g, 3, &config), vec![vec![0, 1, 3], vec![0, 2, 3]]);

        let mut swapped = Fixture::with_len(4);
        swapped.edge(1, 0).edge(2, 0).edge(3, 2).edge(3, 1).mount(0, 0);
        assert_eq!(
            walk(&swapped, 3, &config),
            vec![vec![0, 2, 3], vec![0, 1, 3]]
        );
    }

    #[test]
    fn intermediate_root_attachments_close_paths_too() {
        // 0 -> 1 -> 2, both 0 and 1 mounted.
        let mut g = Fixture::with_len(3);
        g.edge(1, 0).edge(2, 1).mount(1, 0).mount(0, 1);
        assert_eq!(
            walk(&g, 2, &TrackerConfig::new()),
            vec![vec![1, 2], vec![0, 1, 2]]
        );
        let specific = TrackerConfig::new().with_roots(RootPredicate::Specific(1));
        assert_eq!(walk(&g, 2, &specific), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn target_mounted_directly_is_a_single_element_path() {
        let mut g = Fixture::with_len(1);
        g.mount(0, 0);
        assert_eq!(walk(&g, 0, &TrackerConfig::new()), vec![vec![0]]);
    }

    #[test]
    fn unrooted_top_ends_without_a_path_but_is_visited() {
        let mut g = Fixture::with_len(3);
        g.edge(2, 1).edge(1, 0);
        let config = TrackerConfig::new();
        assert!(walk(&g, 2, &config).is_empty());
        assert_eq!(visited(&g, 2, &config), vec![0, 1, 2]);
    }

    #[test]
    fn failed_gate_prunes_but_stays_visited() {
        // 0 -> 1 -> 3 and 0 -> 2 -> 3, element 1 hidden.
        let mut g = Fixture::with_len(4);
        g.edge(1, 0).edge(2, 0).edge(3, 1).edge(3, 2).mount(0, 0);
        g.gates[1] = Gates::all() - Gates::VISIBLE;

        let gated = TrackerConfig::new().enforce_visible();
        assert_eq!(walk(&g, 3, &gated), vec![vec![0, 2, 3]]);
        assert_eq!(visited(&g, 3, &gated), vec![0, 1, 2, 3]);

        // Unenforced gates are ignored.
        let other = TrackerConfig::new().enforce_enabled();
        assert_eq!(walk(&g, 3, &other).len(), 2);
    }

    #[test]
    fn gated_target_yields_nothing() {
        let mut g = Fixture::with_len(2);
        g.edge(1, 0).mount(0, 0).mount(1, 0);
        g.gates[1] = Gates::empty();
        let config = TrackerConfig::new().enforce_input_enabled();
        assert!(walk(&g, 1, &config).is_empty());
        assert_eq!(visited(&g, 1, &config), vec![1]);
    }

    #[test]
    fn disposed_element_is_neither_walked_nor_visited() {
        let mut g = Fixture::with_len(4);
        g.edge(1, 0).edge(2, 0).edge(3, 1).edge(3, 2).mount(0, 0);
        g.disposed[1] = true;
        let config = TrackerConfig::new();
        assert_eq!(walk(&g, 3, &config), vec![vec![0, 2, 3]]);
        assert_eq!(visited(&g, 3, &config), vec![0, 2, 3]);

        g.disposed[3] = true;
        assert!(walk(&g, 3, &config).is_empty());
        assert!(visited(&g, 3, &config).is_empty());
    }

    #[test]
    fn alternate_parent_replaces_primary_parents() {
        // Primary: 0 -> 2. Alternate: 1 -> 2. Element 3 has no alternate and walks 2.
        let mut g = Fixture::with_len(4);
        g.edge(2, 0).edge(3, 2).mount(0, 0).mount(1, 1);
        g.alternate[2] = Some(1);

        assert_eq!(
            walk(&g, 3, &TrackerConfig::new()),
            vec![vec![0, 2, 3]]
        );
        assert_eq!(
            walk(&g, 3, &TrackerConfig::new().alternate()),
            vec![vec![1, 2, 3]]
        );
        assert_eq!(
            visited(&g, 3, &TrackerConfig::new().alternate()),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn alternate_visibility_gates_the_alternate_climb() {
        // Primary: 0 -> 2 -> 3. Alternate: 1 -> 2.
        let mut g = Fixture::with_len(4);
        g.edge(2, 0).edge(3, 2).mount(0, 0).mount(1, 1);
        g.alternate[2] = Some(1);
        let config = TrackerConfig::new().alternate().enforce_alternate_visible();
        assert_eq!(walk(&g, 3, &config), vec![vec![1, 2, 3]]);

        g.gates[1].remove(Gates::ALTERNATE_VISIBLE);
        assert!(walk(&g, 3, &config).is_empty());
        assert_eq!(visited(&g, 3, &config), vec![1, 2, 3]);
        // Only the enforced gate matters.
        assert_eq!(
            walk(&g, 3, &TrackerConfig::new().alternate().enforce_visible()),
            vec![vec![1, 2, 3]]
        );

        g.gates[1].insert(Gates::ALTERNATE_VISIBLE);
        assert_eq!(walk(&g, 3, &config), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn shared_ancestors_are_walked_per_route() {
        // Two diamonds stacked: 0 -> {1, 2} -> 3 -> {4, 5} -> 6
        let mut g = Fixture::with_len(7);
        g.edge(1, 0).edge(2, 0).edge(3, 1).edge(3, 2);
        g.edge(4, 3).edge(5, 3).edge(6, 4).edge(6, 5);
        g.mount(0, 0);
        assert_eq!(
            walk(&g, 6, &TrackerConfig::new()),
            vec![
                vec![0, 1, 3, 4, 6],
                vec![0, 2, 3, 4, 6],
                vec![0, 1, 3, 5, 6],
                vec![0, 2, 3, 5, 6],
            ]
        );
    }

    #[test]
    fn reused_walker_resets_between_walks() {
        let mut g = Fixture::with_len(2);
        g.edge(1, 0).mount(0, 0);
        let mut walker = PathWalker::new();
        let config = TrackerConfig::new();
        walker.walk(&g, 1, &config);
        assert_eq!(walker.paths().len(), 1);
        g.disposed[0] = true;
        walker.walk(&g, 1, &config);
        assert!(walker.paths().is_empty());
        assert_eq!(walker.visited().len(), 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "cycle")]
    fn cycle_is_detected_in_debug_builds() {
        let mut g = Fixture::with_len(2);
        g.edge(0, 1).edge(1, 0);
        walk(&g, 0, &TrackerConfig::new());
    }
}
