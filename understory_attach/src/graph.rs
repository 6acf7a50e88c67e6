// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core graph implementation: structure, flags, mounts, subscriptions.

use alloc::vec::Vec;
use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::cycle::{CycleError, CycleHandling};
use crate::types::{ElementFlags, ElementId, Event, Interest, Notification, RootId, SubscriberId};

/// A mutable multi-parent, multi-root attachment graph.
///
/// Elements form a DAG through ordered primary parent edges, plus an optional
/// single alternate parent per element that models a secondary hierarchy.
/// Elements are mounted directly on root hosts ([`RootId`]).
///
/// Mutations never call back into observers. Instead, each change is queued as
/// a [`Notification`] for every subscriber whose [`Interest`] on the changed
/// element covers it, and the host drains the queue with
/// [`Graph::take_notifications`] when it is ready to react.
///
/// ## Example
///
/// ```rust
/// use understory_attach::{Event, Graph, Interest};
///
/// let mut graph = Graph::new();
/// let stage = graph.create_root();
/// let panel = graph.insert();
/// let button = graph.insert();
/// graph.mount(panel, stage);
/// graph.add_parent(button, panel).unwrap();
///
/// let watcher = graph.new_subscriber();
/// graph.subscribe(button, watcher, Interest::PARENT_REMOVED);
/// graph.remove_parent(button, panel);
///
/// let notes = graph.take_notifications();
/// assert_eq!(notes.len(), 1);
/// assert_eq!(notes[0].event, Event::ParentRemoved(panel));
/// ```
pub struct Graph {
    /// slots
    elements: Vec<Option<Element>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    roots: Vec<RootHost>,
    next_subscriber: u32,
    pending: Vec<Notification>,
    cycle_handling: CycleHandling,
}

impl core::fmt::Debug for Graph {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.elements.len();
        let alive = self.elements.iter().filter(|n| n.is_some()).count();
        let disposed = self.elements.iter().flatten().filter(|n| n.disposed).count();
        f.debug_struct("Graph")
            .field("elements_total", &total)
            .field("elements_alive", &alive)
            .field("elements_disposed", &disposed)
            .field("roots", &self.roots.len())
            .field("pending", &self.pending.len())
            .field("cycle_handling", &self.cycle_handling)
            .finish_non_exhaustive()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
struct Element {
    generation: u32,
    parents: SmallVec<[ElementId; 2]>,
    children: SmallVec<[ElementId; 4]>,
    alternate_parent: Option<ElementId>,
    /// Elements whose alternate parent is this one.
    alternate_children: SmallVec<[ElementId; 2]>,
    flags: ElementFlags,
    disposed: bool,
    roots: SmallVec<[RootId; 1]>,
    watchers: SmallVec<[(SubscriberId, Interest); 2]>,
}

impl Element {
    fn new(generation: u32, flags: ElementFlags) -> Self {
        Self {
            generation,
            parents: SmallVec::new(),
            children: SmallVec::new(),
            alternate_parent: None,
            alternate_children: SmallVec::new(),
            flags,
            disposed: false,
            roots: SmallVec::new(),
            watchers: SmallVec::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct RootHost {
    mounted: Vec<ElementId>,
}

/// Which upward edges a reachability query follows.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Upward {
    /// Primary parents only.
    Primary,
    /// The alternate parent when present, otherwise the primary parents.
    Effective,
}

impl Graph {
    /// Create an empty graph with [`CycleHandling::DebugAssert`].
    pub fn new() -> Self {
        Self::with_cycle_handling(CycleHandling::default())
    }

    /// Create an empty graph with an explicit cycle policy.
    pub fn with_cycle_handling(cycle_handling: CycleHandling) -> Self {
        Self {
            elements: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            roots: Vec::new(),
            next_subscriber: 0,
            pending: Vec::new(),
            cycle_handling,
        }
    }

    /// The cycle policy applied by [`Graph::add_parent`] and [`Graph::set_alternate_parent`].
    pub fn cycle_handling(&self) -> CycleHandling {
        self.cycle_handling
    }

    /// Insert a detached element with default (all set) flags.
    pub fn insert(&mut self) -> ElementId {
        self.insert_with_flags(ElementFlags::default())
    }

    /// Insert a detached element with the given flags.
    pub fn insert_with_flags(&mut self, flags: ElementFlags) -> ElementId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.elements[idx] = Some(Element::new(generation, flags));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.elements.push(Some(Element::new(generation, flags)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices by design."
            )]
            ((self.elements.len() - 1) as u32, generation)
        };
        ElementId::new(idx, generation)
    }

    /// Returns true if `id` refers to a live slot, disposed or not.
    pub fn is_alive(&self, id: ElementId) -> bool {
        self.element(id).is_some()
    }

    /// Returns true if `id` was disposed or is stale.
    pub fn is_disposed(&self, id: ElementId) -> bool {
        self.element(id).is_none_or(|e| e.disposed)
    }

    /// Append `parent` to the ordered parent list of `child`.
    ///
    /// Adding an existing edge, or touching a stale or disposed element, is a
    /// no-op. On success subscribers of `child` receive [`Event::ParentAdded`].
    pub fn add_parent(&mut self, child: ElementId, parent: ElementId) -> Result<(), CycleError> {
        if self.is_disposed(child) || self.is_disposed(parent) {
            return Ok(());
        }
        if self.node(child).parents.contains(&parent) {
            return Ok(());
        }
        if self.cycle_handling != CycleHandling::Allow {
            let closes_effective = self.node(child).alternate_parent.is_none()
                && self.reaches(parent, child, Upward::Effective);
            if closes_effective || self.reaches(parent, child, Upward::Primary) {
                return self.reject(CycleError { child, parent });
            }
        }
        self.node_mut(child).parents.push(parent);
        self.node_mut(parent).children.push(child);
        self.emit(child, Event::ParentAdded(parent));
        Ok(())
    }

    /// Remove `parent` from the parent list of `child`, returning whether an edge existed.
    ///
    /// Works on disposed elements so that teardown can finish cleaning up links.
    pub fn remove_parent(&mut self, child: ElementId, parent: ElementId) -> bool {
        let Some(c) = self.element_mut(child) else {
            return false;
        };
        let Some(pos) = c.parents.iter().position(|p| *p == parent) else {
            return false;
        };
        c.parents.remove(pos);
        if let Some(p) = self.element_mut(parent) {
            p.children.retain(|x| *x != child);
        }
        self.emit(child, Event::ParentRemoved(parent));
        true
    }

    /// Set, replace, or clear (`None`) the alternate parent of `child`.
    ///
    /// Clearing is checked too: afterwards `child` climbs through its primary
    /// parents again, and one of them may lead back to `child` along alternate
    /// edges. The error then names that primary parent.
    ///
    /// Subscribers of `child` receive [`Event::AlternateParentChanged`] when the value changes.
    pub fn set_alternate_parent(
        &mut self,
        child: ElementId,
        parent: Option<ElementId>,
    ) -> Result<(), CycleError> {
        if self.is_disposed(child) {
            return Ok(());
        }
        if parent.is_some_and(|p| self.is_disposed(p)) {
            return Ok(());
        }
        let old = self.node(child).alternate_parent;
        if old == parent {
            return Ok(());
        }
        if self.cycle_handling != CycleHandling::Allow {
            let closing = match parent {
                Some(p) => self.reaches(p, child, Upward::Effective).then_some(p),
                None => self.closing_primary_parent(child),
            };
            if let Some(p) = closing {
                return self.reject(CycleError { child, parent: p });
            }
        }
        if let Some(o) = old
            && let Some(e) = self.element_mut(o)
        {
            e.alternate_children.retain(|x| *x != child);
        }
        if let Some(p) = parent {
            self.node_mut(p).alternate_children.push(child);
        }
        self.node_mut(child).alternate_parent = parent;
        self.emit(child, Event::AlternateParentChanged);
        Ok(())
    }

    /// Ordered primary parents of `id`, or an empty slice if stale.
    pub fn parents_of(&self, id: ElementId) -> &[ElementId] {
        self.element(id).map_or(&[], |e| &e.parents)
    }

    /// Children of `id` in attachment order, or an empty slice if stale.
    pub fn children_of(&self, id: ElementId) -> &[ElementId] {
        self.element(id).map_or(&[], |e| &e.children)
    }

    /// The alternate parent of `id`, if any.
    pub fn alternate_parent_of(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).and_then(|e| e.alternate_parent)
    }

    /// Returns the flags of an element if the identifier is live.
    pub fn flags(&self, id: ElementId) -> Option<ElementFlags> {
        self.element(id).map(|e| e.flags)
    }

    /// Replace the flags of an element.
    ///
    /// Every bit that differs produces its own [`Event::FlagChanged`].
    pub fn set_flags(&mut self, id: ElementId, flags: ElementFlags) {
        if self.is_disposed(id) {
            return;
        }
        let changed = self.node(id).flags ^ flags;
        if changed.is_empty() {
            return;
        }
        self.node_mut(id).flags = flags;
        for flag in changed.iter() {
            self.emit(id, Event::FlagChanged(flag));
        }
    }

    /// Set or clear the given flag bits on an element.
    pub fn set_flag(&mut self, id: ElementId, flag: ElementFlags, value: bool) {
        let Some(mut flags) = self.flags(id) else {
            return;
        };
        flags.set(flag, value);
        self.set_flags(id, flags);
    }

    /// Create a new root host.
    pub fn create_root(&mut self) -> RootId {
        self.roots.push(RootHost::default());
        #[allow(
            clippy::cast_possible_truncation,
            reason = "RootId uses 32-bit indices by design."
        )]
        RootId((self.roots.len() - 1) as u32)
    }

    /// Mount an element directly on a root host, returning whether it was newly mounted.
    pub fn mount(&mut self, id: ElementId, root: RootId) -> bool {
        if self.is_disposed(id) || root.0 as usize >= self.roots.len() {
            return false;
        }
        let e = self.node_mut(id);
        if e.roots.contains(&root) {
            return false;
        }
        e.roots.push(root);
        self.roots[root.0 as usize].mounted.push(id);
        self.emit(id, Event::RootsChanged);
        true
    }

    /// Unmount an element from a root host, returning whether it was mounted.
    pub fn unmount(&mut self, id: ElementId, root: RootId) -> bool {
        let Some(e) = self.element_mut(id) else {
            return false;
        };
        let Some(pos) = e.roots.iter().position(|r| *r == root) else {
            return false;
        };
        e.roots.remove(pos);
        if let Some(host) = self.roots.get_mut(root.0 as usize) {
            host.mounted.retain(|x| *x != id);
        }
        self.emit(id, Event::RootsChanged);
        true
    }

    /// Root hosts the element is directly mounted on, in mount order.
    pub fn root_attachments(&self, id: ElementId) -> &[RootId] {
        self.element(id).map_or(&[], |e| &e.roots)
    }

    /// Elements mounted directly on a root host, in mount order.
    pub fn mounted_on(&self, root: RootId) -> &[ElementId] {
        self.roots
            .get(root.0 as usize)
            .map_or(&[], |host| host.mounted.as_slice())
    }

    /// Mark an element as disposed.
    ///
    /// Disposal is one-way. Subscribers with [`Interest::DISPOSED`] receive
    /// [`Event::Disposed`], then every subscription on the element is dropped and
    /// new ones are refused. Edges are left in place; use [`Graph::remove`] to
    /// also unlink and free the element.
    pub fn dispose(&mut self, id: ElementId) -> bool {
        if self.is_disposed(id) {
            return false;
        }
        self.node_mut(id).disposed = true;
        self.emit(id, Event::Disposed);
        self.node_mut(id).watchers.clear();
        tracing::trace!(element = ?id, "disposed element");
        true
    }

    /// Dispose an element, unlink all of its edges and mounts, and free its slot.
    ///
    /// Children receive [`Event::ParentRemoved`], alternate children receive
    /// [`Event::AlternateParentChanged`]. The identifier becomes stale.
    ///
    /// An alternate child whose primary parents would lead back to it along
    /// alternate edges keeps the stale identifier as its alternate parent, so
    /// its alternate climb ends at the removed element. The conflict goes
    /// through the cycle policy, which may panic under
    /// [`CycleHandling::DebugAssert`] in debug builds.
    pub fn remove(&mut self, id: ElementId) {
        if !self.is_alive(id) {
            return;
        }
        self.dispose(id);
        let parents = self.node(id).parents.clone();
        for parent in parents {
            self.remove_parent(id, parent);
        }
        if let Some(alt) = self.node(id).alternate_parent
            && let Some(e) = self.element_mut(alt)
        {
            e.alternate_children.retain(|x| *x != id);
        }
        let children = self.node(id).children.clone();
        for child in children {
            self.remove_parent(child, id);
        }
        let alternate_children = self.node(id).alternate_children.clone();
        let roots = self.node(id).roots.clone();
        for root in roots {
            if let Some(host) = self.roots.get_mut(root.0 as usize) {
                host.mounted.retain(|x| *x != id);
            }
        }
        self.elements[id.idx()] = None;
        self.free_list.push(id.idx());
        for child in alternate_children {
            let closing = if self.cycle_handling == CycleHandling::Allow {
                None
            } else {
                self.closing_primary_parent(child)
            };
            if let Some(parent) = closing {
                // Nothing to return the error to; the stale link stays.
                let _ = self.reject(CycleError { child, parent });
            } else if let Some(e) = self.element_mut(child) {
                e.alternate_parent = None;
            }
            self.emit(child, Event::AlternateParentChanged);
        }
        tracing::trace!(element = ?id, "removed element");
    }

    /// Allocate a fresh subscriber key.
    pub fn new_subscriber(&mut self) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber = self
            .next_subscriber
            .checked_add(1)
            .expect("subscriber keys exhausted");
        id
    }

    /// Register or replace the interest of `subscriber` on `id`.
    ///
    /// Subscribing never queues a notification itself. Disposed and stale elements
    /// refuse subscriptions (returns `false`). An empty interest unsubscribes.
    pub fn subscribe(&mut self, id: ElementId, subscriber: SubscriberId, interest: Interest) -> bool {
        if interest.is_empty() {
            return self.unsubscribe(id, subscriber);
        }
        if self.is_disposed(id) {
            return false;
        }
        let watchers = &mut self.node_mut(id).watchers;
        if let Some(entry) = watchers.iter_mut().find(|(s, _)| *s == subscriber) {
            entry.1 = interest;
        } else {
            watchers.push((subscriber, interest));
        }
        true
    }

    /// Drop the subscription of `subscriber` on `id`, returning whether one existed.
    ///
    /// Notifications already queued for this pair are discarded as well, so a
    /// detached observer never sees a late delivery.
    pub fn unsubscribe(&mut self, id: ElementId, subscriber: SubscriberId) -> bool {
        self.pending
            .retain(|n| !(n.subscriber == subscriber && n.element == id));
        let Some(e) = self.element_mut(id) else {
            return false;
        };
        let before = e.watchers.len();
        e.watchers.retain(|(s, _)| *s != subscriber);
        e.watchers.len() != before
    }

    /// The interest `subscriber` holds on `id`, if subscribed.
    pub fn interest_of(&self, id: ElementId, subscriber: SubscriberId) -> Option<Interest> {
        self.element(id)?
            .watchers
            .iter()
            .find(|(s, _)| *s == subscriber)
            .map(|(_, i)| *i)
    }

    /// Number of subscribers currently registered on `id`.
    pub fn subscriber_count(&self, id: ElementId) -> usize {
        self.element(id).map_or(0, |e| e.watchers.len())
    }

    /// Returns true if notifications are queued.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Take all queued notifications, in the order the changes happened.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        core::mem::take(&mut self.pending)
    }

    /// Drain queued notifications in order, keeping the queue's allocation.
    pub fn drain_notifications(&mut self) -> impl Iterator<Item = Notification> + '_ {
        self.pending.drain(..)
    }
}

impl Graph {
    // --- internals ---

    fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements
            .get(id.idx())
            .and_then(|slot| slot.as_ref())
            .filter(|e| e.generation == id.1)
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        let e = self.elements.get_mut(id.idx())?.as_mut()?;
        if e.generation != id.1 {
            return None;
        }
        Some(e)
    }

    /// Access a live element; panics if `id` is stale.
    fn node(&self, id: ElementId) -> &Element {
        self.element(id).expect("dangling ElementId")
    }

    /// Access a live element mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: ElementId) -> &mut Element {
        self.element_mut(id).expect("dangling ElementId")
    }

    fn emit(&mut self, id: ElementId, event: Event) {
        let interest = event.interest();
        let Some(e) = self
            .elements
            .get(id.idx())
            .and_then(|slot| slot.as_ref())
            .filter(|e| e.generation == id.1)
        else {
            return;
        };
        for &(subscriber, wanted) in &e.watchers {
            if wanted.intersects(interest) {
                self.pending.push(Notification {
                    subscriber,
                    element: id,
                    event,
                });
            }
        }
    }

    /// Whether `target` is `from` or one of its ancestors along `upward` edges.
    fn reaches(&self, from: ElementId, target: ElementId, upward: Upward) -> bool {
        let mut seen: HashSet<ElementId> = HashSet::new();
        let mut stack: SmallVec<[ElementId; 16]> = SmallVec::new();
        stack.push(from);
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            let Some(e) = self.element(id) else {
                continue;
            };
            match (upward, e.alternate_parent) {
                (Upward::Effective, Some(alt)) => stack.push(alt),
                _ => stack.extend(e.parents.iter().copied()),
            }
        }
        false
    }

    /// The first primary parent of `child` that leads back to `child` when
    /// climbing alternate-or-primary edges.
    fn closing_primary_parent(&self, child: ElementId) -> Option<ElementId> {
        let e = self.element(child)?;
        e.parents
            .iter()
            .copied()
            .find(|&p| self.reaches(p, child, Upward::Effective))
    }

    fn reject(&self, err: CycleError) -> Result<(), CycleError> {
        tracing::debug!(child = ?err.child, parent = ?err.parent, "rejected cyclic edge");
        match self.cycle_handling {
            CycleHandling::DebugAssert => {
                if cfg!(debug_assertions) {
                    panic!("{err}");
                }
                Err(err)
            }
            CycleHandling::Error => Err(err),
            CycleHandling::Ignore | CycleHandling::Allow => Ok(()),
        }
    }
}
