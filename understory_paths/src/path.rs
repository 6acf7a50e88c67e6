// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable root-to-target path value.

use core::fmt;
use core::ops::Deref;

use smallvec::SmallVec;

/// A root-to-target sequence of elements, captured during one walk.
///
/// Each adjacent pair was a parent → child edge when the path was captured.
/// Two paths are equal when they have the same length and the same elements in
/// the same order.
///
/// ```
/// use understory_paths::Path;
///
/// let path = Path::from_slice(&[1_u32, 4, 9]);
/// assert_eq!(path.root(), 1);
/// assert_eq!(path.target(), 9);
/// assert_eq!(&path[..], &[1, 4, 9]);
/// assert_ne!(path, Path::from_slice(&[1, 4]));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Path<K>(SmallVec<[K; 8]>);

impl<K: Copy> Path<K> {
    /// Build a path from a root-to-target slice.
    ///
    /// # Panics
    ///
    /// Panics if `elements` is empty; a path always contains its target.
    pub fn from_slice(elements: &[K]) -> Self {
        assert!(!elements.is_empty(), "a path contains at least its target");
        Self(SmallVec::from_slice(elements))
    }

    /// Snapshot a walk buffer stored head-last (target first).
    pub(crate) fn from_walk(buffer: &[K]) -> Self {
        debug_assert!(!buffer.is_empty(), "walk buffer always holds the target");
        Self(buffer.iter().rev().copied().collect())
    }

    /// The element the path starts at.
    pub fn root(&self) -> K {
        self.0[0]
    }

    /// The element the path ends at.
    pub fn target(&self) -> K {
        self.0[self.0.len() - 1]
    }
}

impl<K> Path<K> {
    /// The elements from root to target.
    pub fn as_slice(&self) -> &[K] {
        &self.0
    }

    /// Number of elements, root and target included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K> Deref for Path<K> {
    type Target = [K];

    fn deref(&self) -> &[K] {
        &self.0
    }
}

impl<K: fmt::Debug> fmt::Debug for Path<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl<'a, K> IntoIterator for &'a Path<K> {
    type Item = &'a K;
    type IntoIter = core::slice::Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
