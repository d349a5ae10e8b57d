// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node and scene identity types.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

/// A handle to a node in a [`NodeTree`](super::NodeTree).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a node is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    /// Slot index into the tree's arena.
    pub(crate) idx: u32,
    /// Generation counter; must match the tree's generation for this slot.
    pub(crate) generation: u32,
}

impl NodeId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}

/// Identifies a [`Scene`](crate::scene::Scene) for the lifetime of the
/// process.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(u32);

impl SceneId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value (for diagnostics only).
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SceneId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_ids_are_unique() {
        let a = SceneId::next();
        let b = SceneId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn node_id_debug_shows_generation() {
        let id = NodeId {
            idx: 3,
            generation: 2,
        };
        assert_eq!(alloc::format!("{id:?}"), "NodeId(3@gen2)");
    }
}
