// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena storage with allocation, topology, and component management.

use alloc::boxed::Box;
use alloc::collections::btree_map::Entry;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::any::Any;
use core::cmp::Ordering;

use glam::{Mat4, Vec3};

use super::id::{NodeId, SceneId};
use super::{Node, NodeBehavior};
use crate::component::{Component, ComponentError, ComponentTag, ComponentType};
use crate::transform::Transform;

/// Structural changes a scene must react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TreeNotice {
    /// The node joined a scene.
    SceneAttached(NodeId),
    /// The node left its scene.
    SceneDetached(NodeId),
    /// A component was added to a node that is in a scene.
    ComponentAdded(NodeId, ComponentTag),
    /// A component was removed from a node that is in a scene.
    ComponentRemoved(NodeId, ComponentTag),
}

/// Generational arena owning every node of one scene.
///
/// Nodes are addressed by [`NodeId`] handles. Destroyed nodes are recycled
/// via a free list, and generation counters make stale handles fail loudly.
#[derive(Debug, Default)]
pub struct NodeTree {
    nodes: Vec<Option<Node>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
    pub(crate) notices: Vec<TreeNotice>,
    taken: Vec<Taken>,
    topology_version: u64,
}

/// A component held outside its node while one of its hooks runs.
#[derive(Clone, Copy, Debug)]
struct Taken {
    node: NodeId,
    tag: ComponentTag,
    removed: bool,
}

impl NodeTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Allocation API --

    /// Creates an unnamed, detached node.
    pub fn create_node(&mut self) -> NodeId {
        self.create_named(String::new())
    }

    /// Creates a detached node named `name`.
    pub fn create_named(&mut self, name: impl Into<String>) -> NodeId {
        let node = Node::new(name.into());
        let idx = if let Some(idx) = self.free_list.pop() {
            self.nodes[idx as usize] = Some(node);
            idx
        } else {
            let idx = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
            assert!(idx != u32::MAX, "node arena is full");
            self.nodes.push(Some(node));
            self.generation.push(0);
            idx
        };
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Creates a detached node driven by `behavior`, then runs its
    /// [`setup`](NodeBehavior::setup) hook.
    pub fn create_node_with(&mut self, mut behavior: impl NodeBehavior) -> NodeId {
        let id = self.create_node();
        behavior.setup(self, id);
        if let Some(node) = self.get_mut(id) {
            node.behavior = Some(Box::new(behavior));
        }
        id
    }

    /// Destroys `node` and its whole subtree, freeing their slots.
    ///
    /// The subtree is detached first, so scene subscriptions are released.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or `node` is a scene root.
    pub fn destroy(&mut self, node: NodeId) {
        assert!(
            !self.node(node).is_scene_root(),
            "cannot destroy a scene root: {node:?}"
        );
        self.detach(node);
        for id in self.descendants(node) {
            self.nodes[id.idx as usize] = None;
            self.generation[id.idx as usize] += 1;
            self.free_list.push(id.idx);
        }
        self.topology_version += 1;
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.generation.get(id.idx as usize) == Some(&id.generation)
            && self.nodes[id.idx as usize].is_some()
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Returns `true` if the tree holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the node, or `None` if the handle is stale.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if self.generation.get(id.idx as usize) != Some(&id.generation) {
            return None;
        }
        self.nodes[id.idx as usize].as_ref()
    }

    /// Returns the node mutably, or `None` if the handle is stale.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.generation.get(id.idx as usize) != Some(&id.generation) {
            return None;
        }
        self.nodes[id.idx as usize].as_mut()
    }

    /// Returns the node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("stale NodeId: {id:?}"),
        }
    }

    /// Returns the node mutably.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("stale NodeId: {id:?}"),
        }
    }

    /// Counter bumped by every structural change.
    #[must_use]
    pub fn topology_version(&self) -> u64 {
        self.topology_version
    }

    // -- Topology API --

    /// Appends `child` to `parent`'s children, detaching it from any previous
    /// parent first.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or `child` is `parent` or one of its
    /// ancestors.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        let len = self.node(parent).children.len();
        self.insert_child(parent, len, child);
    }

    /// Creates a node and appends it to `parent`.
    pub fn add_new_child(&mut self, parent: NodeId) -> NodeId {
        let child = self.create_node();
        self.add_child(parent, child);
        child
    }

    /// Creates a node driven by `behavior` and appends it to `parent`.
    pub fn add_child_with(&mut self, parent: NodeId, behavior: impl NodeBehavior) -> NodeId {
        let child = self.create_node_with(behavior);
        self.add_child(parent, child);
        child
    }

    /// Inserts `child` at `index` in `parent`'s children, detaching it from
    /// any previous parent first. An index past the end appends.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, `child` is a scene root, or `child`
    /// is `parent` or one of its ancestors.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.validate(child);
        assert!(
            !self.node(child).is_scene_root(),
            "cannot attach a scene root: {child:?}"
        );
        assert!(
            child != parent && !self.has_descendant(child, parent),
            "cannot attach {child:?} inside its own subtree"
        );
        self.detach(child);

        let p = self.node_mut(parent);
        let index = index.min(p.children.len());
        p.children.insert(index, child);
        let scene = p.scene;
        self.node_mut(child).parent = Some(parent);
        self.set_scene_recursive(child, scene);
        self.topology_version += 1;
    }

    /// Creates a node and inserts it at `index` in `parent`'s children.
    pub fn insert_new_child(&mut self, parent: NodeId, index: usize) -> NodeId {
        let child = self.create_node();
        self.insert_child(parent, index, child);
        child
    }

    /// Removes `node` from its parent.
    ///
    /// Clears the parent link and the scene of `node` and every descendant.
    /// Does nothing if `node` has no parent.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.node(node).parent else {
            return;
        };
        self.node_mut(parent).children.retain(|&c| c != node);
        self.node_mut(node).parent = None;
        self.set_scene_recursive(node, None);
        self.topology_version += 1;
    }

    /// Detaches `child` if it is a direct child of `parent`.
    ///
    /// Returns whether it was found.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.is_parent_of(parent, child) {
            return false;
        }
        self.detach(child);
        true
    }

    /// Detaches `node` if it is anywhere below `ancestor`.
    ///
    /// Returns whether it was found.
    pub fn remove_descendant(&mut self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.has_descendant(ancestor, node) {
            return false;
        }
        self.detach(node);
        true
    }

    /// Detaches every child of `parent`.
    pub fn clear_children(&mut self, parent: NodeId) {
        for child in self.node(parent).children.clone() {
            self.detach(child);
        }
    }

    /// Reorders `parent`'s children with `compare`. The sort is stable.
    pub fn sort_children(
        &mut self,
        parent: NodeId,
        mut compare: impl FnMut(&Node, &Node) -> Ordering,
    ) {
        let mut children = core::mem::take(&mut self.node_mut(parent).children);
        children.sort_by(|&a, &b| compare(self.node(a), self.node(b)));
        self.node_mut(parent).children = children;
        self.topology_version += 1;
    }

    // -- Queries --

    /// Returns `true` if `child` is a direct child of `parent`.
    #[must_use]
    pub fn is_parent_of(&self, parent: NodeId, child: NodeId) -> bool {
        self.get(child).is_some_and(|c| c.parent == Some(parent))
    }

    /// Returns `true` if `parent` is the direct parent of `child`.
    #[must_use]
    pub fn is_child_of(&self, child: NodeId, parent: NodeId) -> bool {
        self.is_parent_of(parent, child)
    }

    /// Returns `true` if `node` is strictly below `ancestor`.
    #[must_use]
    pub fn has_descendant(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = self.get(node).and_then(|n| n.parent);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// Returns the number of ancestors of `node`.
    #[must_use]
    pub fn hierarchy_level(&self, node: NodeId) -> usize {
        let mut level = 0;
        let mut cursor = self.node(node).parent;
        while let Some(id) = cursor {
            level += 1;
            cursor = self.node(id).parent;
        }
        level
    }

    /// Returns the topmost ancestor of `node` (itself if detached).
    #[must_use]
    pub fn root_of(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(parent) = self.node(current).parent {
            current = parent;
        }
        current
    }

    /// Returns `node` and all of its descendants in pre-order.
    #[must_use]
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(node, |id| out.push(id));
        out
    }

    /// Visits `node` and every descendant in pre-order.
    pub fn walk(&self, node: NodeId, mut f: impl FnMut(NodeId)) {
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Some(n) = self.get(id) else {
                continue;
            };
            f(id);
            stack.extend(n.children.iter().rev().copied());
        }
    }

    /// Returns the product of every ancestor's local matrix and `node`'s own,
    /// root first.
    #[must_use]
    pub fn scene_matrix(&self, node: NodeId) -> Mat4 {
        let n = self.node(node);
        match n.parent {
            Some(parent) => self.scene_matrix(parent) * n.transform.matrix(),
            None => n.transform.matrix(),
        }
    }

    /// Returns the composed scene-space transform of `node`.
    #[must_use]
    pub fn scene_transform(&self, node: NodeId) -> Transform {
        Transform::from_matrix(self.scene_matrix(node))
    }

    /// Maps a point in `node`'s local space to scene space.
    #[must_use]
    pub fn local_to_scene(&self, node: NodeId, point: Vec3) -> Vec3 {
        self.scene_matrix(node).transform_point3(point)
    }

    /// Maps a point in scene space to `node`'s local space.
    #[must_use]
    pub fn scene_to_local(&self, node: NodeId, point: Vec3) -> Vec3 {
        self.scene_matrix(node).inverse().transform_point3(point)
    }

    // -- Component API --

    /// Constructs a `T` and attaches it to `node`.
    ///
    /// # Errors
    ///
    /// Fails if a component with `T`'s tag is already attached or `T`
    /// refuses to construct.
    pub fn create_component<T: ComponentType>(
        &mut self,
        node: NodeId,
    ) -> Result<&mut T, ComponentError> {
        if self.node(node).has_component_tag(T::TAG) {
            return Err(ComponentError::AlreadyAttached(T::TAG));
        }
        let component = T::construct()?;
        self.attach_component(node, T::TAG, Box::new(component));
        self.get_component_mut::<T>(node)
            .ok_or(ComponentError::ConstructionFailed(T::TAG))
    }

    /// Attaches `component` to `node`.
    ///
    /// Returns `None` and drops `component` if a component with the same tag
    /// is already attached.
    pub fn add_component<T: ComponentType>(&mut self, node: NodeId, component: T) -> Option<&mut T> {
        if self.node(node).has_component_tag(T::TAG) {
            return None;
        }
        self.attach_component(node, T::TAG, Box::new(component));
        self.get_component_mut::<T>(node)
    }

    /// Returns the `T` attached to `node`, if any.
    #[must_use]
    pub fn get_component<T: ComponentType>(&self, node: NodeId) -> Option<&T> {
        let component = self.get(node)?.components.get(&T::TAG)?;
        let any: &dyn Any = &**component;
        any.downcast_ref()
    }

    /// Returns the `T` attached to `node` mutably, if any.
    pub fn get_component_mut<T: ComponentType>(&mut self, node: NodeId) -> Option<&mut T> {
        let component = self.get_mut(node)?.components.get_mut(&T::TAG)?;
        let any: &mut dyn Any = &mut **component;
        any.downcast_mut()
    }

    /// Returns the `T` attached to `node`, constructing it first if missing.
    ///
    /// # Errors
    ///
    /// Fails if `T` refuses to construct, or if the tag is taken by a
    /// different type.
    pub fn try_component<T: ComponentType>(&mut self, node: NodeId) -> Result<&mut T, ComponentError> {
        if self.node(node).has_component_tag(T::TAG) {
            return self
                .get_component_mut::<T>(node)
                .ok_or(ComponentError::AlreadyAttached(T::TAG));
        }
        self.create_component::<T>(node)
    }

    /// Returns the `T` attached to `node`, constructing it first if missing.
    ///
    /// # Panics
    ///
    /// Panics if the component cannot be provided; code asking for a
    /// required component treats its absence as a logic error.
    pub fn component<T: ComponentType>(&mut self, node: NodeId) -> &mut T {
        match self.try_component::<T>(node) {
            Ok(component) => component,
            Err(err) => panic!("required component on {node:?}: {err}"),
        }
    }

    /// Detaches and returns the `T` on `node`.
    ///
    /// Called from one of the component's own hooks, this returns `None` and
    /// the component is detached and dropped as soon as the hook returns.
    pub fn remove_component<T: ComponentType>(&mut self, node: NodeId) -> Option<T> {
        if !self.has_component::<T>(node) {
            if let Some(taken) = self
                .taken
                .iter_mut()
                .rev()
                .find(|t| t.node == node && t.tag == T::TAG)
            {
                taken.removed = true;
                if self.get(node).is_some_and(|n| n.scene.is_some()) {
                    self.notices.push(TreeNotice::ComponentRemoved(node, T::TAG));
                }
            }
            return None;
        }
        let entry = self.get_mut(node)?;
        let in_scene = entry.scene.is_some();
        let any: Box<dyn Any> = entry.components.remove(&T::TAG)?;
        let mut component = any.downcast::<T>().ok()?;
        if in_scene {
            component.scene_detached();
            self.notices.push(TreeNotice::ComponentRemoved(node, T::TAG));
        }
        Some(*component)
    }

    /// Returns `true` if a `T` is attached to `node`.
    #[must_use]
    pub fn has_component<T: ComponentType>(&self, node: NodeId) -> bool {
        self.get_component::<T>(node).is_some()
    }

    // -- Internals --

    fn validate(&self, id: NodeId) {
        assert!(
            self.get(id).is_some(),
            "stale NodeId: {id:?} (current gen: {})",
            self.generation.get(id.idx as usize).copied().unwrap_or(u32::MAX)
        );
    }

    fn attach_component(&mut self, node: NodeId, tag: ComponentTag, mut component: Box<dyn Component>) {
        component.attached(node);
        let entry = self.node_mut(node);
        entry.components.insert(tag, component);
        if entry.scene.is_some() {
            self.notices.push(TreeNotice::ComponentAdded(node, tag));
        }
    }

    /// Sets the scene of `node`'s subtree, recording every transition.
    ///
    /// Components hear about leaving a scene immediately; joining is
    /// announced by the scene once it has processed the notices.
    fn set_scene_recursive(&mut self, node: NodeId, scene: Option<SceneId>) {
        for id in self.descendants(node) {
            let n = self.node_mut(id);
            let old = n.scene;
            if old == scene {
                continue;
            }
            n.scene = scene;
            if scene.is_none() {
                n.draw_index = None;
            }
            if old.is_some() {
                for component in n.components.values_mut() {
                    component.scene_detached();
                }
                self.notices.push(TreeNotice::SceneDetached(id));
            }
            if scene.is_some() {
                self.notices.push(TreeNotice::SceneAttached(id));
            }
        }
    }

    pub(crate) fn set_scene_root(&mut self, root: NodeId, scene: SceneId) {
        self.set_scene_recursive(root, Some(scene));
        self.topology_version += 1;
    }

    pub(crate) fn take_component(&mut self, node: NodeId, tag: ComponentTag) -> Option<Box<dyn Component>> {
        let component = self.get_mut(node)?.components.remove(&tag)?;
        self.taken.push(Taken {
            node,
            tag,
            removed: false,
        });
        Some(component)
    }

    /// Puts a component back after a hook ran.
    ///
    /// The component is dropped instead if the node died, if it was removed
    /// during the hook, or if the hook attached a replacement under `tag`.
    pub(crate) fn restore_component(
        &mut self,
        node: NodeId,
        tag: ComponentTag,
        mut component: Box<dyn Component>,
    ) {
        let slot = self.taken.iter().rposition(|t| t.node == node && t.tag == tag);
        let removed = slot.is_some_and(|i| self.taken.remove(i).removed);
        let Some(n) = self.get_mut(node) else {
            return;
        };
        let in_scene = n.scene.is_some();
        match n.components.entry(tag) {
            Entry::Vacant(slot) if !removed => {
                slot.insert(component);
            }
            _ => {
                if in_scene {
                    component.scene_detached();
                }
            }
        }
    }

    /// Runs `f` with the component under `tag` taken out of `node`.
    pub(crate) fn with_component<R>(
        &mut self,
        node: NodeId,
        tag: ComponentTag,
        f: impl FnOnce(&mut dyn Component, &mut Self) -> R,
    ) -> Option<R> {
        let mut component = self.take_component(node, tag)?;
        let result = f(&mut *component, self);
        self.restore_component(node, tag, component);
        Some(result)
    }

    pub(crate) fn set_draw_index(&mut self, node: NodeId, index: usize) {
        let Some(n) = self.get_mut(node) else {
            return;
        };
        if n.draw_index == Some(index) {
            return;
        }
        n.draw_index = Some(index);
        if let Some(behavior) = n.behavior.as_mut() {
            behavior.draw_index_changed(node, index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Bounds;

    #[test]
    fn create_and_destroy() {
        let mut tree = NodeTree::new();
        let id = tree.create_node();
        assert!(tree.is_alive(id), "fresh node is alive");
        tree.destroy(id);
        assert!(!tree.is_alive(id), "destroyed node is dead");
        assert!(tree.is_empty(), "slot freed");
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut tree = NodeTree::new();
        let id1 = tree.create_node();
        tree.destroy(id1);
        let id2 = tree.create_node();
        assert!(!tree.is_alive(id1), "old handle is stale");
        assert!(tree.is_alive(id2), "new handle is live");
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn stale_handle_panics() {
        let mut tree = NodeTree::new();
        let id = tree.create_node();
        tree.destroy(id);
        let _ = tree.node(id);
    }

    #[test]
    fn add_child_reparents() {
        let mut tree = NodeTree::new();
        let a = tree.create_node();
        let b = tree.create_node();
        let c = tree.create_node();
        tree.add_child(a, c);
        tree.add_child(b, c);
        assert!(tree.node(a).children().is_empty(), "left old parent");
        assert_eq!(tree.node(b).children(), &[c]);
        assert!(tree.is_child_of(c, b), "new parent recorded");
    }

    #[test]
    fn insert_child_clamps_index() {
        let mut tree = NodeTree::new();
        let p = tree.create_node();
        let a = tree.add_new_child(p);
        let b = tree.insert_new_child(p, 0);
        let c = tree.insert_new_child(p, 99);
        assert_eq!(tree.node(p).children(), &[b, a, c]);
    }

    #[test]
    #[should_panic(expected = "inside its own subtree")]
    fn cycles_are_rejected() {
        let mut tree = NodeTree::new();
        let a = tree.create_node();
        let b = tree.add_new_child(a);
        tree.add_child(b, a);
    }

    #[test]
    fn remove_child_and_descendant() {
        let mut tree = NodeTree::new();
        let root = tree.create_node();
        let mid = tree.add_new_child(root);
        let leaf = tree.add_new_child(mid);
        assert!(!tree.remove_child(root, leaf), "leaf is not a direct child");
        assert!(tree.remove_descendant(root, leaf), "leaf is a descendant");
        assert_eq!(tree.node(leaf).parent(), None);
        assert!(tree.remove_child(root, mid), "mid is a direct child");
        assert!(!tree.has_descendant(root, mid), "mid detached");
    }

    #[test]
    fn walk_is_pre_order() {
        let mut tree = NodeTree::new();
        let r = tree.create_node();
        let a = tree.add_new_child(r);
        let a1 = tree.add_new_child(a);
        let b = tree.add_new_child(r);
        assert_eq!(tree.descendants(r), vec![r, a, a1, b]);
        assert_eq!(tree.hierarchy_level(a1), 2);
        assert_eq!(tree.root_of(a1), r);
    }

    #[test]
    fn sort_children_by_name() {
        let mut tree = NodeTree::new();
        let p = tree.create_node();
        let z = tree.create_named("z");
        let a = tree.create_named("a");
        tree.add_child(p, z);
        tree.add_child(p, a);
        tree.sort_children(p, |x, y| x.name().cmp(y.name()));
        assert_eq!(tree.node(p).children(), &[a, z]);
    }

    #[test]
    fn scene_transform_composes_parent_first() {
        let mut tree = NodeTree::new();
        let parent = tree.create_node();
        let child = tree.add_new_child(parent);
        tree.node_mut(parent)
            .transform_mut()
            .set_translation(Vec3::new(0.0, 1.0, 0.0));
        tree.node_mut(child)
            .transform_mut()
            .set_translation(Vec3::new(1.0, 0.0, 0.0));
        let p = tree.local_to_scene(child, Vec3::ZERO);
        assert!((p - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6, "got {p:?}");
        let back = tree.scene_to_local(child, p);
        assert!(back.length() < 1e-6, "inverse maps back to origin");
    }

    #[test]
    fn components_are_one_per_tag() {
        let mut tree = NodeTree::new();
        let n = tree.create_node();
        assert!(tree.add_component(n, Bounds::default()).is_some(), "first add");
        assert!(tree.add_component(n, Bounds::default()).is_none(), "second add refused");
        assert_eq!(
            tree.create_component::<Bounds>(n).err(),
            Some(ComponentError::AlreadyAttached(Bounds::TAG))
        );
        assert!(tree.remove_component::<Bounds>(n).is_some(), "removed");
        assert!(!tree.has_component::<Bounds>(n), "gone after removal");
        let _ = tree.component::<Bounds>(n);
        assert!(tree.has_component::<Bounds>(n), "lazily created");
    }

    #[test]
    fn destroy_releases_subtree() {
        let mut tree = NodeTree::new();
        let root = tree.create_node();
        let mid = tree.add_new_child(root);
        let leaf = tree.add_new_child(mid);
        tree.destroy(mid);
        assert!(!tree.is_alive(leaf), "descendant destroyed too");
        assert!(tree.node(root).children().is_empty(), "unlinked from parent");
        assert_eq!(tree.len(), 1);
    }
}
