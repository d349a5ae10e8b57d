// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node tree data model.
//!
//! A *node* is an entry in a scene's tree. Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is destroyed.
//! - Topology: an optional parent, an ordered child list, and the
//!   [`SceneId`] of the scene it currently belongs to. A node's scene always
//!   matches its parent's; attaching and detaching update the whole subtree.
//! - A local [`Transform`], update/draw enable flags, and the draw index it
//!   received in the most recent draw pass.
//! - At most one [`Component`] per [`ComponentTag`].
//! - Optional per-node behavior: a [`NodeBehavior`] object and/or closures
//!   that replace its update and draw hooks.
//! - Lifecycle [`NodeSignals`].
//!
//! Nodes live in a [`NodeTree`] arena. Links between nodes are plain handles;
//! the arena alone owns node storage. A detached node keeps its slot until
//! [`NodeTree::destroy`] is called.

mod id;
mod tree;
mod walk;

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

pub use id::{NodeId, SceneId};
pub use tree::NodeTree;
pub(crate) use tree::TreeNotice;

use crate::component::{Component, ComponentTag, DrawContext, UpdateContext};
use crate::signal::Signal;
use crate::transform::Transform;

/// Structural per-node behavior.
///
/// Implement this for node "kinds" that need their own update or draw logic.
/// A closure set with [`Node::set_update_fn`] or [`Node::set_draw_fn`] takes
/// precedence over the corresponding method.
pub trait NodeBehavior: Any {
    /// Runs once, right after the node is created.
    fn setup(&mut self, tree: &mut NodeTree, node: NodeId) {
        _ = (tree, node);
    }

    /// Runs after the node's components have updated.
    fn update(&mut self, cx: &mut UpdateContext<'_>) {
        _ = cx;
    }

    /// Runs after the node's components have drawn.
    fn draw(&mut self, cx: &mut DrawContext<'_>) {
        _ = cx;
    }

    /// Runs when the node's draw index changes.
    fn draw_index_changed(&mut self, node: NodeId, index: usize) {
        _ = (node, index);
    }
}

impl fmt::Debug for dyn NodeBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn NodeBehavior")
    }
}

/// Lifecycle notifications raised by the update and draw walks.
///
/// Every signal carries the id of the node being walked.
#[derive(Debug, Default)]
pub struct NodeSignals {
    /// Before the node's components update.
    pub will_update: Signal<NodeId>,
    /// Before the node's children update.
    pub will_update_children: Signal<NodeId>,
    /// After the node's children updated.
    pub did_update_children: Signal<NodeId>,
    /// After the whole subtree updated.
    pub did_update: Signal<NodeId>,
    /// Before the node's components draw.
    pub will_draw: Signal<NodeId>,
    /// Before the node's children draw.
    pub will_draw_children: Signal<NodeId>,
    /// After the node's children drew.
    pub did_draw_children: Signal<NodeId>,
    /// After the whole subtree drew.
    pub did_draw: Signal<NodeId>,
}

pub(crate) type UpdateFn = Box<dyn FnMut(&mut UpdateContext<'_>)>;
pub(crate) type DrawFn = Box<dyn FnMut(&mut DrawContext<'_>)>;

/// A single entry in a [`NodeTree`].
pub struct Node {
    pub(crate) name: String,
    pub(crate) transform: Transform,
    pub(crate) update_enabled: bool,
    pub(crate) draw_enabled: bool,
    pub(crate) draw_index: Option<usize>,
    pub(crate) components: BTreeMap<ComponentTag, Box<dyn Component>>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) scene: Option<SceneId>,
    pub(crate) behavior: Option<Box<dyn NodeBehavior>>,
    pub(crate) update_fn: Option<UpdateFn>,
    pub(crate) draw_fn: Option<DrawFn>,
    pub(crate) signals: NodeSignals,
}

impl Node {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            transform: Transform::default(),
            update_enabled: true,
            draw_enabled: true,
            draw_index: None,
            components: BTreeMap::new(),
            children: Vec::new(),
            parent: None,
            scene: None,
            behavior: None,
            update_fn: None,
            draw_fn: None,
            signals: NodeSignals::default(),
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the display name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the local transform.
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Returns the local transform for editing.
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Replaces the local transform.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Returns whether the update walk visits this subtree.
    #[must_use]
    pub fn is_update_enabled(&self) -> bool {
        self.update_enabled
    }

    /// Includes or prunes this subtree from the update walk.
    pub fn set_update_enabled(&mut self, enabled: bool) {
        self.update_enabled = enabled;
    }

    /// Returns whether the draw walk draws this subtree.
    #[must_use]
    pub fn is_draw_enabled(&self) -> bool {
        self.draw_enabled
    }

    /// Includes or prunes this subtree from the draw walk.
    pub fn set_draw_enabled(&mut self, enabled: bool) {
        self.draw_enabled = enabled;
    }

    /// Returns the index assigned in the most recent draw pass, if any.
    ///
    /// May be stale; [`Scene::draw_index`](crate::scene::Scene::draw_index)
    /// returns an up-to-date value.
    #[must_use]
    pub fn last_draw_index(&self) -> Option<usize> {
        self.draw_index
    }

    /// Returns the parent, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the children in draw order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns the scene this node belongs to, if any.
    #[must_use]
    pub fn scene(&self) -> Option<SceneId> {
        self.scene
    }

    /// Returns `true` if the node is the root of a scene.
    #[must_use]
    pub fn is_scene_root(&self) -> bool {
        self.parent.is_none() && self.scene.is_some()
    }

    /// Returns `true` if a component with `tag` is attached.
    #[must_use]
    pub fn has_component_tag(&self, tag: ComponentTag) -> bool {
        self.components.contains_key(&tag)
    }

    /// Returns the tags of every attached component, in tag order.
    #[must_use]
    pub fn component_tags(&self) -> Vec<ComponentTag> {
        self.components.keys().copied().collect()
    }

    /// Returns the lifecycle signals.
    #[must_use]
    pub fn signals(&self) -> &NodeSignals {
        &self.signals
    }

    /// Returns the lifecycle signals for connecting listeners.
    pub fn signals_mut(&mut self) -> &mut NodeSignals {
        &mut self.signals
    }

    /// Returns the behavior object if it is a `B`.
    #[must_use]
    pub fn behavior<B: NodeBehavior>(&self) -> Option<&B> {
        let any: &dyn Any = &**self.behavior.as_ref()?;
        any.downcast_ref()
    }

    /// Returns the behavior object mutably if it is a `B`.
    pub fn behavior_mut<B: NodeBehavior>(&mut self) -> Option<&mut B> {
        let any: &mut dyn Any = &mut **self.behavior.as_mut()?;
        any.downcast_mut()
    }

    /// Replaces the update hook with `f` for this node only.
    pub fn set_update_fn(&mut self, f: impl FnMut(&mut UpdateContext<'_>) + 'static) {
        self.update_fn = Some(Box::new(f));
    }

    /// Restores the behavior's update hook.
    pub fn clear_update_fn(&mut self) {
        self.update_fn = None;
    }

    /// Replaces the draw hook with `f` for this node only.
    pub fn set_draw_fn(&mut self, f: impl FnMut(&mut DrawContext<'_>) + 'static) {
        self.draw_fn = Some(Box::new(f));
    }

    /// Restores the behavior's draw hook.
    pub fn clear_draw_fn(&mut self) {
        self.draw_fn = None;
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("scene", &self.scene)
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .field("update_enabled", &self.update_enabled)
            .field("draw_enabled", &self.draw_enabled)
            .field("draw_index", &self.draw_index)
            .finish_non_exhaustive()
    }
}
