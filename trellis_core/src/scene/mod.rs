// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-window entry point.
//!
//! A [`Scene`] owns a [`NodeTree`] with one root node, a
//! [`TimeoutManager`], a [`Clock`], and three [`InputChannel`]s. The host
//! calls, once per frame:
//!
//! 1. [`Scene::update`]: read the clock, fire due timeouts, run the update
//!    walk from the root.
//! 2. [`Scene::draw`]: run the draw walk from the root, recording the draw
//!    order and assigning draw indices.
//!
//! and forwards raw input through [`Scene::handle_touch_event`] and its
//! mouse/key counterparts. The scene does no routing of its own: each
//! listener on a channel decides whether an event concerns it.
//!
//! ## Draw indices
//!
//! The draw pass numbers every visited node in pre-order, starting with the
//! root at 0. Nodes in a subtree pruned by its draw flag still get an index;
//! their descendants do not. [`Scene::cached_draw_index`] reads the result
//! of the most recent pass and returns `None` once the topology has changed.
//! [`Scene::draw_index`] recomputes the whole order on demand in that case.
//!
//! ## Tree notices
//!
//! Structural edits made through [`Scene::tree_mut`] (or from inside hooks)
//! are reconciled at the next scene entry point: components on nodes that
//! joined the scene get [`Component::scene_attached`] and may subscribe to
//! input; subscriptions of nodes or components that left are dropped.
//!
//! [`Component::scene_attached`]: crate::component::Component::scene_attached

mod channel;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

pub use channel::InputChannel;
pub(crate) use channel::InputChannels;

use crate::callback::Callback;
use crate::clock::Clock;
use crate::component::{ComponentTag, SceneLink};
use crate::event::{KeyEvent, MouseEvent, TouchEvent};
use crate::node::{Node, NodeBehavior, NodeId, NodeTree, SceneId, TreeNotice};
use crate::render::Renderer;
use crate::time::{Duration, HostTime};
use crate::timeout::TimeoutManager;
use crate::trace::{DrawOrderEvent, FrameBeginEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, Tracer};

/// Root ownership, frame entry points, draw order, and input fan-out.
pub struct Scene {
    id: SceneId,
    name: String,
    tree: NodeTree,
    root: NodeId,
    clock: Box<dyn Clock>,
    timeouts: TimeoutManager,
    channels: InputChannels,
    draw_order: Vec<NodeId>,
    /// Topology version the current `draw_order` was computed at.
    indexed_at: Option<u64>,
    frame_index: u64,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("root", &self.root)
            .field("nodes", &self.tree.len())
            .field("timeouts", &self.timeouts.len())
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Creates a scene with an empty root node named `"root"`.
    pub fn new(name: impl Into<String>, clock: impl Clock + 'static) -> Self {
        let mut tree = NodeTree::new();
        let root = tree.create_named("root");
        let id = SceneId::next();
        tree.set_scene_root(root, id);
        log::debug!("scene {id:?} created");
        Self {
            id,
            name: name.into(),
            tree,
            root,
            clock: Box::new(clock),
            timeouts: TimeoutManager::new(),
            channels: InputChannels::default(),
            draw_order: Vec::new(),
            indexed_at: None,
            frame_index: 0,
        }
    }

    /// Creates a scene and runs `setup` on it once.
    pub fn build(
        name: impl Into<String>,
        clock: impl Clock + 'static,
        setup: impl FnOnce(&mut Self),
    ) -> Self {
        let mut scene = Self::new(name, clock);
        setup(&mut scene);
        scene.sync_tree();
        scene
    }

    /// Returns the scene's identity.
    #[must_use]
    pub fn id(&self) -> SceneId {
        self.id
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

    /// Reads the scene's clock.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.clock.now()
    }

    /// Returns the number of updates run so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    // -- Tree API --

    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the node tree.
    #[must_use]
    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Returns the node tree for editing.
    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    /// Returns a node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        self.tree.node(id)
    }

    /// Returns a node for editing.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.tree.node_mut(id)
    }

    /// Appends `node` to the root's children.
    pub fn add_node(&mut self, node: NodeId) {
        self.tree.add_child(self.root, node);
        self.sync_tree();
    }

    /// Creates a node as the root's last child.
    pub fn add_new_node(&mut self) -> NodeId {
        let node = self.tree.add_new_child(self.root);
        self.sync_tree();
        node
    }

    /// Creates a node with `behavior` as the root's last child.
    pub fn add_node_with(&mut self, behavior: impl NodeBehavior) -> NodeId {
        let node = self.tree.add_child_with(self.root, behavior);
        self.sync_tree();
        node
    }

    /// Inserts `node` among the root's children at `index` (clamped).
    pub fn insert_node(&mut self, index: usize, node: NodeId) {
        self.tree.insert_child(self.root, index, node);
        self.sync_tree();
    }

    /// Detaches `node` if it is a direct child of the root.
    pub fn remove_node(&mut self, node: NodeId) -> bool {
        let removed = self.tree.remove_child(self.root, node);
        self.sync_tree();
        removed
    }

    /// Detaches every child of the root.
    pub fn clear_nodes(&mut self) {
        self.tree.clear_children(self.root);
        self.sync_tree();
    }

    /// Returns `true` if `node` is anywhere below the root.
    #[must_use]
    pub fn has_node(&self, node: NodeId) -> bool {
        self.tree.has_descendant(self.root, node)
    }

    /// Returns the root's children.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        self.tree.node(self.root).children()
    }

    /// Visits every node in the scene, root first, in pre-order.
    pub fn for_each_node(&self, f: impl FnMut(NodeId)) {
        self.tree.walk(self.root, f);
    }

    // -- Frame API --

    /// Fires due timeouts, then updates the whole tree.
    pub fn update(&mut self) {
        self.update_traced(&mut Tracer::none());
    }

    /// Like [`update`](Self::update), reporting phases to `tracer`.
    pub fn update_traced(&mut self, tracer: &mut Tracer<'_>) {
        self.sync_tree();
        self.frame_index += 1;
        let frame_index = self.frame_index;
        let now = self.clock.now();
        tracer.frame_begin(&FrameBeginEvent { frame_index, now });

        self.phase(tracer, PhaseKind::Timeouts, |scene, tracer| {
            scene.timeouts.update_timeouts_traced(now, tracer);
        });
        self.phase(tracer, PhaseKind::Update, |scene, _| {
            scene.tree.update_tree(scene.root, now);
        });
    }

    /// Draws the whole tree and records the draw order.
    pub fn draw(&mut self, renderer: &mut dyn Renderer) {
        self.draw_traced(renderer, &mut Tracer::none());
    }

    /// Like [`draw`](Self::draw), reporting the phase and the resulting
    /// draw order to `tracer`.
    pub fn draw_traced(&mut self, renderer: &mut dyn Renderer, tracer: &mut Tracer<'_>) {
        self.sync_tree();
        let now = self.clock.now();
        self.phase(tracer, PhaseKind::Draw, |scene, tracer| {
            scene.draw_order.clear();
            scene
                .tree
                .draw_subtree(scene.root, now, renderer, Some(&mut scene.draw_order));
            scene.indexed_at = Some(scene.tree.topology_version());
            tracer.draw_order(&DrawOrderEvent {
                frame_index: scene.frame_index,
                indexed: count(scene.draw_order.len()),
                forced: false,
            });
        });
    }

    // -- Draw order API --

    /// Returns `node`'s draw index from the most recent pass, or `None` if
    /// the node was not visited or the topology changed since.
    #[must_use]
    pub fn cached_draw_index(&self, node: NodeId) -> Option<usize> {
        if self.indexed_at != Some(self.tree.topology_version()) {
            return None;
        }
        let index = self.tree.get(node)?.last_draw_index()?;
        (self.draw_order.get(index) == Some(&node)).then_some(index)
    }

    /// Returns `node`'s draw index, recomputing every index first if the
    /// cached order is stale.
    ///
    /// Returns `None` for nodes outside this scene and for nodes below a
    /// draw-disabled ancestor.
    pub fn draw_index(&mut self, node: NodeId) -> Option<usize> {
        self.sync_tree();
        if let Some(index) = self.cached_draw_index(node) {
            return Some(index);
        }
        if self.tree.get(node)?.scene() != Some(self.id) {
            return None;
        }
        self.force_assign_draw_indices();
        self.cached_draw_index(node)
    }

    /// Appends `node` to the draw order and returns its new index.
    pub fn next_draw_index(&mut self, node: NodeId) -> usize {
        let index = self.draw_order.len();
        self.draw_order.push(node);
        self.tree.set_draw_index(node, index);
        index
    }

    /// Clears the draw order and renumbers the tree without drawing.
    ///
    /// Follows the draw pass exactly: a draw-disabled node is numbered, its
    /// descendants are not. They report no draw index until they become
    /// drawable, so the forced order always equals what the next
    /// [`draw`](Self::draw) produces. This is not a whole-tree numbering.
    pub fn force_assign_draw_indices(&mut self) {
        self.draw_order.clear();
        let mut stack = Vec::from([self.root]);
        while let Some(node) = stack.pop() {
            let Some(n) = self.tree.get(node) else {
                continue;
            };
            let draw_enabled = n.is_draw_enabled();
            let children = n.children().to_vec();
            self.next_draw_index(node);
            if draw_enabled {
                stack.extend(children.into_iter().rev());
            }
        }
        self.indexed_at = Some(self.tree.topology_version());
        log::trace!(
            "scene {:?}: reassigned {} draw indices",
            self.id,
            self.draw_order.len()
        );
    }

    /// Returns the nodes visited by the most recent draw pass, in order.
    #[must_use]
    pub fn draw_order(&self) -> &[NodeId] {
        &self.draw_order
    }

    // -- Input API --

    /// Broadcasts a touch event on the touch channel.
    pub fn handle_touch_event(&mut self, event: &mut TouchEvent) {
        self.handle_touch_event_traced(event, &mut Tracer::none());
    }

    /// Like [`handle_touch_event`](Self::handle_touch_event), reporting the
    /// phase to `tracer`.
    pub fn handle_touch_event_traced(&mut self, event: &mut TouchEvent, tracer: &mut Tracer<'_>) {
        self.sync_tree();
        self.phase(tracer, PhaseKind::Input, |scene, _| {
            scene.channels.touch.dispatch(&mut scene.tree, event);
        });
    }

    /// Broadcasts a mouse event on the mouse channel.
    pub fn handle_mouse_event(&mut self, event: &mut MouseEvent) {
        self.handle_mouse_event_traced(event, &mut Tracer::none());
    }

    /// Like [`handle_mouse_event`](Self::handle_mouse_event), reporting the
    /// phase to `tracer`.
    pub fn handle_mouse_event_traced(&mut self, event: &mut MouseEvent, tracer: &mut Tracer<'_>) {
        self.sync_tree();
        self.phase(tracer, PhaseKind::Input, |scene, _| {
            scene.channels.mouse.dispatch(&mut scene.tree, event);
        });
    }

    /// Broadcasts a key event on the key channel.
    pub fn handle_key_event(&mut self, event: &mut KeyEvent) {
        self.handle_key_event_traced(event, &mut Tracer::none());
    }

    /// Like [`handle_key_event`](Self::handle_key_event), reporting the phase
    /// to `tracer`.
    pub fn handle_key_event_traced(&mut self, event: &mut KeyEvent, tracer: &mut Tracer<'_>) {
        self.sync_tree();
        self.phase(tracer, PhaseKind::Input, |scene, _| {
            scene.channels.key.dispatch(&mut scene.tree, event);
        });
    }

    /// The touch channel, for connecting closures.
    pub fn touch_events(&mut self) -> &mut InputChannel<TouchEvent> {
        &mut self.channels.touch
    }

    /// The mouse channel, for connecting closures.
    pub fn mouse_events(&mut self) -> &mut InputChannel<MouseEvent> {
        &mut self.channels.mouse
    }

    /// The key channel, for connecting closures.
    pub fn key_events(&mut self) -> &mut InputChannel<KeyEvent> {
        &mut self.channels.key
    }

    // -- Timeout API --

    /// Schedules `callback` to run on the first update at least `delay`
    /// from now. Returns the timeout's name.
    pub fn set_timeout(
        &mut self,
        delay: Duration,
        callback: impl Into<Callback>,
        name: Option<&str>,
    ) -> String {
        let now = self.clock.now();
        self.timeouts
            .set_timeout(now, delay, callback.into(), name)
    }

    /// Cancels every timeout named `name`.
    pub fn cancel_timeout(&mut self, name: &str) -> bool {
        self.timeouts.cancel_timeout(name)
    }

    /// Returns the timeout manager.
    #[must_use]
    pub fn timeouts(&self) -> &TimeoutManager {
        &self.timeouts
    }

    // -- Internals --

    /// Brackets `f` with phase events. Tree notices raised inside `f` are
    /// reconciled before the phase ends.
    fn phase<'t>(
        &mut self,
        tracer: &mut Tracer<'t>,
        phase: PhaseKind,
        f: impl FnOnce(&mut Self, &mut Tracer<'t>),
    ) {
        let frame_index = self.frame_index;
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase,
            timestamp: self.clock.now(),
        });
        f(self, tracer);
        self.sync_tree();
        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase,
            timestamp: self.clock.now(),
        });
    }

    /// Reconciles input subscriptions with the tree notices raised since
    /// the last call.
    fn sync_tree(&mut self) {
        if self.tree.notices.is_empty() {
            return;
        }
        let notices = core::mem::take(&mut self.tree.notices);
        let mut announced: Vec<(NodeId, ComponentTag)> = Vec::new();
        for notice in notices {
            match notice {
                TreeNotice::SceneAttached(node) => {
                    let tags = self
                        .tree
                        .get(node)
                        .map(Node::component_tags)
                        .unwrap_or_default();
                    for tag in tags {
                        self.announce(node, tag, &mut announced);
                    }
                }
                TreeNotice::ComponentAdded(node, tag) => {
                    self.announce(node, tag, &mut announced);
                }
                TreeNotice::SceneDetached(node) => {
                    self.channels.unsubscribe(node, None);
                    announced.retain(|&(n, _)| n != node);
                }
                TreeNotice::ComponentRemoved(node, tag) => {
                    self.channels.unsubscribe(node, Some(tag));
                    announced.retain(|&entry| entry != (node, tag));
                }
            }
        }
    }

    /// Runs `scene_attached` for one component, at most once per batch and
    /// only if its node is still in this scene.
    fn announce(
        &mut self,
        node: NodeId,
        tag: ComponentTag,
        announced: &mut Vec<(NodeId, ComponentTag)>,
    ) {
        let in_scene = self
            .tree
            .get(node)
            .is_some_and(|n| n.scene() == Some(self.id));
        if !in_scene || announced.contains(&(node, tag)) {
            return;
        }
        announced.push((node, tag));
        let scene = self.id;
        let channels = &mut self.channels;
        self.tree.with_component(node, tag, |component, _| {
            channels.unsubscribe(node, Some(tag));
            component.scene_attached(&mut SceneLink {
                scene,
                node,
                tag,
                channels,
            });
        });
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
