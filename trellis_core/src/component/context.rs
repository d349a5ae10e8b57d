// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arguments handed to component and node hooks.

use core::fmt;

use super::ComponentTag;
use crate::node::{NodeId, NodeTree, SceneId};
use crate::render::Renderer;
use crate::scene::InputChannels;
use crate::time::HostTime;

/// State available during an update hook.
pub struct UpdateContext<'a> {
    /// The tree being walked.
    pub tree: &'a mut NodeTree,
    /// The node whose hook is running.
    pub node: NodeId,
    /// The frame time.
    pub now: HostTime,
}

/// State available during a draw hook.
///
/// The model matrix already includes the node's own transform.
pub struct DrawContext<'a> {
    /// The tree being walked.
    pub tree: &'a mut NodeTree,
    /// The node whose hook is running.
    pub node: NodeId,
    /// The frame time.
    pub now: HostTime,
    /// The host renderer.
    pub renderer: &'a mut dyn Renderer,
}

/// State available while handling an input event.
pub struct EventContext<'a> {
    /// The scene's tree.
    pub tree: &'a mut NodeTree,
    /// The node owning the subscribed component.
    pub node: NodeId,
}

/// Lets a component subscribe to its scene's input channels.
pub struct SceneLink<'a> {
    pub(crate) scene: SceneId,
    pub(crate) node: NodeId,
    pub(crate) tag: ComponentTag,
    pub(crate) channels: &'a mut InputChannels,
}

impl SceneLink<'_> {
    /// Returns the scene the node joined.
    #[must_use]
    pub fn scene(&self) -> SceneId {
        self.scene
    }

    /// Returns the node owning the component.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Routes touch events to the component's
    /// [`touch_event`](super::Component::touch_event). Lower groups run first.
    pub fn subscribe_touch(&mut self, group: i32) {
        self.channels.touch.subscribe(group, self.node, self.tag);
    }

    /// Routes mouse events to the component's
    /// [`mouse_event`](super::Component::mouse_event).
    pub fn subscribe_mouse(&mut self, group: i32) {
        self.channels.mouse.subscribe(group, self.node, self.tag);
    }

    /// Routes key events to the component's
    /// [`key_event`](super::Component::key_event).
    pub fn subscribe_key(&mut self, group: i32) {
        self.channels.key.subscribe(group, self.node, self.tag);
    }
}

impl fmt::Debug for UpdateContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateContext")
            .field("node", &self.node)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for DrawContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawContext")
            .field("node", &self.node)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for EventContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventContext")
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for SceneLink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneLink")
            .field("scene", &self.scene)
            .field("node", &self.node)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}
