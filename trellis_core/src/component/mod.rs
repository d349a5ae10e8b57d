// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capabilities attached to nodes.
//!
//! A node holds at most one component per [`ComponentTag`]. The tag is a
//! stable string each component type declares through [`ComponentType`], so
//! lookup never depends on runtime type reflection.
//!
//! Every hook on [`Component`] has a no-op default. The update and draw walks
//! call them with a context that gives mutable access to the whole
//! [`NodeTree`](crate::node::NodeTree); while a hook runs, the component
//! itself is temporarily out of its node and is put back afterwards.
//!
//! Built-in components:
//!
//! - [`Bounds`]: axis-aligned extent used for hit testing.
//! - [`Timeline`]: drives a set of tweens each update.
//! - [`TouchZone`]: touch press/drag/release state machine.
//! - [`Tint`]: multiplies the global color for a subtree.
//! - [`Image`]: draws a cached texture fitted into a rectangle.

mod bounds;
mod context;
mod image;
mod timeline;
mod tint;
mod touch_zone;

use core::any::Any;
use core::fmt;

pub use bounds::Bounds;
pub use context::{DrawContext, EventContext, SceneLink, UpdateContext};
pub use image::Image;
pub use timeline::Timeline;
pub use tint::Tint;
pub use touch_zone::{TouchZone, TouchZoneConfig, TouchZoneState, ZoneEvent, ZoneEventKind};

use crate::event::{KeyEvent, MouseEvent, TouchEvent};
use crate::node::NodeId;

/// Stable identifier of a component type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTag(pub &'static str);

impl fmt::Display for ComponentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Why a component could not be created or attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentError {
    /// The node already has a component with this tag.
    AlreadyAttached(ComponentTag),
    /// The type refused to construct itself.
    ConstructionFailed(ComponentTag),
}

impl fmt::Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyAttached(tag) => write!(f, "component '{tag}' is already attached"),
            Self::ConstructionFailed(tag) => write!(f, "component '{tag}' could not be constructed"),
        }
    }
}

impl core::error::Error for ComponentError {}

/// A capability attached to a node.
pub trait Component: Any {
    /// Called once when the component is attached to `node`.
    fn attached(&mut self, node: NodeId) {
        _ = node;
    }

    /// Called when the owning node joins a scene, or when the component is
    /// added to a node that is already in one.
    ///
    /// Input subscriptions made through `link` are removed automatically when
    /// the node leaves the scene or the component is removed.
    fn scene_attached(&mut self, link: &mut SceneLink<'_>) {
        _ = link;
    }

    /// Called when the owning node leaves its scene.
    fn scene_detached(&mut self) {}

    /// Called once per update pass.
    fn update(&mut self, cx: &mut UpdateContext<'_>) {
        _ = cx;
    }

    /// Called on entering the node's draw scope, before any component draws.
    fn will_draw(&mut self, cx: &mut DrawContext<'_>) {
        _ = cx;
    }

    /// Called once per draw pass.
    fn draw(&mut self, cx: &mut DrawContext<'_>) {
        _ = cx;
    }

    /// Called after the node's children were drawn.
    fn did_draw(&mut self, cx: &mut DrawContext<'_>) {
        _ = cx;
    }

    /// Receives touch events once subscribed.
    fn touch_event(&mut self, cx: &mut EventContext<'_>, event: &mut TouchEvent) {
        _ = (cx, event);
    }

    /// Receives mouse events once subscribed.
    fn mouse_event(&mut self, cx: &mut EventContext<'_>, event: &mut MouseEvent) {
        _ = (cx, event);
    }

    /// Receives key events once subscribed.
    fn key_event(&mut self, cx: &mut EventContext<'_>, event: &mut KeyEvent) {
        _ = (cx, event);
    }
}

/// A component type with a registered tag.
pub trait ComponentType: Component + Sized {
    /// The tag under which instances are stored on a node.
    const TAG: ComponentTag;

    /// Builds the instance used when a node needs one lazily.
    fn construct() -> Result<Self, ComponentError>;
}

impl fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn Component")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_name_the_tag() {
        let tag = ComponentTag("demo.thing");
        let msg = alloc::format!("{}", ComponentError::ConstructionFailed(tag));
        assert_eq!(msg, "component 'demo.thing' could not be constructed");
    }

    #[test]
    fn tags_order_by_name() {
        assert!(ComponentTag("a") < ComponentTag("b"), "lexicographic");
    }
}
