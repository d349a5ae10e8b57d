// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Press/drag/release tracking for a node-shaped touch target.
//!
//! A [`TouchZone`] subscribes to its scene's touch channel when its node
//! joins a scene. Each routed [`TouchEvent`] is mapped into the node's local
//! space, hit-tested, and fed through a three-state machine:
//!
//! ```text
//!             enable()                 press in bounds
//!   Disabled ─────────► Inactive ────────────────────────► Active
//!      ▲                   ▲  ◄──── release / cancel ──────   │
//!      │                   └──── drag off (if allowed) ──────┘
//!      └──────── disable() (from any state)
//! ```
//!
//! Dragging into the zone without a press reports
//! [`ZoneEventKind::DragInto`] but leaves the state unchanged.

use alloc::boxed::Box;
use core::fmt;

use glam::Vec3;

use super::{
    Bounds, Component, ComponentError, ComponentTag, ComponentType, EventContext, SceneLink,
};
use crate::event::{TouchEvent, TouchKind};
use crate::node::{NodeId, NodeTree};
use crate::signal::Signal;

/// Interaction state of a [`TouchZone`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TouchZoneState {
    /// Ignores all input.
    Disabled,
    /// Enabled, not touched.
    #[default]
    Inactive,
    /// Enabled and pressed.
    Active,
}

/// What a [`ZoneEvent`] reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoneEventKind {
    /// Pressed inside the zone.
    Press,
    /// Released after a press.
    Release,
    /// Dragged into the zone without an active press.
    DragInto,
    /// Dragged while pressed and inside.
    DragInside,
    /// Dragged out of the zone while pressed.
    DragOff,
}

/// A state change reported by a [`TouchZone`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneEvent {
    /// What happened.
    pub kind: ZoneEventKind,
    /// The zone's node.
    pub node: NodeId,
    /// The raw event, as it was before this zone captured it.
    pub touch: TouchEvent,
    /// Touch position in the node's local space.
    pub local_position: Vec3,
    /// Touch position in scene space (`z = 0`).
    pub scene_position: Vec3,
}

/// Behavior switches for a [`TouchZone`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchZoneConfig {
    /// Mark handled events captured, and skip events something else
    /// already captured.
    pub capture: bool,
    /// Drop to [`TouchZoneState::Inactive`] when dragged off while pressed.
    pub allow_losing_focus: bool,
    /// Treat outside as inside, e.g. for tap-away handling.
    pub invert_bounds: bool,
    /// Dispatch group on the scene's touch channel; lower groups see events
    /// first. Read when the node joins a scene.
    pub group: i32,
}

impl Default for TouchZoneConfig {
    fn default() -> Self {
        Self {
            capture: true,
            allow_losing_focus: false,
            invert_bounds: false,
            group: 0,
        }
    }
}

type BoundsTest = Box<dyn Fn(&ZoneEvent) -> bool>;

/// Touch target component.
///
/// Without a custom bounds test the zone hit-tests against the node's
/// [`Bounds`] component, creating an empty one if none is attached.
#[derive(Default)]
pub struct TouchZone {
    state: TouchZoneState,
    config: TouchZoneConfig,
    bounds_test: Option<BoundsTest>,
    events: Signal<ZoneEvent>,
}

impl fmt::Debug for TouchZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TouchZone")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("custom_bounds_test", &self.bounds_test.is_some())
            .field("listeners", &self.events.len())
            .finish()
    }
}

impl TouchZone {
    /// Creates an inactive zone with `config`.
    #[must_use]
    pub fn new(config: TouchZoneConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TouchZoneState {
        self.state
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TouchZoneConfig {
        &self.config
    }

    /// Returns the configuration for editing.
    pub fn config_mut(&mut self) -> &mut TouchZoneConfig {
        &mut self.config
    }

    /// Leaves [`TouchZoneState::Disabled`]. Has no effect in other states.
    pub fn enable(&mut self) {
        if self.state == TouchZoneState::Disabled {
            self.state = TouchZoneState::Inactive;
        }
    }

    /// Ignores input until [`enable`](Self::enable) is called.
    pub fn disable(&mut self) {
        self.state = TouchZoneState::Disabled;
    }

    /// Replaces the hit test. The predicate sees the candidate event with
    /// its kind set to what a hit would report.
    pub fn set_bounds_test(&mut self, test: impl Fn(&ZoneEvent) -> bool + 'static) {
        self.bounds_test = Some(Box::new(test));
    }

    /// Returns to testing against the node's [`Bounds`].
    pub fn use_default_bounds_test(&mut self) {
        self.bounds_test = None;
    }

    /// Returns `true` if a custom hit test is installed.
    #[must_use]
    pub fn has_custom_bounds_test(&self) -> bool {
        self.bounds_test.is_some()
    }

    /// The zone's notifications.
    pub fn events(&mut self) -> &mut Signal<ZoneEvent> {
        &mut self.events
    }

    /// Runs one touch event through the state machine.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "window coordinates fit comfortably in f32"
    )]
    pub fn handle_touch_event(&mut self, tree: &mut NodeTree, node: NodeId, touch: &mut TouchEvent) {
        if self.state == TouchZoneState::Disabled {
            return;
        }
        if touch.captured && self.config.capture {
            return;
        }
        if !tree.is_alive(node) {
            return;
        }

        let scene_position = Vec3::new(touch.position.x as f32, touch.position.y as f32, 0.0);
        let local_position = tree.scene_to_local(node, scene_position);
        let mut event = ZoneEvent {
            kind: self.hit_kind(touch.kind),
            node,
            touch: *touch,
            local_position,
            scene_position,
        };
        let mut in_bounds = match &self.bounds_test {
            Some(test) => test(&event),
            None => tree.component::<Bounds>(node).contains(local_position),
        };
        if self.config.invert_bounds {
            in_bounds = !in_bounds;
        }

        let active = self.state == TouchZoneState::Active;
        let emit = match touch.kind {
            TouchKind::Press if in_bounds => {
                self.capture(touch);
                self.state = TouchZoneState::Active;
                Some(ZoneEventKind::Press)
            }
            TouchKind::Press => None,
            TouchKind::Drag if in_bounds => {
                self.capture(touch);
                Some(if active {
                    ZoneEventKind::DragInside
                } else {
                    ZoneEventKind::DragInto
                })
            }
            TouchKind::Drag if active => {
                if self.config.allow_losing_focus {
                    self.state = TouchZoneState::Inactive;
                }
                Some(ZoneEventKind::DragOff)
            }
            TouchKind::Drag => None,
            TouchKind::Release if active => {
                self.capture(touch);
                self.state = TouchZoneState::Inactive;
                Some(ZoneEventKind::Release)
            }
            TouchKind::Release => {
                self.state = TouchZoneState::Inactive;
                None
            }
            TouchKind::Cancel => {
                self.capture(touch);
                self.state = TouchZoneState::Inactive;
                None
            }
        };

        if let Some(kind) = emit {
            event.kind = kind;
            self.events.emit(&event);
        }
    }

    fn capture(&self, touch: &mut TouchEvent) {
        if self.config.capture {
            touch.captured = true;
        }
    }

    /// The event kind an in-bounds hit would produce.
    fn hit_kind(&self, kind: TouchKind) -> ZoneEventKind {
        match kind {
            TouchKind::Press => ZoneEventKind::Press,
            TouchKind::Drag if self.state == TouchZoneState::Active => ZoneEventKind::DragInside,
            TouchKind::Drag => ZoneEventKind::DragInto,
            TouchKind::Release | TouchKind::Cancel => ZoneEventKind::Release,
        }
    }
}

impl Component for TouchZone {
    fn scene_attached(&mut self, link: &mut SceneLink<'_>) {
        link.subscribe_touch(self.config.group);
    }

    fn touch_event(&mut self, cx: &mut EventContext<'_>, event: &mut TouchEvent) {
        self.handle_touch_event(cx.tree, cx.node, event);
    }
}

impl ComponentType for TouchZone {
    const TAG: ComponentTag = ComponentTag("trellis.touch_zone");

    fn construct() -> Result<Self, ComponentError> {
        Ok(Self::default())
    }
}
