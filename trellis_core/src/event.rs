// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw input events delivered by the host.
//!
//! Each event carries the host timestamp and a `captured` flag. Listeners set
//! the flag to tell later listeners in the same dispatch that the event has
//! been consumed; dispatch itself never stops early.

use kurbo::{Point, Size};

use crate::time::HostTime;

/// Phase of a touch contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TouchKind {
    /// Contact began.
    Press,
    /// Contact moved.
    Drag,
    /// Contact ended.
    Release,
    /// The host aborted the contact.
    Cancel,
}

/// A single touch contact update, in window space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchEvent {
    /// Phase of the contact.
    pub kind: TouchKind,
    /// Host identifier of the contact, stable for its lifetime.
    pub id: u64,
    /// Position in window space.
    pub position: Point,
    /// Contact ellipse size.
    pub size: Size,
    /// Contact ellipse angle in degrees, `0..360`.
    pub angle: f32,
    /// Pressure as reported by the host.
    pub pressure: f32,
    /// Set once a listener has consumed the event.
    pub captured: bool,
    /// When the host observed the event.
    pub time: HostTime,
}

impl TouchEvent {
    /// Creates an uncaptured event for contact 0 with zero size and pressure.
    #[must_use]
    pub fn new(kind: TouchKind, position: impl Into<Point>) -> Self {
        Self {
            kind,
            id: 0,
            position: position.into(),
            size: Size::ZERO,
            angle: 0.0,
            pressure: 0.0,
            captured: false,
            time: HostTime::ZERO,
        }
    }

    /// Returns the event with a different contact id.
    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Returns the event stamped with `time`.
    #[must_use]
    pub fn at(mut self, time: HostTime) -> Self {
        self.time = time;
        self
    }
}

/// What a mouse event reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseKind {
    /// Pointer moved with no button held.
    Move,
    /// A button went down.
    Press,
    /// Pointer moved with a button held.
    Drag,
    /// A button went up.
    Release,
    /// Wheel scrolled up.
    ScrollUp,
    /// Wheel scrolled down.
    ScrollDown,
}

/// Mouse button identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
    /// Any further button, by host index.
    Other(u16),
}

/// A mouse update, in window space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseEvent {
    /// What happened.
    pub kind: MouseKind,
    /// Pointer position in window space.
    pub position: Point,
    /// The button involved, if any.
    pub button: Option<MouseButton>,
    /// Set once a listener has consumed the event.
    pub captured: bool,
    /// When the host observed the event.
    pub time: HostTime,
}

impl MouseEvent {
    /// Creates an uncaptured event with no button.
    #[must_use]
    pub fn new(kind: MouseKind, position: impl Into<Point>) -> Self {
        Self {
            kind,
            position: position.into(),
            button: None,
            captured: false,
            time: HostTime::ZERO,
        }
    }

    /// Returns the event with `button` attached.
    #[must_use]
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = Some(button);
        self
    }
}

/// Key transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Key went down.
    Press,
    /// Key went up.
    Release,
}

/// A keyboard update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Press or release.
    pub kind: KeyKind,
    /// Host key code.
    pub key: i32,
    /// Set once a listener has consumed the event.
    pub captured: bool,
    /// When the host observed the event.
    pub time: HostTime,
}

impl KeyEvent {
    /// Creates an uncaptured key event.
    #[must_use]
    pub fn new(kind: KeyKind, key: i32) -> Self {
        Self {
            kind,
            key,
            captured: false,
            time: HostTime::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_builder_defaults() {
        let e = TouchEvent::new(TouchKind::Press, (3.0, 4.0))
            .with_id(9)
            .at(HostTime::from_millis(2));
        assert_eq!(e.position, Point::new(3.0, 4.0));
        assert_eq!(e.id, 9);
        assert!(!e.captured, "new events start uncaptured");
        assert_eq!(e.time, HostTime::from_millis(2));
    }

    #[test]
    fn mouse_button_is_optional() {
        let e = MouseEvent::new(MouseKind::Move, Point::ORIGIN);
        assert_eq!(e.button, None);
        let e = e.with_button(MouseButton::Other(4));
        assert_eq!(e.button, Some(MouseButton::Other(4)));
    }
}
