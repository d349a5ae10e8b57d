// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned extent of a node in its local space.

use glam::Vec3;
use kurbo::Rect;

use super::{Component, ComponentError, ComponentTag, ComponentType};

/// A 3D axis-aligned box in node-local coordinates.
///
/// [`TouchZone`](super::TouchZone) uses the node's `Bounds` as its default
/// hit test. The default box is empty at the origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Bounds {
    /// Creates a box from two corners, in any order.
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a flat box covering `rect` at `z = 0`.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "bounds are stored in f32 like every other node-space quantity"
    )]
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self {
            min: Vec3::new(rect.x0 as f32, rect.y0 as f32, 0.0),
            max: Vec3::new(rect.x1 as f32, rect.y1 as f32, 0.0),
        }
    }

    /// Returns the smallest box containing every point, or `None` if there
    /// are none.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in points {
            bounds.include(p);
        }
        Some(bounds)
    }

    /// Grows the box to contain `point`.
    pub fn include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Moves the box by `delta`.
    pub fn translate(&mut self, delta: Vec3) {
        self.min += delta;
        self.max += delta;
    }

    /// Returns the midpoint.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the extent along each axis.
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns `true` if `point` lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

impl Component for Bounds {}

impl ComponentType for Bounds {
    const TAG: ComponentTag = ComponentTag("trellis.bounds");

    fn construct() -> Result<Self, ComponentError> {
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive() {
        let b = Bounds::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(b.contains(Vec3::new(10.0, 0.0, 0.0)), "edge counts as inside");
        assert!(b.contains(Vec3::new(5.0, 5.0, 0.0)));
        assert!(!b.contains(Vec3::new(5.0, 5.0, 0.5)), "flat box has no depth");
        assert!(!b.contains(Vec3::new(-0.1, 5.0, 0.0)));
    }

    #[test]
    fn from_points_and_include() {
        assert_eq!(Bounds::from_points([]), None);
        let b = Bounds::from_points([
            Vec3::new(1.0, -2.0, 0.0),
            Vec3::new(-1.0, 4.0, 3.0),
            Vec3::ZERO,
        ]);
        assert_eq!(
            b,
            Some(Bounds::new(Vec3::new(-1.0, -2.0, 0.0), Vec3::new(1.0, 4.0, 3.0)))
        );
    }

    #[test]
    fn translate_moves_center_not_size() {
        let mut b = Bounds::new(Vec3::ZERO, Vec3::new(2.0, 4.0, 0.0));
        b.translate(Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(b.center(), Vec3::new(2.0, 3.0, 0.0));
        assert_eq!(b.size(), Vec3::new(2.0, 4.0, 0.0));
    }

    #[test]
    fn new_orders_corners() {
        let b = Bounds::new(Vec3::splat(3.0), Vec3::splat(-3.0));
        assert_eq!(b.min, Vec3::splat(-3.0));
    }
}
