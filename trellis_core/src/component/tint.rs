// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Component, ComponentError, ComponentTag, ComponentType, DrawContext};
use crate::color::Color;

/// Multiplies the renderer's global color for the node and its subtree.
///
/// The previous global color is restored once the subtree has drawn, so
/// nested tints compose.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tint {
    /// The multiplier.
    pub color: Color,
    saved: Option<Color>,
}

impl Tint {
    /// Creates a tint with `color`.
    #[must_use]
    pub fn new(color: Color) -> Self {
        Self { color, saved: None }
    }
}

impl Component for Tint {
    fn will_draw(&mut self, cx: &mut DrawContext<'_>) {
        let current = cx.renderer.global_color();
        self.saved = Some(current);
        cx.renderer.set_global_color(current * self.color);
    }

    fn did_draw(&mut self, cx: &mut DrawContext<'_>) {
        if let Some(saved) = self.saved.take() {
            cx.renderer.set_global_color(saved);
        }
    }
}

impl ComponentType for Tint {
    const TAG: ComponentTag = ComponentTag("trellis.tint");

    fn construct() -> Result<Self, ComponentError> {
        Ok(Self::default())
    }
}
