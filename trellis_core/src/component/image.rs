// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;

use kurbo::{Rect, Size};

use super::{Component, ComponentError, ComponentTag, ComponentType, DrawContext};
use crate::layout::{FitMode, HorzAlign, Placement, VertAlign, place};
use crate::render::Texture;
use crate::resource::SharedCache;

/// Draws a named texture from a shared cache, fitted into a rectangle.
///
/// Missing or unallocated textures are skipped; nothing is drawn until the
/// cache can provide them.
pub struct Image<T: Texture> {
    cache: SharedCache<T>,
    /// Cache key of the texture.
    pub texture_name: String,
    /// Target rectangle in node-local space.
    pub bounds: Rect,
    /// How the texture is scaled into `bounds`.
    pub fit: FitMode,
    /// Horizontal alignment within `bounds`.
    pub h_align: HorzAlign,
    /// Vertical alignment within `bounds`.
    pub v_align: VertAlign,
    /// Clip the texture to `bounds`.
    pub crop: bool,
}

impl<T: Texture> fmt::Debug for Image<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("texture_name", &self.texture_name)
            .field("bounds", &self.bounds)
            .field("fit", &self.fit)
            .field("h_align", &self.h_align)
            .field("v_align", &self.v_align)
            .field("crop", &self.crop)
            .finish_non_exhaustive()
    }
}

impl<T: Texture> Image<T> {
    /// Creates an unscaled, top-left aligned image of `texture_name`.
    pub fn new(cache: &SharedCache<T>, texture_name: impl Into<String>, bounds: Rect) -> Self {
        Self {
            cache: Rc::clone(cache),
            texture_name: texture_name.into(),
            bounds,
            fit: FitMode::None,
            h_align: HorzAlign::Left,
            v_align: VertAlign::Top,
            crop: false,
        }
    }

    /// Returns the image with a different fit mode.
    #[must_use]
    pub fn with_fit(mut self, fit: FitMode) -> Self {
        self.fit = fit;
        self
    }

    /// Returns the image with different alignment.
    #[must_use]
    pub fn with_align(mut self, h: HorzAlign, v: VertAlign) -> Self {
        self.h_align = h;
        self.v_align = v;
        self
    }

    /// Returns the image with cropping switched on or off.
    #[must_use]
    pub fn with_crop(mut self, crop: bool) -> Self {
        self.crop = crop;
        self
    }

    /// Returns the rectangle the texture currently covers, or `bounds` when
    /// the texture is not drawable.
    #[must_use]
    pub fn draw_bounds(&self) -> Rect {
        self.drawable()
            .map_or(self.bounds, |texture| self.placement(texture.size()).dest)
    }

    fn placement(&self, size: Size) -> Placement {
        place(size, self.bounds, self.fit, self.h_align, self.v_align, self.crop)
    }

    fn drawable(&self) -> Option<Rc<T>> {
        let Ok(cache) = self.cache.try_borrow() else {
            log::debug!("image '{}': texture cache is busy", self.texture_name);
            return None;
        };
        let Some(texture) = cache.get(&self.texture_name) else {
            log::debug!("image '{}': texture not in cache", self.texture_name);
            return None;
        };
        if !texture.is_allocated() {
            log::debug!("image '{}': texture not allocated", self.texture_name);
            return None;
        }
        Some(texture)
    }
}

impl<T: Texture> Component for Image<T> {
    fn draw(&mut self, cx: &mut DrawContext<'_>) {
        let Some(texture) = self.drawable() else {
            return;
        };
        let placement = self.placement(texture.size());
        cx.renderer
            .draw_texture(&*texture, placement.dest, placement.source);
    }
}

impl<T: Texture> ComponentType for Image<T> {
    const TAG: ComponentTag = ComponentTag("trellis.image");

    /// Images need a cache, so they are never created lazily.
    fn construct() -> Result<Self, ComponentError> {
        Err(ComponentError::ConstructionFailed(Self::TAG))
    }
}
