// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing contract the host implements.
//!
//! The scene never talks to a GPU. It drives a [`Renderer`]: a set of matrix
//! stacks (one per [`MatrixKind`]), a global color, a clear, and a texture
//! draw call. Textures and fonts are host objects behind the [`Texture`] and
//! [`Font`] traits, usually kept in a [`ResourceCache`](crate::resource::ResourceCache).
//! [`MatrixStack`] is a complete implementation of the state half of that
//! contract which hosts can embed, and [`MatrixScope`] is the guard the draw
//! walk uses to keep every stack balanced.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::ops::{Deref, DerefMut};

use glam::{Mat4, Quat, Vec3};
use kurbo::{Rect, Size};

use crate::color::Color;

/// Which matrix stack an operation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatrixKind {
    /// Object-to-world.
    Model,
    /// World-to-camera.
    View,
    /// Camera-to-clip.
    Projection,
}

impl MatrixKind {
    const fn index(self) -> usize {
        match self {
            Self::Model => 0,
            Self::View => 1,
            Self::Projection => 2,
        }
    }
}

/// A drawable image owned by the host.
///
/// Hosts downcast through [`Any`] inside [`Renderer::draw_texture`] to reach
/// their concrete texture type.
pub trait Texture: Any {
    /// Returns `false` while the texture has no pixel storage yet.
    fn is_allocated(&self) -> bool;

    /// Returns the texture's size in pixels.
    fn size(&self) -> Size;
}

/// A loaded typeface at one point size, owned by the host.
pub trait Font: Any {
    /// Returns `false` while the font has no glyph data yet.
    fn is_allocated(&self) -> bool;

    /// Returns the file or family name the font was loaded from.
    fn name(&self) -> &str;

    /// Returns the point size the font was rasterized at.
    fn point_size(&self) -> f32;

    /// Returns the font's cache key.
    fn style(&self) -> FontStyle {
        FontStyle::new(self.name(), self.point_size())
    }
}

/// Names a font by file and point size.
///
/// [`key`](Self::key) renders as `file@size`, the name fonts are cached
/// under.
#[derive(Clone, Debug, PartialEq)]
pub struct FontStyle {
    /// File or family name.
    pub file: String,
    /// Point size.
    pub size: f32,
}

impl FontStyle {
    /// Creates a style for `file` at `size` points.
    pub fn new(file: impl Into<String>, size: f32) -> Self {
        Self {
            file: file.into(),
            size,
        }
    }

    /// Returns the `file@size` cache key.
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.file, self.size)
    }
}

/// Matrix, color and draw state supplied by the host.
pub trait Renderer {
    /// Saves the current matrix of `kind`.
    fn push_matrix(&mut self, kind: MatrixKind);

    /// Restores the most recently saved matrix of `kind`.
    fn pop_matrix(&mut self, kind: MatrixKind);

    /// Replaces the current matrix of `kind`.
    fn set_matrix(&mut self, kind: MatrixKind, matrix: Mat4);

    /// Returns the current matrix of `kind`.
    fn matrix(&self, kind: MatrixKind) -> Mat4;

    /// Post-multiplies the current matrix of `kind` by `matrix`.
    fn mult_matrix(&mut self, kind: MatrixKind, matrix: Mat4) {
        let current = self.matrix(kind);
        self.set_matrix(kind, current * matrix);
    }

    /// Returns the color every draw is multiplied by.
    fn global_color(&self) -> Color;

    /// Replaces the global color.
    fn set_global_color(&mut self, color: Color);

    /// Fills the render target with `color`.
    ///
    /// The scene never clears; hosts call this before [`Scene::draw`]. The
    /// default does nothing.
    ///
    /// [`Scene::draw`]: crate::scene::Scene::draw
    fn clear(&mut self, _color: Color) {}

    /// Draws `texture` into `dest` in model space.
    ///
    /// `source` selects a sub-rectangle in texture pixels; `None` draws the
    /// whole texture.
    fn draw_texture(&mut self, texture: &dyn Texture, dest: Rect, source: Option<Rect>);

    /// Translates the model matrix.
    fn translate(&mut self, delta: Vec3) {
        self.mult_matrix(MatrixKind::Model, Mat4::from_translation(delta));
    }

    /// Rotates the model matrix.
    fn rotate(&mut self, rotation: Quat) {
        self.mult_matrix(MatrixKind::Model, Mat4::from_quat(rotation));
    }

    /// Scales the model matrix.
    fn scale(&mut self, scale: Vec3) {
        self.mult_matrix(MatrixKind::Model, Mat4::from_scale(scale));
    }
}

// ---------------------------------------------------------------------------
// MatrixStack
// ---------------------------------------------------------------------------

/// Reference matrix and color state.
///
/// Implements [`Renderer`] with a `draw_texture` that discards its input, so
/// it can stand in for a host when only transforms matter.
#[derive(Clone, Debug)]
pub struct MatrixStack {
    current: [Mat4; 3],
    saved: [Vec<Mat4>; 3],
    global_color: Color,
    underflows: u32,
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self {
            current: [Mat4::IDENTITY; 3],
            saved: [Vec::new(), Vec::new(), Vec::new()],
            global_color: Color::WHITE,
            underflows: 0,
        }
    }
}

impl MatrixStack {
    /// Creates identity state with a white global color.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many matrices of `kind` are currently saved.
    #[must_use]
    pub fn depth(&self, kind: MatrixKind) -> usize {
        self.saved[kind.index()].len()
    }

    /// Returns how many pops found an empty stack.
    #[must_use]
    pub fn underflows(&self) -> u32 {
        self.underflows
    }

    /// Returns `true` if every stack is empty and no pop underflowed.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.underflows == 0 && self.saved.iter().all(Vec::is_empty)
    }
}

impl Renderer for MatrixStack {
    fn push_matrix(&mut self, kind: MatrixKind) {
        let i = kind.index();
        self.saved[i].push(self.current[i]);
    }

    fn pop_matrix(&mut self, kind: MatrixKind) {
        let i = kind.index();
        match self.saved[i].pop() {
            Some(m) => self.current[i] = m,
            None => {
                self.underflows += 1;
                log::warn!("pop of empty {kind:?} matrix stack");
            }
        }
    }

    fn set_matrix(&mut self, kind: MatrixKind, matrix: Mat4) {
        self.current[kind.index()] = matrix;
    }

    fn matrix(&self, kind: MatrixKind) -> Mat4 {
        self.current[kind.index()]
    }

    fn global_color(&self) -> Color {
        self.global_color
    }

    fn set_global_color(&mut self, color: Color) {
        self.global_color = color;
    }

    fn draw_texture(&mut self, texture: &dyn Texture, dest: Rect, source: Option<Rect>) {
        _ = (texture, dest, source);
    }
}

// ---------------------------------------------------------------------------
// MatrixScope
// ---------------------------------------------------------------------------

/// Pushes a matrix on creation and pops it on drop.
///
/// Derefs to the wrapped renderer, so drawing code inside the scope uses it
/// directly and cannot unbalance the stack by returning early.
pub struct MatrixScope<'a> {
    renderer: &'a mut dyn Renderer,
    kind: MatrixKind,
}

impl<'a> MatrixScope<'a> {
    /// Pushes the `kind` matrix of `renderer`.
    pub fn new(renderer: &'a mut dyn Renderer, kind: MatrixKind) -> Self {
        renderer.push_matrix(kind);
        Self { renderer, kind }
    }

    /// Pushes the model matrix of `renderer`.
    pub fn model(renderer: &'a mut dyn Renderer) -> Self {
        Self::new(renderer, MatrixKind::Model)
    }
}

impl Drop for MatrixScope<'_> {
    fn drop(&mut self) {
        self.renderer.pop_matrix(self.kind);
    }
}

impl<'a> Deref for MatrixScope<'a> {
    type Target = dyn Renderer + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.renderer
    }
}

impl DerefMut for MatrixScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.renderer
    }
}

impl fmt::Debug for MatrixScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixScope")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
