// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless doubles for driving trellis scenes without a host.
//!
//! - [`RecordingRenderer`] keeps full matrix and color state and records
//!   every texture draw with the model matrix and color in effect.
//! - [`TouchScript`] builds a timed sequence of touch events and replays it
//!   into a scene or any handler.
//! - [`SceneDriver`] pairs a [`Scene`] with a [`ManualClock`] and a
//!   recording renderer so a test can step frames deterministically.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use glam::Mat4;
use kurbo::{Rect, Size};
use trellis_core::clock::ManualClock;
use trellis_core::color::Color;
use trellis_core::event::{TouchEvent, TouchKind};
use trellis_core::render::{MatrixKind, MatrixStack, Renderer, Texture};
use trellis_core::scene::Scene;
use trellis_core::time::{Duration, HostTime};

// ---------------------------------------------------------------------------
// RecordingRenderer
// ---------------------------------------------------------------------------

/// One recorded [`Renderer::draw_texture`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCall {
    /// Destination rectangle in model space.
    pub dest: Rect,
    /// Source sub-rectangle, if any.
    pub source: Option<Rect>,
    /// Size of the drawn texture.
    pub texture_size: Size,
    /// Model matrix at the time of the call.
    pub model: Mat4,
    /// Global color at the time of the call.
    pub color: Color,
}

/// A [`Renderer`] that records draws and tracks matrix-stack depth.
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    state: MatrixStack,
    draws: Vec<DrawCall>,
    clears: Vec<Color>,
    max_depth: usize,
}

impl RecordingRenderer {
    /// Creates a renderer with identity matrices and a white global color.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the draws recorded so far.
    #[must_use]
    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Removes and returns the recorded draws.
    pub fn take_draws(&mut self) -> Vec<DrawCall> {
        core::mem::take(&mut self.draws)
    }

    /// Returns the colors passed to [`Renderer::clear`], oldest first.
    #[must_use]
    pub fn clears(&self) -> &[Color] {
        &self.clears
    }

    /// Returns the deepest model-matrix stack seen.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns `true` if every push was matched by a pop.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.state.is_balanced()
    }

    /// Returns the underlying matrix state.
    #[must_use]
    pub fn state(&self) -> &MatrixStack {
        &self.state
    }
}

impl Renderer for RecordingRenderer {
    fn push_matrix(&mut self, kind: MatrixKind) {
        self.state.push_matrix(kind);
        if kind == MatrixKind::Model {
            self.max_depth = self.max_depth.max(self.state.depth(kind));
        }
    }

    fn pop_matrix(&mut self, kind: MatrixKind) {
        self.state.pop_matrix(kind);
    }

    fn set_matrix(&mut self, kind: MatrixKind, matrix: Mat4) {
        self.state.set_matrix(kind, matrix);
    }

    fn matrix(&self, kind: MatrixKind) -> Mat4 {
        self.state.matrix(kind)
    }

    fn global_color(&self) -> Color {
        self.state.global_color()
    }

    fn set_global_color(&mut self, color: Color) {
        self.state.set_global_color(color);
    }

    fn clear(&mut self, color: Color) {
        self.clears.push(color);
    }

    fn draw_texture(&mut self, texture: &dyn Texture, dest: Rect, source: Option<Rect>) {
        self.draws.push(DrawCall {
            dest,
            source,
            texture_size: texture.size(),
            model: self.state.matrix(MatrixKind::Model),
            color: self.state.global_color(),
        });
    }
}

// ---------------------------------------------------------------------------
// TouchScript
// ---------------------------------------------------------------------------

/// A scripted sequence of touch events for one contact.
///
/// Events are stamped starting at [`HostTime::ZERO`] and spaced by the
/// interval set with [`every`](Self::every) (16 ms by default).
#[derive(Clone, Debug)]
pub struct TouchScript {
    events: Vec<TouchEvent>,
    id: u64,
    next_time: HostTime,
    interval: Duration,
}

impl Default for TouchScript {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            id: 0,
            next_time: HostTime::ZERO,
            interval: Duration::from_millis(16),
        }
    }
}

impl TouchScript {
    /// Creates an empty script for contact 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `id` for events added from now on.
    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Sets the spacing between events added from now on.
    #[must_use]
    pub fn every(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Appends a press at `(x, y)`.
    #[must_use]
    pub fn press(self, x: f64, y: f64) -> Self {
        self.push(TouchKind::Press, x, y)
    }

    /// Appends a drag to `(x, y)`.
    #[must_use]
    pub fn drag(self, x: f64, y: f64) -> Self {
        self.push(TouchKind::Drag, x, y)
    }

    /// Appends a release at `(x, y)`.
    #[must_use]
    pub fn release(self, x: f64, y: f64) -> Self {
        self.push(TouchKind::Release, x, y)
    }

    /// Appends a host cancel at `(x, y)`.
    #[must_use]
    pub fn cancel(self, x: f64, y: f64) -> Self {
        self.push(TouchKind::Cancel, x, y)
    }

    /// Returns the scripted events.
    #[must_use]
    pub fn events(&self) -> &[TouchEvent] {
        &self.events
    }

    /// Returns the number of scripted events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing is scripted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sends every event through `scene` in order and returns them as the
    /// listeners left them.
    pub fn play(&self, scene: &mut Scene) -> Vec<TouchEvent> {
        self.play_with(|event| scene.handle_touch_event(event))
    }

    /// Sends every event through `handler` in order and returns them as the
    /// handler left them.
    pub fn play_with(&self, mut handler: impl FnMut(&mut TouchEvent)) -> Vec<TouchEvent> {
        self.events
            .iter()
            .map(|event| {
                let mut event = *event;
                handler(&mut event);
                event
            })
            .collect()
    }

    fn push(mut self, kind: TouchKind, x: f64, y: f64) -> Self {
        let event = TouchEvent::new(kind, (x, y))
            .with_id(self.id)
            .at(self.next_time);
        self.events.push(event);
        self.next_time += self.interval;
        self
    }
}

// ---------------------------------------------------------------------------
// SceneDriver
// ---------------------------------------------------------------------------

/// A scene on a manual clock, drawn into a [`RecordingRenderer`].
#[derive(Debug)]
pub struct SceneDriver {
    scene: Scene,
    clock: ManualClock,
    renderer: RecordingRenderer,
}

impl SceneDriver {
    /// Creates a driver around an empty scene at [`HostTime::ZERO`].
    pub fn new(name: &str) -> Self {
        Self::build(name, |_| {})
    }

    /// Creates a driver and runs `setup` on its scene.
    pub fn build(name: &str, setup: impl FnOnce(&mut Scene)) -> Self {
        let clock = ManualClock::new();
        let scene = Scene::build(name, clock.clone(), setup);
        Self {
            scene,
            clock,
            renderer: RecordingRenderer::new(),
        }
    }

    /// Returns the scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Returns the scene mutably.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Returns a handle to the scene's clock.
    #[must_use]
    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Returns the renderer every frame draws into.
    #[must_use]
    pub fn renderer(&self) -> &RecordingRenderer {
        &self.renderer
    }

    /// Runs one update and one draw at the current clock time.
    pub fn frame(&mut self) {
        self.scene.update();
        self.scene.draw(&mut self.renderer);
    }

    /// Advances the clock by `by`, then runs a frame.
    pub fn step(&mut self, by: Duration) {
        self.clock.advance(by);
        self.frame();
    }

    /// Advances the clock by `millis` milliseconds, then runs a frame.
    pub fn step_millis(&mut self, millis: u64) {
        self.step(Duration::from_millis(millis));
    }

    /// Runs `frames` frames spaced by `interval`.
    pub fn run(&mut self, frames: usize, interval: Duration) {
        for _ in 0..frames {
            self.step(interval);
        }
    }
}
