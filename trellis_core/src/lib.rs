// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene graph with frame-driven update, draw, tweening, and touch routing.
//!
//! `trellis_core` sits between a host graphics framework (which owns the
//! window, GPU context, and raw input) and application code that wants a tree
//! of positioned, animatable, event-responsive nodes. It is `no_std`
//! compatible (with `alloc`); nodes live in a generational arena addressed by
//! [`NodeId`](node::NodeId) handles.
//!
//! # Architecture
//!
//! The host drives one [`Scene`](scene::Scene) per window:
//!
//! ```text
//!   Host frame callback
//!       │
//!       ▼
//!   Scene::update() ──► TimeoutManager::update_timeouts()
//!       │
//!       └──► update walk (pre-order) ──► components ──► node hook ──► children
//!                                        (Timeline advances Tweens)
//!
//!   Scene::draw(renderer) ──► draw walk (pre-order, MatrixScope per node)
//!                                 │
//!                                 └──► draw order / draw indices
//!
//!   Host input ──► Scene::handle_touch_event() ──► InputChannel (by group)
//!                                                      │
//!                                                      ▼
//!                                         TouchZone ──► ZoneEvent signal
//! ```
//!
//! **[`node`]**: Arena-backed node tree: hierarchy mutation, transforms,
//! per-node components, lifecycle signals, and the update walk.
//!
//! **[`scene`]**: Root ownership, the frame entry points, draw-order
//! tracking, and input fan-out.
//!
//! **[`component`]**: The [`Component`](component::Component) capability
//! contract plus the built-in components: [`Bounds`](component::Bounds),
//! [`Timeline`](component::Timeline), [`TouchZone`](component::TouchZone),
//! [`Tint`](component::Tint), and [`Image`](component::Image).
//!
//! **[`timer`]**, **[`timeout`]**, **[`tween`]**, **[`easing`]**: The timed
//! interpolation engine. All time queries take an explicit
//! [`HostTime`](time::HostTime) supplied by a [`Clock`](clock::Clock).
//!
//! **[`render`]**: The [`Renderer`](render::Renderer) contract the host
//! implements, with a reference [`MatrixStack`](render::MatrixStack) and the
//! [`MatrixScope`](render::MatrixScope) guard.
//!
//! **[`signal`]**, **[`callback`]**: Grouped listener lists (the scene's
//! [`InputChannel`](scene::InputChannel) is built on them) and fallible
//! one-shot callbacks.
//!
//! **[`layout`]**, **[`resource`]**: Fit/alignment math for images and the
//! name-keyed cache their textures come from.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies and
//!   [`SystemClock`](clock::SystemClock).
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `json` (disabled by default): Enables the [`json`] conversions for math
//!   types via `serde_json`.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod callback;
pub mod clock;
pub mod color;
pub mod component;
pub mod easing;
pub mod event;
#[cfg(feature = "json")]
pub mod json;
pub mod layout;
pub mod node;
pub mod render;
pub mod resource;
pub mod scene;
pub mod signal;
pub mod time;
pub mod timeout;
pub mod timer;
pub mod trace;
pub mod transform;
pub mod tween;
