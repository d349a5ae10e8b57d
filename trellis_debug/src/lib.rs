// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace sinks for watching a trellis scene run.
//!
//! Pass any of these to [`Tracer::new`](trellis_core::trace::Tracer::new)
//! and hand the tracer to the `_traced` scene entry points:
//!
//! - [`pretty::PrettyPrintSink`] prints a line per event while the scene
//!   runs.
//! - [`recorder::RecorderSink`] keeps a byte recording that
//!   [`recorder::decode`] reads back.
//! - [`chrome::export`] converts a recording for `chrome://tracing`.

pub mod chrome;
pub mod pretty;
pub mod recorder;
