// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structured events describing what a scene did during a frame.
//!
//! The `_traced` scene entry points report frame starts, phase boundaries,
//! fired timeouts, callback faults and draw-order rebuilds to a
//! [`TraceSink`]. They reach the sink through a [`Tracer`], which holds
//! nothing and does nothing unless the `trace` feature is enabled.
//!
//! Tracing is separate from the `log` diagnostics: log records describe
//! faults for humans, trace events are structured data for tooling.

use crate::time::HostTime;

/// Which stage of the frame is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Firing due timeouts.
    Timeouts,
    /// The update walk.
    Update,
    /// The draw walk.
    Draw,
    /// Dispatching one input event.
    Input,
}

/// What kind of user callback faulted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultSource {
    /// A timeout callback.
    Timeout,
}

/// Emitted when the scene starts an update.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Frames started so far, this one included.
    pub frame_index: u64,
    /// Clock reading for this frame.
    pub now: HostTime,
}

/// Marks the beginning of a frame phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Clock reading at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a frame phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Clock reading at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted after a timeout callback ran.
#[derive(Clone, Copy, Debug)]
pub struct TimeoutFiredEvent<'a> {
    /// The timeout's name.
    pub name: &'a str,
    /// When the timeout was due.
    pub due: HostTime,
    /// When it actually fired.
    pub fired_at: HostTime,
}

/// Emitted when a user callback reported a fault and was discarded.
#[derive(Clone, Copy, Debug)]
pub struct CallbackFaultEvent<'a> {
    /// Where the callback was registered.
    pub source: FaultSource,
    /// Name of the owning timeout.
    pub name: &'a str,
    /// The fault's description.
    pub message: &'a str,
    /// Clock reading when the fault was observed.
    pub at: HostTime,
}

/// Emitted after draw indices were assigned.
#[derive(Clone, Copy, Debug)]
pub struct DrawOrderEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// How many nodes received an index.
    pub indexed: u32,
    /// `true` if this was an on-demand recompute rather than a draw pass.
    pub forced: bool,
}

/// Consumer of scene trace events.
///
/// Every method defaults to ignoring its event.
pub trait TraceSink {
    /// Called when a scene update starts.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called at the beginning of a frame phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a frame phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after a timeout fired.
    fn on_timeout_fired(&mut self, e: &TimeoutFiredEvent<'_>) {
        _ = e;
    }

    /// Called when a callback faulted.
    fn on_callback_fault(&mut self, e: &CallbackFaultEvent<'_>) {
        _ = e;
    }

    /// Called after draw indices were assigned.
    fn on_draw_order(&mut self, e: &DrawOrderEvent) {
        _ = e;
    }
}

/// A sink that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// Optional handle to a [`TraceSink`], passed down through a frame.
///
/// Without the `trace` feature this is a zero-sized marker and every method
/// is empty.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Reports to `sink`.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(not(feature = "trace"))]
        let _ = sink;
        Self {
            #[cfg(feature = "trace")]
            sink: Some(sink),
            #[cfg(not(feature = "trace"))]
            _marker: core::marker::PhantomData,
        }
    }

    /// Reports nowhere.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self {
            #[cfg(feature = "trace")]
            sink: None,
            #[cfg(not(feature = "trace"))]
            _marker: core::marker::PhantomData,
        }
    }

    #[inline]
    fn emit(&mut self, f: impl FnOnce(&mut dyn TraceSink)) {
        #[cfg(feature = "trace")]
        if let Some(sink) = self.sink.as_deref_mut() {
            f(sink);
        }
        #[cfg(not(feature = "trace"))]
        let _ = f;
    }

    /// Reports a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        self.emit(|s| s.on_frame_begin(e));
    }

    /// Reports a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.emit(|s| s.on_phase_begin(e));
    }

    /// Reports a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        self.emit(|s| s.on_phase_end(e));
    }

    /// Reports a [`TimeoutFiredEvent`].
    #[inline]
    pub fn timeout_fired(&mut self, e: &TimeoutFiredEvent<'_>) {
        self.emit(|s| s.on_timeout_fired(e));
    }

    /// Reports a [`CallbackFaultEvent`].
    #[inline]
    pub fn callback_fault(&mut self, e: &CallbackFaultEvent<'_>) {
        self.emit(|s| s.on_callback_fault(e));
    }

    /// Reports a [`DrawOrderEvent`].
    #[inline]
    pub fn draw_order(&mut self, e: &DrawOrderEvent) {
        self.emit(|s| s.on_draw_order(e));
    }
}
