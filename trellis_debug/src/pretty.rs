// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are printed in milliseconds.

use std::io::Write;

use trellis_core::time::HostTime;
use trellis_core::trace::{
    CallbackFaultEvent, DrawOrderEvent, FaultSource, FrameBeginEvent, PhaseBeginEvent,
    PhaseEndEvent, PhaseKind, TimeoutFiredEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn ms(t: HostTime) -> f64 {
    t.nanos() as f64 / 1_000_000.0
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Timeouts => "timeouts",
        PhaseKind::Update => "update",
        PhaseKind::Draw => "draw",
        PhaseKind::Input => "input",
    }
}

fn source_name(source: FaultSource) -> &'static str {
    match source {
        FaultSource::Timeout => "timeout",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] frame={} now={:.3}ms",
            e.frame_index,
            ms(e.now),
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {:.3}ms",
            e.frame_index,
            phase_name(e.phase),
            ms(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {:.3}ms",
            e.frame_index,
            phase_name(e.phase),
            ms(e.timestamp),
        );
    }

    fn on_timeout_fired(&mut self, e: &TimeoutFiredEvent<'_>) {
        let late = e.fired_at.saturating_duration_since(e.due);
        let _ = writeln!(
            self.writer,
            "[timeout] '{}' due={:.3}ms late={:.3}ms",
            e.name,
            ms(e.due),
            late.as_millis_f64(),
        );
    }

    fn on_callback_fault(&mut self, e: &CallbackFaultEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[fault] {} '{}' at {:.3}ms: {}",
            source_name(e.source),
            e.name,
            ms(e.at),
            e.message,
        );
    }

    fn on_draw_order(&mut self, e: &DrawOrderEvent) {
        let how = if e.forced { "forced" } else { "draw" };
        let _ = writeln!(
            self.writer,
            "[order] frame={} indexed={} ({how})",
            e.frame_index, e.indexed,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_print_phase() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_phase_begin(&PhaseBeginEvent {
            frame_index: 1,
            phase: PhaseKind::Update,
            timestamp: HostTime::from_millis(16),
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.contains("[phase:begin]"), "got: {output}");
        assert!(output.contains("frame=1 update"), "got: {output}");
        assert!(output.contains("16.000ms"), "got: {output}");
    }

    #[test]
    fn pretty_print_fault_and_timeout() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_timeout_fired(&TimeoutFiredEvent {
            name: "blink",
            due: HostTime::from_millis(10),
            fired_at: HostTime::from_millis(12),
        });
        sink.on_callback_fault(&CallbackFaultEvent {
            source: FaultSource::Timeout,
            name: "blink",
            message: "lost target",
            at: HostTime::from_millis(12),
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2, "got: {output}");
        assert!(lines[0].contains("late=2.000ms"), "got: {output}");
        assert!(lines[1].starts_with("[fault] timeout 'blink'"), "got: {output}");
        assert!(lines[1].ends_with("lost target"), "got: {output}");
    }
}
