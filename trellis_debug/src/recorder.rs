// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory recording of trace events.
//!
//! [`RecorderSink`] appends every event it receives to a byte buffer: a tag
//! byte, then the fields little-endian. Names and messages are written as a
//! `u32` byte length followed by UTF-8. [`decode`] turns the buffer back into
//! [`RecordedEvent`]s, e.g. for [`chrome::export`](crate::chrome::export).

use trellis_core::time::HostTime;
use trellis_core::trace::{
    CallbackFaultEvent, DrawOrderEvent, FaultSource, FrameBeginEvent, PhaseBeginEvent,
    PhaseEndEvent, PhaseKind, TimeoutFiredEvent, TraceSink,
};

const TAG_FRAME_BEGIN: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_TIMEOUT_FIRED: u8 = 4;
const TAG_CALLBACK_FAULT: u8 = 5;
const TAG_DRAW_ORDER: u8 = 6;

fn phase_code(phase: PhaseKind) -> u8 {
    match phase {
        PhaseKind::Timeouts => 0,
        PhaseKind::Update => 1,
        PhaseKind::Draw => 2,
        PhaseKind::Input => 3,
    }
}

fn source_code(source: FaultSource) -> u8 {
    match source {
        FaultSource::Timeout => 0,
    }
}

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// Records trace events into a byte buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates a recorder with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything recorded so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the buffer, consuming the recorder.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn tag(&mut self, tag: u8) -> &mut Self {
        self.buf.push(tag);
        self
    }

    fn byte(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    fn word(&mut self, v: u32) -> &mut Self {
        self.buf.extend(v.to_le_bytes());
        self
    }

    fn long(&mut self, v: u64) -> &mut Self {
        self.buf.extend(v.to_le_bytes());
        self
    }

    fn time(&mut self, t: HostTime) -> &mut Self {
        self.long(t.nanos())
    }

    /// Strings longer than `u32::MAX` bytes are cut.
    fn text(&mut self, s: &str) -> &mut Self {
        let len = u32::try_from(s.len()).unwrap_or(u32::MAX);
        self.word(len);
        self.buf.extend_from_slice(&s.as_bytes()[..len as usize]);
        self
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.tag(TAG_FRAME_BEGIN).long(e.frame_index).time(e.now);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.tag(TAG_PHASE_BEGIN)
            .long(e.frame_index)
            .byte(phase_code(e.phase))
            .time(e.timestamp);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.tag(TAG_PHASE_END)
            .long(e.frame_index)
            .byte(phase_code(e.phase))
            .time(e.timestamp);
    }

    fn on_timeout_fired(&mut self, e: &TimeoutFiredEvent<'_>) {
        self.tag(TAG_TIMEOUT_FIRED)
            .text(e.name)
            .time(e.due)
            .time(e.fired_at);
    }

    fn on_callback_fault(&mut self, e: &CallbackFaultEvent<'_>) {
        self.tag(TAG_CALLBACK_FAULT)
            .byte(source_code(e.source))
            .text(e.name)
            .text(e.message)
            .time(e.at);
    }

    fn on_draw_order(&mut self, e: &DrawOrderEvent) {
        self.tag(TAG_DRAW_ORDER)
            .long(e.frame_index)
            .word(e.indexed)
            .byte(u8::from(e.forced));
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// One event read back from a recording, with its strings owned.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// See [`FrameBeginEvent`].
    FrameBegin {
        /// Frame counter.
        frame_index: u64,
        /// Clock reading for the frame.
        now: HostTime,
    },
    /// See [`PhaseBeginEvent`].
    PhaseBegin {
        /// Frame counter.
        frame_index: u64,
        /// Which phase started.
        phase: PhaseKind,
        /// When it started.
        timestamp: HostTime,
    },
    /// See [`PhaseEndEvent`].
    PhaseEnd {
        /// Frame counter.
        frame_index: u64,
        /// Which phase ended.
        phase: PhaseKind,
        /// When it ended.
        timestamp: HostTime,
    },
    /// See [`TimeoutFiredEvent`].
    TimeoutFired {
        /// The timeout's name.
        name: String,
        /// When it was due.
        due: HostTime,
        /// When it fired.
        fired_at: HostTime,
    },
    /// See [`CallbackFaultEvent`].
    CallbackFault {
        /// Where the callback was registered.
        source: FaultSource,
        /// Name of the owner.
        name: String,
        /// The fault's description.
        message: String,
        /// When the fault was observed.
        at: HostTime,
    },
    /// See [`DrawOrderEvent`].
    DrawOrder {
        /// Frame counter.
        frame_index: u64,
        /// Nodes that received an index.
        indexed: u32,
        /// Whether this was an on-demand recompute.
        forced: bool,
    },
}

/// Reads the events in a [`RecorderSink`] buffer.
///
/// Reading stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter { rest: bytes }
}

/// Iterator returned by [`decode`].
#[derive(Debug)]
pub struct DecodeIter<'a> {
    rest: &'a [u8],
}

impl<'a> DecodeIter<'a> {
    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.rest.len() < n {
            self.rest = &[];
            return None;
        }
        let (head, tail) = self.rest.split_at(n);
        self.rest = tail;
        Some(head)
    }

    fn byte(&mut self) -> Option<u8> {
        self.take(1)?.first().copied()
    }

    fn word(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.take(4)?.try_into().ok()?))
    }

    fn long(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.take(8)?.try_into().ok()?))
    }

    fn time(&mut self) -> Option<HostTime> {
        self.long().map(HostTime)
    }

    fn text(&mut self) -> Option<String> {
        let len = self.word()? as usize;
        Some(String::from_utf8_lossy(self.take(len)?).into_owned())
    }

    fn phase(&mut self) -> Option<PhaseKind> {
        match self.byte()? {
            0 => Some(PhaseKind::Timeouts),
            1 => Some(PhaseKind::Update),
            2 => Some(PhaseKind::Draw),
            3 => Some(PhaseKind::Input),
            _ => None,
        }
    }

    fn source(&mut self) -> Option<FaultSource> {
        match self.byte()? {
            0 => Some(FaultSource::Timeout),
            _ => None,
        }
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<RecordedEvent> {
        let event = match self.byte()? {
            TAG_FRAME_BEGIN => RecordedEvent::FrameBegin {
                frame_index: self.long()?,
                now: self.time()?,
            },
            TAG_PHASE_BEGIN => RecordedEvent::PhaseBegin {
                frame_index: self.long()?,
                phase: self.phase()?,
                timestamp: self.time()?,
            },
            TAG_PHASE_END => RecordedEvent::PhaseEnd {
                frame_index: self.long()?,
                phase: self.phase()?,
                timestamp: self.time()?,
            },
            TAG_TIMEOUT_FIRED => RecordedEvent::TimeoutFired {
                name: self.text()?,
                due: self.time()?,
                fired_at: self.time()?,
            },
            TAG_CALLBACK_FAULT => RecordedEvent::CallbackFault {
                source: self.source()?,
                name: self.text()?,
                message: self.text()?,
                at: self.time()?,
            },
            TAG_DRAW_ORDER => RecordedEvent::DrawOrder {
                frame_index: self.long()?,
                indexed: self.word()?,
                forced: self.byte()? != 0,
            },
            _ => {
                self.rest = &[];
                return None;
            }
        };
        Some(event)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
