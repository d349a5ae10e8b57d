// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion of a scene recording into a Chrome trace.
//!
//! [`export`] decodes the bytes a [`RecorderSink`](super::recorder::RecorderSink)
//! collected and writes them out as [Trace Event Format][format] JSON, one
//! process and one thread, timestamps in microseconds of host time.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use trellis_core::time::HostTime;

use crate::recorder::{RecordedEvent, decode};

/// Writes the recording in `bytes` to `writer` as a JSON array of trace
/// events.
///
/// Open the result in `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Phases become duration slices and draw-order changes a counter track.
/// Everything else is an instant event.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::FrameBegin { frame_index, now } => {
                events.push(json!({
                    "ph": "i",
                    "name": "Frame",
                    "cat": "Scene",
                    "ts": to_us(now),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": frame_index,
                    }
                }));
            }
            RecordedEvent::PhaseBegin {
                frame_index,
                phase,
                timestamp,
            } => {
                events.push(json!({
                    "ph": "B",
                    "name": format!("{phase:?}"),
                    "cat": "Frame",
                    "ts": to_us(timestamp),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": frame_index,
                    }
                }));
            }
            RecordedEvent::PhaseEnd {
                frame_index,
                phase,
                timestamp,
            } => {
                events.push(json!({
                    "ph": "E",
                    "name": format!("{phase:?}"),
                    "cat": "Frame",
                    "ts": to_us(timestamp),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": frame_index,
                    }
                }));
            }
            RecordedEvent::TimeoutFired {
                name,
                due,
                fired_at,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "Timeout",
                    "cat": "Timeouts",
                    "ts": to_us(fired_at),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "timeout": name,
                        "late_us": to_us(fired_at) - to_us(due),
                    }
                }));
            }
            RecordedEvent::CallbackFault {
                source,
                name,
                message,
                at,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "CallbackFault",
                    "cat": "Faults",
                    "ts": to_us(at),
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "source": format!("{source:?}"),
                        "owner": name,
                        "message": message,
                    }
                }));
            }
            RecordedEvent::DrawOrder {
                frame_index,
                indexed,
                forced,
            } => {
                events.push(json!({
                    "ph": "C",
                    "name": "DrawOrder",
                    "cat": "Scene",
                    "ts": 0,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": frame_index,
                        "indexed": indexed,
                        "forced": u8::from(forced),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn to_us(t: HostTime) -> f64 {
    t.nanos() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use trellis_core::trace::{
        FrameBeginEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, TimeoutFiredEvent, TraceSink,
    };

    #[test]
    fn frame_phases_and_timeouts_map_to_trace_events() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 0,
            now: HostTime(1_000_000),
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: PhaseKind::Update,
            timestamp: HostTime(1_000_000),
        });
        rec.on_timeout_fired(&TimeoutFiredEvent {
            name: "blink",
            due: HostTime(1_000_000),
            fired_at: HostTime(1_000_000),
        });
        rec.on_phase_end(&PhaseEndEvent {
            frame_index: 0,
            phase: PhaseKind::Update,
            timestamp: HostTime(1_000_100),
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 4, "frame, begin, timeout, end");

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "Frame");
        assert_eq!(parsed[0]["ts"], 1000.0);

        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[1]["name"], "Update");

        assert_eq!(parsed[2]["args"]["timeout"], "blink");

        assert_eq!(parsed[3]["ph"], "E");
        assert_eq!(parsed[3]["name"], "Update");
    }

    #[test]
    fn empty_recording_is_an_empty_array() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        assert_eq!(
            serde_json::from_slice::<Vec<Value>>(&out).unwrap(),
            Vec::<Value>::new()
        );
    }
}
