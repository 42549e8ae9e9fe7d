//! Telemetry sink contract and the sinks shipped with the workspace.
//!
//! Control code records named scalars, booleans and short labels into a
//! [`TelemetrySink`]. Writes are fire-and-forget and never read back by the
//! control path. The cycle runner collects one [`TelemetryFrame`] per tick
//! (fixed capacity, no heap allocation) and flushes it to an output sink.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;
use tracing::{trace, warn};

use crate::consts::TELEMETRY_FRAME_CAPACITY;

/// A single recorded value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TelemetryValue {
    Number(f64),
    Bool(bool),
    Text(&'static str),
}

impl TelemetryValue {
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_text(&self) -> Option<&'static str> {
        match self {
            Self::Text(v) => Some(*v),
            _ => None,
        }
    }
}

/// Write-only destination for telemetry.
pub trait TelemetrySink {
    fn record(&mut self, key: &'static str, value: TelemetryValue);

    #[inline]
    fn record_number(&mut self, key: &'static str, value: f64) {
        self.record(key, TelemetryValue::Number(value));
    }

    #[inline]
    fn record_bool(&mut self, key: &'static str, value: bool) {
        self.record(key, TelemetryValue::Bool(value));
    }

    #[inline]
    fn record_text(&mut self, key: &'static str, value: &'static str) {
        self.record(key, TelemetryValue::Text(value));
    }
}

// ─── TelemetryFrame ─────────────────────────────────────────────────

/// Per-tick telemetry buffer.
///
/// Entries beyond [`TELEMETRY_FRAME_CAPACITY`] are dropped and counted.
#[derive(Debug, Clone, Default)]
pub struct TelemetryFrame {
    tick: u64,
    entries: heapless::Vec<(&'static str, TelemetryValue), TELEMETRY_FRAME_CAPACITY>,
    dropped: u32,
}

impl TelemetryFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the buffer and stamp it with a new tick number.
    pub fn begin(&mut self, tick: u64) {
        self.tick = tick;
        self.entries.clear();
        self.dropped = 0;
    }

    #[inline]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    #[inline]
    pub fn entries(&self) -> &[(&'static str, TelemetryValue)] {
        &self.entries
    }

    #[inline]
    pub const fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Last value recorded under `key` in this frame.
    pub fn get(&self, key: &str) -> Option<TelemetryValue> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// Forward every entry of this frame to another sink.
    pub fn replay_into<S: TelemetrySink + ?Sized>(&self, sink: &mut S) {
        for (key, value) in self.entries.iter() {
            sink.record(*key, *value);
        }
    }
}

impl TelemetrySink for TelemetryFrame {
    fn record(&mut self, key: &'static str, value: TelemetryValue) {
        if self.entries.push((key, value)).is_err() {
            self.dropped = self.dropped.saturating_add(1);
        }
    }
}

/// Destination for whole frames, implemented by the output sinks.
pub trait FrameSink {
    fn flush_frame(&mut self, frame: &TelemetryFrame);
}

// ─── Output sinks ───────────────────────────────────────────────────

/// Echo every entry as a `trace`-level event.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record(&mut self, key: &'static str, value: TelemetryValue) {
        trace!(target: "telemetry", key, value = ?value);
    }
}

impl FrameSink for TracingSink {
    fn flush_frame(&mut self, frame: &TelemetryFrame) {
        frame.replay_into(self);
        if frame.dropped() > 0 {
            warn!(tick = frame.tick(), dropped = frame.dropped(), "telemetry frame overflow");
        }
    }
}

#[derive(Serialize)]
struct JsonFrame {
    tick: u64,
    values: BTreeMap<&'static str, TelemetryValue>,
    #[serde(skip_serializing_if = "is_zero")]
    dropped: u32,
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}

/// Write one JSON object per flushed frame, newline-delimited.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    write_errors: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            write_errors: 0,
        }
    }

    #[inline]
    pub const fn write_errors(&self) -> u64 {
        self.write_errors
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameSink for JsonLinesSink<W> {
    fn flush_frame(&mut self, frame: &TelemetryFrame) {
        let json = JsonFrame {
            tick: frame.tick(),
            values: frame.entries().iter().copied().collect(),
            dropped: frame.dropped(),
        };
        let result = serde_json::to_writer(&mut self.writer, &json)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"));
        if let Err(e) = result {
            // Log once, then only count.
            if self.write_errors == 0 {
                warn!("telemetry write failed: {e}");
            }
            self.write_errors += 1;
        }
    }
}

/// Latest value per key. Intended for tests and dashboards.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    values: BTreeMap<&'static str, TelemetryValue>,
    frames: u64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<TelemetryValue> {
        self.values.get(key).copied()
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.as_number())
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    pub fn text(&self, key: &str) -> Option<&'static str> {
        self.get(key).and_then(|v| v.as_text())
    }

    #[inline]
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}

impl TelemetrySink for MemorySink {
    fn record(&mut self, key: &'static str, value: TelemetryValue) {
        self.values.insert(key, value);
    }
}

impl FrameSink for MemorySink {
    fn flush_frame(&mut self, frame: &TelemetryFrame) {
        frame.replay_into(self);
        self.frames += 1;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_records_and_looks_up_latest() {
        let mut frame = TelemetryFrame::new();
        frame.begin(7);
        frame.record_number("Turret/DeltaDeg", 1.0);
        frame.record_number("Turret/DeltaDeg", 2.0);
        frame.record_bool("Coordinator/Feeding", true);
        assert_eq!(frame.tick(), 7);
        assert_eq!(frame.entries().len(), 3);
        assert_eq!(frame.get("Turret/DeltaDeg"), Some(TelemetryValue::Number(2.0)));
        assert_eq!(frame.get("missing"), None);
    }

    #[test]
    fn frame_overflow_is_counted() {
        let mut frame = TelemetryFrame::new();
        frame.begin(0);
        for _ in 0..TELEMETRY_FRAME_CAPACITY + 3 {
            frame.record_bool("Loader/Running", false);
        }
        assert_eq!(frame.entries().len(), TELEMETRY_FRAME_CAPACITY);
        assert_eq!(frame.dropped(), 3);

        frame.begin(1);
        assert!(frame.entries().is_empty());
        assert_eq!(frame.dropped(), 0);
    }

    #[test]
    fn memory_sink_keeps_latest() {
        let mut frame = TelemetryFrame::new();
        frame.begin(1);
        frame.record_text("Coordinator/ShotType", "SHOOT");
        let mut sink = MemorySink::new();
        sink.flush_frame(&frame);
        frame.begin(2);
        frame.record_text("Coordinator/ShotType", "PASS");
        sink.flush_frame(&frame);
        assert_eq!(sink.text("Coordinator/ShotType"), Some("PASS"));
        assert_eq!(sink.frames(), 2);
    }

    #[test]
    fn json_lines_one_object_per_frame() {
        let mut frame = TelemetryFrame::new();
        frame.begin(3);
        frame.record_number("Turret/Output", 0.4);
        frame.record_bool("Coordinator/ReadyToFire", false);
        frame.record_text("Coordinator/Mode", "MANUAL");

        let mut sink = JsonLinesSink::new(Vec::new());
        sink.flush_frame(&frame);
        sink.flush_frame(&frame);
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["tick"], 3);
        assert_eq!(parsed["values"]["Turret/Output"], 0.4);
        assert_eq!(parsed["values"]["Coordinator/ReadyToFire"], false);
        assert_eq!(parsed["values"]["Coordinator/Mode"], "MANUAL");
        assert!(parsed.get("dropped").is_none());
    }
}
