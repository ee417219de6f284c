//! Alert delivery

use std::io::Write;

use dms::Alert;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::MonitorError;

/// An alert together with where in the stream it fired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// 0-based frame index
    pub frame: u64,
    pub timestamp_ms: u64,
    pub alert: Alert,
}

/// Receives alerts emitted by the monitoring loop
pub trait AlertSink {
    fn deliver(&mut self, record: &AlertRecord) -> Result<(), MonitorError>;
}

/// Stands in for audio playback by logging the cue. The session already
/// warns on every alert, so this stays at debug level.
#[derive(Debug, Default)]
pub struct LogSink;

impl AlertSink for LogSink {
    fn deliver(&mut self, record: &AlertRecord) -> Result<(), MonitorError> {
        debug!(
            frame = record.frame,
            timestamp_ms = record.timestamp_ms,
            category = %record.alert.category,
            cue = %record.alert.cue,
            "Playing alert cue"
        );
        Ok(())
    }
}

/// Writes one JSON object per alert
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> AlertSink for JsonLinesSink<W> {
    fn deliver(&mut self, record: &AlertRecord) -> Result<(), MonitorError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
