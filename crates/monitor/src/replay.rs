//! Recorded detection streams

use std::io::BufRead;
use std::time::Duration;

use dms::Detection;
use serde::{Deserialize, Serialize};

use crate::MonitorError;

/// One line of a recording
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Capture time relative to the start of the recording
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,

    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// A frame ready for evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// 0-based position in the stream
    pub index: u64,
    pub timestamp: Duration,
    pub detections: Vec<Detection>,
}

/// Anything that yields detector output one frame at a time
pub trait FrameSource {
    /// Next frame, or `None` when the stream has ended
    fn next_frame(&mut self) -> Result<Option<Frame>, MonitorError>;
}

/// Replays newline-delimited JSON [`FrameRecord`]s.
///
/// Records without `timestamp_ms` are stamped from their position and `fps`.
pub struct ReplaySource<R> {
    reader: R,
    fps: f64,
    line: usize,
    index: u64,
    buf: String,
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R, fps: f64) -> Result<Self, MonitorError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(MonitorError::InvalidArgument(format!(
                "fps must be a positive number, got {fps}"
            )));
        }
        Ok(Self {
            reader,
            fps,
            line: 0,
            index: 0,
            buf: String::new(),
        })
    }

    fn synthesized_timestamp(&self) -> Result<Duration, MonitorError> {
        Duration::try_from_secs_f64(self.index as f64 / self.fps).map_err(|_| {
            MonitorError::InvalidArgument(format!(
                "frame {} at {} fps is past the representable timestamp range",
                self.index, self.fps
            ))
        })
    }
}

impl<R: BufRead> FrameSource for ReplaySource<R> {
    fn next_frame(&mut self) -> Result<Option<Frame>, MonitorError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let trimmed = self.buf.trim();
            if trimmed.is_empty() {
                continue;
            }

            let record: FrameRecord = serde_json::from_str(trimmed).map_err(|source| {
                MonitorError::Parse {
                    line: self.line,
                    source,
                }
            })?;

            let timestamp = match record.timestamp_ms {
                Some(ms) => Duration::from_millis(ms),
                None => self.synthesized_timestamp()?,
            };
            let frame = Frame {
                index: self.index,
                timestamp,
                detections: record.detections,
            };
            self.index += 1;
            return Ok(Some(frame));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn source(text: &str, fps: f64) -> ReplaySource<Cursor<Vec<u8>>> {
        ReplaySource::new(Cursor::new(text.as_bytes().to_vec()), fps).unwrap()
    }

    #[test]
    fn test_reads_records_and_skips_blank_lines() {
        let mut replay = source(
            concat!(
                r#"{"timestamp_ms": 0, "detections": [{"label": "phone", "confidence": 0.8}]}"#,
                "\n\n   \n",
                r#"{"timestamp_ms": 1500, "detections": []}"#,
                "\n",
            ),
            30.0,
        );

        let first = replay.next_frame().unwrap().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.timestamp, Duration::ZERO);
        assert_eq!(first.detections, vec![Detection::new("phone", 0.8)]);

        let second = replay.next_frame().unwrap().unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(second.timestamp, Duration::from_millis(1500));
        assert!(second.detections.is_empty());

        assert!(replay.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_synthesizes_timestamps_from_fps() {
        let mut replay = source("{}\n{}\n{}\n", 10.0);
        let stamps: Vec<_> = std::iter::from_fn(|| replay.next_frame().unwrap())
            .map(|f| f.timestamp)
            .collect();
        assert_eq!(
            stamps,
            vec![Duration::ZERO, Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let mut replay = source("{}\n\n{\"detections\": 5}\n", 30.0);
        assert!(replay.next_frame().unwrap().is_some());

        match replay.next_frame() {
            Err(MonitorError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_fps() {
        assert!(ReplaySource::new(Cursor::new(Vec::new()), 0.0).is_err());
        assert!(ReplaySource::new(Cursor::new(Vec::new()), f64::NAN).is_err());
        assert!(ReplaySource::new(Cursor::new(Vec::new()), -30.0).is_err());
    }

    #[test]
    fn test_tiny_fps_errors_instead_of_overflowing() {
        let mut replay = source("{}\n{}\n", 1e-20);
        assert_eq!(replay.next_frame().unwrap().unwrap().timestamp, Duration::ZERO);
        assert!(matches!(replay.next_frame(), Err(MonitorError::InvalidArgument(_))));
    }

    #[test]
    fn test_tiny_fps_is_fine_with_recorded_timestamps() {
        let mut replay = source("{\"timestamp_ms\": 0}\n{\"timestamp_ms\": 40}\n", 1e-20);
        assert!(replay.next_frame().unwrap().is_some());
        let second = replay.next_frame().unwrap().unwrap();
        assert_eq!(second.timestamp, Duration::from_millis(40));
    }
}
