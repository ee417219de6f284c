//! Driver Monitor
//!
//! Drives a [`dms::MonitorSession`] from a stream of detector output, hands
//! emitted alerts to a sink and applies the pause each alert suggests.

pub mod replay;
pub mod sink;

pub use replay::{Frame, FrameRecord, FrameSource, ReplaySource};
pub use sink::{AlertRecord, AlertSink, JsonLinesSink, LogSink};

use std::collections::BTreeMap;

use dms::{AlertCategory, DmsError, MonitorSession};
use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Monitor error types
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid frame record on line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },

    #[error("Failed to encode alert: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Dms(#[from] DmsError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Loop behavior
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Sleep for the pause an alert suggests before the next frame
    pub honor_pauses: bool,
}

/// Totals for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    /// Alert count for every category, including ones that never fired
    pub alerts: BTreeMap<AlertCategory, u64>,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            frames: 0,
            alerts: AlertCategory::all().iter().map(|&c| (c, 0)).collect(),
        }
    }
}

impl RunSummary {
    pub fn count(&self, category: AlertCategory) -> u64 {
        self.alerts.get(&category).copied().unwrap_or(0)
    }

    pub fn total_alerts(&self) -> u64 {
        self.alerts.values().sum()
    }
}

/// Evaluate every frame from `source` in order until it is exhausted
pub async fn run_monitor<S: FrameSource>(
    source: &mut S,
    session: &mut MonitorSession,
    sink: &mut dyn AlertSink,
    options: &RunOptions,
) -> Result<RunSummary, MonitorError> {
    let mut summary = RunSummary::default();

    while let Some(frame) = source.next_frame()? {
        let evaluation = session.process(&frame.detections, frame.timestamp);
        summary.frames += 1;

        for alert in &evaluation.alerts {
            *summary.alerts.entry(alert.category).or_insert(0) += 1;
            sink.deliver(&AlertRecord {
                frame: frame.index,
                timestamp_ms: u64::try_from(frame.timestamp.as_millis()).unwrap_or(u64::MAX),
                alert: alert.clone(),
            })?;
        }

        if options.honor_pauses {
            if let Some(pause) = evaluation.suggested_pause() {
                debug!(pause_ms = pause.as_millis() as u64, "Pausing after alert");
                tokio::time::sleep(pause).await;
            }
        }
    }

    info!(
        frames = summary.frames,
        drowsy = summary.count(AlertCategory::Drowsy),
        phone = summary.count(AlertCategory::Phone),
        distraction = summary.count(AlertCategory::Distraction),
        "Monitoring finished"
    );
    Ok(summary)
}

/// Initialize logging (to stderr, so stdout stays free for alert output)
pub fn init_logging(level: Level, json: bool) -> Result<(), SetGlobalDefaultError> {
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
}
