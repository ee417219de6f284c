//! Driver Monitoring System (DMS)
//!
//! Turns a per-frame stream of detector labels into debounced driver alerts:
//! - Drowsiness (consecutive drowsy frames)
//! - Phone use (unbroken phone-detection run measured in caller time)
//! - Distraction (consecutive frames with no attentive signal)
//!
//! Detection, capture, rendering and audio are left to the caller.

pub mod analysis;
pub mod config;
pub mod detection;
pub mod engine;
pub mod state;

pub use analysis::{Alert, AlertCategory, Evaluation};
pub use crate::config::{ConfidenceThresholds, DmsConfig};
pub use detection::{displayable, Detection, FrameClassification, Label};
pub use engine::AlertEngine;
pub use state::EngineState;

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

/// DMS error types
#[derive(Error, Debug)]
pub enum DmsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration load failed: {0}")]
    ConfigLoad(#[from] ::config::ConfigError),
}

/// One monitoring session: an engine plus the state it threads between
/// frames. Call [`MonitorSession::process`] once per frame, in order.
pub struct MonitorSession {
    engine: AlertEngine,
    state: EngineState,
    frames_processed: u64,
}

impl MonitorSession {
    /// Start a session with configuration
    pub fn new(config: DmsConfig) -> Result<Self, DmsError> {
        config.validate()?;
        info!(
            drowsy_frames = config.drowsy_frame_threshold,
            phone_ms = config.phone_time_threshold_ms,
            distraction_frames = config.distraction_frame_threshold,
            "Starting driver monitoring session"
        );
        Ok(Self {
            engine: AlertEngine::new(config),
            state: EngineState::new(),
            frames_processed: 0,
        })
    }

    /// Start a session with default thresholds
    pub fn with_defaults() -> Self {
        Self {
            engine: AlertEngine::default(),
            state: EngineState::new(),
            frames_processed: 0,
        }
    }

    /// Evaluate one frame and advance the session state
    pub fn process(&mut self, detections: &[Detection], now: Duration) -> Evaluation {
        let (evaluation, next) = self.engine.evaluate(&self.state, detections, now);
        self.state = next;
        self.frames_processed += 1;

        debug!(
            frame = self.frames_processed,
            sleep_counter = next.sleep_counter,
            phone_run = next.phone_run_active(),
            distraction_counter = next.distraction_counter,
            "Frame evaluated"
        );
        for alert in &evaluation.alerts {
            warn!(
                frame = self.frames_processed,
                category = %alert.category,
                "{}",
                alert.message
            );
        }

        evaluation
    }

    /// Current session state
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Thresholds this session evaluates with
    pub fn config(&self) -> &DmsConfig {
        self.engine.config()
    }

    /// Frames evaluated since the session (re)started
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Reset session state (on session restart or driver change)
    pub fn reset(&mut self) {
        info!(frames = self.frames_processed, "Resetting driver monitoring session");
        self.state.reset();
        self.frames_processed = 0;
    }
}

impl Default for MonitorSession {
    fn default() -> Self {
        Self::with_defaults()
    }
}
