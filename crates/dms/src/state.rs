//! Driver state tracking

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Counters and timers carried between frames of one monitoring session.
///
/// Created fresh at session start, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    /// Consecutive frames with a drowsy detection
    pub sleep_counter: u32,

    /// Start of the current unbroken phone-use run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_start_time: Option<Duration>,

    /// Consecutive frames with no phone run, no awake and no drowsy signal
    pub distraction_counter: u32,
}

impl EngineState {
    /// State at session start
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a phone-use run is in progress
    pub fn phone_run_active(&self) -> bool {
        self.phone_start_time.is_some()
    }

    /// Length of the current phone run at `now` (zero if `now` precedes it)
    pub fn phone_run_elapsed(&self, now: Duration) -> Option<Duration> {
        self.phone_start_time.map(|start| now.saturating_sub(start))
    }

    /// Reset state (on session restart)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
