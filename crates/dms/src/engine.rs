//! Alert evaluation state machine

use std::time::Duration;

use crate::analysis::{Alert, AlertCategory, Evaluation};
use crate::config::DmsConfig;
use crate::detection::{Detection, FrameClassification};
use crate::state::EngineState;

/// Converts one frame of detections plus the prior state into alerts and
/// the next state. Holds only configuration; all session state is passed in.
#[derive(Debug, Clone, Default)]
pub struct AlertEngine {
    config: DmsConfig,
}

impl AlertEngine {
    pub fn new(config: DmsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DmsConfig {
        &self.config
    }

    /// Evaluate a frame observed at `now`.
    ///
    /// `now` is any monotonic offset chosen by the caller (usually time since
    /// session start). The result depends only on the arguments.
    pub fn evaluate(
        &self,
        state: &EngineState,
        detections: &[Detection],
        now: Duration,
    ) -> (Evaluation, EngineState) {
        let classification = FrameClassification::classify(detections, &self.config.confidence);
        let mut next = *state;
        let mut alerts = Vec::new();

        // Drowsiness: counter keeps running after the alert, so it re-fires
        // every frame until a non-drowsy frame arrives.
        if classification.drowsy_detected {
            next.sleep_counter = next.sleep_counter.saturating_add(1);
            if next.sleep_counter >= self.config.drowsy_frame_threshold {
                alerts.push(self.alert(AlertCategory::Drowsy));
            }
        } else {
            next.sleep_counter = 0;
        }

        // Phone: any gap ends the run; an alert also ends it
        if classification.phone_detected {
            match next.phone_run_elapsed(now) {
                None => next.phone_start_time = Some(now),
                Some(elapsed) if elapsed >= self.config.phone_time_threshold() => {
                    alerts.push(self.alert(AlertCategory::Phone));
                    next.phone_start_time = None;
                }
                Some(_) => {}
            }
        } else {
            next.phone_start_time = None;
        }

        // Distraction: gated on the phone run as it stands after this frame.
        // Unlike drowsiness the counter restarts once the alert fires.
        if !next.phone_run_active()
            && !classification.awake_detected
            && !classification.drowsy_detected
        {
            next.distraction_counter = next.distraction_counter.saturating_add(1);
            if next.distraction_counter >= self.config.distraction_frame_threshold {
                alerts.push(self.alert(AlertCategory::Distraction));
                next.distraction_counter = 0;
            }
        } else {
            next.distraction_counter = 0;
        }

        (
            Evaluation {
                classification,
                alerts,
            },
            next,
        )
    }

    fn alert(&self, category: AlertCategory) -> Alert {
        Alert::new(category, &self.config)
    }
}
