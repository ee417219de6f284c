//! DMS evaluation results and alerts

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::DmsConfig;
use crate::detection::FrameClassification;

/// DMS alert categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertCategory {
    /// Drowsy for the configured number of consecutive frames
    Drowsy,

    /// Phone in use for the configured duration
    Phone,

    /// No attentive signal for the configured number of frames
    Distraction,
}

impl AlertCategory {
    pub fn all() -> &'static [AlertCategory] {
        &[Self::Drowsy, Self::Phone, Self::Distraction]
    }

    /// Sound asset the caller should play
    pub fn cue(&self) -> &'static str {
        match self {
            Self::Drowsy => "alarm_sounds/Alarm_drowsy.mp3",
            Self::Phone => "alarm_sounds/Alarm_phone.wav",
            Self::Distraction => "alarm_sounds/Alarm_distracted.wav",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drowsy => "drowsy",
            Self::Phone => "phone",
            Self::Distraction => "distraction",
        }
    }
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert emitted at a threshold crossing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub category: AlertCategory,

    /// Human-readable message
    pub message: String,

    /// Sound asset to play
    pub cue: String,

    /// How long the caller should pause its loop after delivering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_pause: Option<Duration>,
}

impl Alert {
    /// Build the alert for `category` with messages reflecting `config`
    pub fn new(category: AlertCategory, config: &DmsConfig) -> Self {
        let (message, suggested_pause) = match category {
            AlertCategory::Drowsy => (
                format!("Drowsy for {} frames!", config.drowsy_frame_threshold),
                config.drowsy_pause(),
            ),
            AlertCategory::Phone => (
                format!(
                    "Phone detected for {}+ sec!",
                    config.phone_time_threshold().as_secs_f64()
                ),
                None,
            ),
            AlertCategory::Distraction => (
                format!("Distracted for {} frames!", config.distraction_frame_threshold),
                None,
            ),
        };

        Self {
            category,
            message,
            cue: category.cue().to_string(),
            suggested_pause,
        }
    }
}

/// Result of evaluating one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Facts derived from the frame's detections
    pub classification: FrameClassification,

    /// Alerts emitted this frame, in category order
    pub alerts: Vec<Alert>,
}

impl Evaluation {
    /// Check if any alerts were emitted
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }

    /// Whether an alert of `category` was emitted
    pub fn contains(&self, category: AlertCategory) -> bool {
        self.alerts.iter().any(|a| a.category == category)
    }

    /// Get highest priority alert
    pub fn highest_priority_alert(&self) -> Option<&Alert> {
        // Priority: Drowsy > Phone > Distraction
        self.alerts.iter().min_by_key(|a| a.category)
    }

    /// Longest pause requested by any emitted alert
    pub fn suggested_pause(&self) -> Option<Duration> {
        self.alerts.iter().filter_map(|a| a.suggested_pause).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_alert_messages_and_cues() {
        let config = DmsConfig::default();

        let drowsy = Alert::new(AlertCategory::Drowsy, &config);
        assert_eq!(drowsy.message, "Drowsy for 30 frames!");
        assert_eq!(drowsy.cue, "alarm_sounds/Alarm_drowsy.mp3");
        assert_eq!(drowsy.suggested_pause, Some(Duration::from_secs(4)));

        let phone = Alert::new(AlertCategory::Phone, &config);
        assert_eq!(phone.message, "Phone detected for 5+ sec!");
        assert_eq!(phone.cue, "alarm_sounds/Alarm_phone.wav");
        assert_eq!(phone.suggested_pause, None);

        let distraction = Alert::new(AlertCategory::Distraction, &config);
        assert_eq!(distraction.message, "Distracted for 300 frames!");
        assert_eq!(distraction.cue, "alarm_sounds/Alarm_distracted.wav");
    }

    #[test]
    fn test_priority_and_pause() {
        let config = DmsConfig::default();
        let evaluation = Evaluation {
            alerts: vec![
                Alert::new(AlertCategory::Phone, &config),
                Alert::new(AlertCategory::Drowsy, &config),
            ],
            ..Default::default()
        };

        assert!(evaluation.has_alerts());
        assert!(evaluation.contains(AlertCategory::Phone));
        assert!(!evaluation.contains(AlertCategory::Distraction));
        assert_eq!(
            evaluation.highest_priority_alert().map(|a| a.category),
            Some(AlertCategory::Drowsy)
        );
        assert_eq!(evaluation.suggested_pause(), Some(Duration::from_secs(4)));
    }

    #[test]
    fn test_empty_evaluation() {
        let evaluation = Evaluation::default();
        assert!(!evaluation.has_alerts());
        assert!(evaluation.highest_priority_alert().is_none());
        assert!(evaluation.suggested_pause().is_none());
    }
}
