//! Detector output and per-frame classification

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfidenceThresholds;

/// Label vocabulary understood by the alert engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Drowsy,
    Awake,
    Phone,
    /// Recognized but never counted toward any alert
    Smoking,
    /// Anything outside the vocabulary
    Other,
}

impl Label {
    /// Parse a detector class name (case-insensitive). Never fails;
    /// unknown names map to [`Label::Other`].
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "drowsy" => Self::Drowsy,
            "awake" => Self::Awake,
            "phone" => Self::Phone,
            "smoking" => Self::Smoking,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drowsy => "drowsy",
            Self::Awake => "awake",
            Self::Phone => "phone",
            Self::Smoking => "smoking",
            Self::Other => "other",
        }
    }
}

impl FromStr for Label {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One object reported by the external detector for a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Class name as reported by the detector
    pub label: String,

    /// Detection confidence, expected in [0, 1]
    pub confidence: f32,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Parsed label
    pub fn kind(&self) -> Label {
        Label::parse(&self.label)
    }
}

/// Per-frame facts derived from the detection set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameClassification {
    pub drowsy_detected: bool,
    pub awake_detected: bool,
    pub phone_detected: bool,

    /// A smoking detection was present (informational only)
    pub smoking_present: bool,

    /// Highest qualifying drowsy confidence this frame
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drowsy_confidence: Option<f32>,

    /// Highest qualifying awake confidence this frame
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awake_confidence: Option<f32>,

    /// Highest qualifying phone confidence this frame
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_confidence: Option<f32>,
}

impl FrameClassification {
    /// Classify a frame. A category is detected when any detection of that
    /// label has confidence strictly above its threshold; the strongest such
    /// detection is kept. NaN and negative confidences never qualify.
    pub fn classify(detections: &[Detection], thresholds: &ConfidenceThresholds) -> Self {
        let mut frame = Self::default();

        for detection in detections {
            let confidence = detection.confidence;
            let slot = match detection.kind() {
                Label::Drowsy if confidence > thresholds.drowsy => &mut frame.drowsy_confidence,
                Label::Awake if confidence > thresholds.awake => &mut frame.awake_confidence,
                Label::Phone if confidence > thresholds.phone => &mut frame.phone_confidence,
                Label::Smoking => {
                    frame.smoking_present = true;
                    continue;
                }
                _ => continue,
            };
            *slot = Some(slot.map_or(confidence, |best| best.max(confidence)));
        }

        frame.drowsy_detected = frame.drowsy_confidence.is_some();
        frame.awake_detected = frame.awake_confidence.is_some();
        frame.phone_detected = frame.phone_confidence.is_some();
        frame
    }
}

/// Detections a caller should draw: everything except smoking boxes
pub fn displayable(detections: &[Detection]) -> impl Iterator<Item = &Detection> {
    detections.iter().filter(|d| d.kind() != Label::Smoking)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(detections: &[Detection]) -> FrameClassification {
        FrameClassification::classify(detections, &ConfidenceThresholds::default())
    }

    #[test]
    fn test_label_parsing_is_case_insensitive() {
        assert_eq!(Label::parse("Drowsy"), Label::Drowsy);
        assert_eq!(Label::parse("PHONE"), Label::Phone);
        assert_eq!(Label::parse(" awake "), Label::Awake);
        assert_eq!(Label::parse("smoking"), Label::Smoking);
        assert_eq!(Label::parse("seatbelt"), Label::Other);
        assert_eq!("yawn".parse::<Label>(), Ok(Label::Other));
    }

    #[test]
    fn test_thresholds_are_strict() {
        let frame = classify(&[
            Detection::new("drowsy", 0.4),
            Detection::new("awake", 0.5),
            Detection::new("phone", 0.3),
        ]);
        assert!(!frame.drowsy_detected);
        assert!(!frame.awake_detected);
        assert!(!frame.phone_detected);

        let frame = classify(&[
            Detection::new("drowsy", 0.41),
            Detection::new("awake", 0.51),
            Detection::new("phone", 0.31),
        ]);
        assert!(frame.drowsy_detected);
        assert!(frame.awake_detected);
        assert!(frame.phone_detected);
    }

    #[test]
    fn test_smoking_never_counts() {
        let frame = classify(&[Detection::new("smoking", 1.0)]);
        assert!(frame.smoking_present);
        assert!(!frame.drowsy_detected);
        assert!(!frame.awake_detected);
        assert!(!frame.phone_detected);
    }

    #[test]
    fn test_malformed_confidence_is_non_match() {
        let frame = classify(&[
            Detection::new("drowsy", f32::NAN),
            Detection::new("awake", -3.0),
            Detection::new("phone", f32::NEG_INFINITY),
        ]);
        assert_eq!(frame, FrameClassification::default());
    }

    #[test]
    fn test_keeps_max_confidence_per_label() {
        let frame = classify(&[
            Detection::new("phone", 0.35),
            Detection::new("phone", 0.9),
            Detection::new("phone", 0.6),
            Detection::new("phone", 0.1),
        ]);
        assert!(frame.phone_detected);
        assert_eq!(frame.phone_confidence, Some(0.9));
    }

    #[test]
    fn test_unknown_labels_are_inert() {
        let frame = classify(&[Detection::new("cigarette", 0.99), Detection::new("", 0.99)]);
        assert_eq!(frame, FrameClassification::default());
    }

    #[test]
    fn test_displayable_drops_smoking() {
        let detections = vec![
            Detection::new("Smoking", 0.9),
            Detection::new("phone", 0.2),
            Detection::new("other", 0.7),
        ];
        let shown: Vec<_> = displayable(&detections).map(|d| d.label.as_str()).collect();
        assert_eq!(shown, vec!["phone", "other"]);
    }
}
