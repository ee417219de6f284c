//! DMS configuration

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::DmsError;

/// Consecutive drowsy frames before a drowsiness alert
pub const DEFAULT_DROWSY_FRAME_THRESHOLD: u32 = 30;

/// Continuous phone use before a phone alert (milliseconds)
pub const DEFAULT_PHONE_TIME_THRESHOLD_MS: u64 = 5_000;

/// Consecutive frames without a meaningful signal before a distraction alert
pub const DEFAULT_DISTRACTION_FRAME_THRESHOLD: u32 = 300;

/// Suggested caller pause after a drowsiness alert (milliseconds)
pub const DEFAULT_DROWSY_PAUSE_MS: u64 = 4_000;

/// Environment variable prefix for overrides (`DMS_DROWSY_FRAME_THRESHOLD=45`)
pub const ENV_PREFIX: &str = "DMS";

/// Per-label confidence thresholds. A detection counts only when its
/// confidence is strictly greater than the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceThresholds {
    pub drowsy: f32,
    pub awake: f32,
    pub phone: f32,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            drowsy: 0.4,
            awake: 0.5,
            phone: 0.3,
        }
    }
}

/// DMS configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// Consecutive drowsy frames before a drowsiness alert
    pub drowsy_frame_threshold: u32,

    /// Unbroken phone-use run before a phone alert (milliseconds)
    pub phone_time_threshold_ms: u64,

    /// Consecutive unattended frames before a distraction alert
    pub distraction_frame_threshold: u32,

    /// Label confidence thresholds
    pub confidence: ConfidenceThresholds,

    /// Pause the caller should take after a drowsiness alert (0 = none)
    pub drowsy_pause_ms: u64,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            drowsy_frame_threshold: DEFAULT_DROWSY_FRAME_THRESHOLD,
            phone_time_threshold_ms: DEFAULT_PHONE_TIME_THRESHOLD_MS,
            distraction_frame_threshold: DEFAULT_DISTRACTION_FRAME_THRESHOLD,
            confidence: ConfidenceThresholds::default(),
            drowsy_pause_ms: DEFAULT_DROWSY_PAUSE_MS,
        }
    }
}

impl DmsConfig {
    /// Create strict config (lower thresholds)
    pub fn strict() -> Self {
        Self {
            drowsy_frame_threshold: 15,
            phone_time_threshold_ms: 3_000,
            distraction_frame_threshold: 150,
            ..Default::default()
        }
    }

    /// Create lenient config (higher thresholds)
    pub fn lenient() -> Self {
        Self {
            drowsy_frame_threshold: 45,
            phone_time_threshold_ms: 8_000,
            distraction_frame_threshold: 450,
            ..Default::default()
        }
    }

    /// Phone threshold as a duration
    pub fn phone_time_threshold(&self) -> Duration {
        Duration::from_millis(self.phone_time_threshold_ms)
    }

    /// Drowsy pause as a duration, `None` when disabled
    pub fn drowsy_pause(&self) -> Option<Duration> {
        (self.drowsy_pause_ms > 0).then(|| Duration::from_millis(self.drowsy_pause_ms))
    }

    /// Load configuration from an optional file, then apply `DMS_*`
    /// environment overrides. Missing keys fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, DmsError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let parsed: Self = config.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Parse configuration from a TOML document (no environment overrides)
    pub fn from_toml_str(toml: &str) -> Result<Self, DmsError> {
        let parsed: Self = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Check that every threshold is usable
    pub fn validate(&self) -> Result<(), DmsError> {
        if self.drowsy_frame_threshold == 0 {
            return Err(DmsError::Config("drowsy_frame_threshold must be at least 1".into()));
        }
        if self.distraction_frame_threshold == 0 {
            return Err(DmsError::Config(
                "distraction_frame_threshold must be at least 1".into(),
            ));
        }
        if self.phone_time_threshold_ms == 0 {
            return Err(DmsError::Config("phone_time_threshold_ms must be positive".into()));
        }

        let c = &self.confidence;
        for (name, value) in [("drowsy", c.drowsy), ("awake", c.awake), ("phone", c.phone)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(DmsError::Config(format!(
                    "confidence.{name} must be within [0, 1], got {value}"
                )));
            }
        }

        Ok(())
    }
}
