//! System configuration parameters
//!
//! Every tunable the sort cycle depends on: servo mapping, angle presets,
//! conveyor travel, hold durations, and the classification endpoint.
//! Loaded once at boot (compiled defaults, optionally overridden by a JSON
//! document) and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::app::model::{PairPosition, Rgb, RotationDirection, WasteCategory};

/// Base URL of the classification endpoint; the API key is appended as a
/// `key` query parameter at boot.
pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1/models/gemini-2.0-flash:generateContent";

/// Instruction sent alongside every image.
pub const DEFAULT_PROMPT: &str = "Categorise the waste material in this image into Recyclable, \
    Non-recyclable, Organic. Answer only in these 3 categories and Single Word.";

/// Core sorter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SorterConfig {
    // --- Servo mapping: duty = base + (angle / max_angle) * span ---
    /// Native duty at 0°.
    pub servo_duty_base: u16,
    /// Native duty added at `servo_max_angle`.
    pub servo_duty_span: u16,
    /// Upper bound of the logical angle range (degrees).
    pub servo_max_angle: f32,
    /// Native duty value representing a 100 % pulse (10-bit LEDC).
    pub servo_duty_full_scale: u16,

    // --- Gate presets ---
    pub intake_open: PairPosition,
    pub intake_closed: PairPosition,
    pub drop_open: PairPosition,
    pub drop_closed: PairPosition,

    // --- Conveyor ---
    /// Half-steps for one sort rotation.
    pub sort_steps: u32,
    pub recyclable_direction: RotationDirection,
    pub non_recyclable_direction: RotationDirection,
    /// Delay between half-steps (microseconds).
    pub step_delay_us: u32,

    // --- Indicator ---
    /// Fill colour used as capture illumination.
    pub capture_light: Rgb,

    // --- Timing (milliseconds) ---
    pub intake_open_hold_ms: u32,
    pub intake_close_hold_ms: u32,
    /// Settle time after every light change.
    pub light_settle_ms: u32,
    /// How long the resolved category stays on the display before sorting.
    pub category_dwell_ms: u32,
    pub pre_drop_hold_ms: u32,
    pub drop_open_hold_ms: u32,
    pub drop_close_hold_ms: u32,
    /// Idle gap between two presence polls.
    pub poll_interval_ms: u32,

    // --- Presence ---
    /// Require a clear reading in IDLE before the next cycle may start.
    pub rearm_on_clear: bool,

    // --- Classification ---
    pub classifier_endpoint: String,
    pub classifier_prompt: String,
    /// Transport timeout for the single classification request.
    pub http_timeout_ms: u32,

    // --- Artifact storage ---
    /// Fixed path the latest capture is written to (overwritten each cycle).
    pub artifact_path: String,
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            // Servo mapping (10-bit duty at 50 Hz → ~0.4 ms … ~2.3 ms)
            servo_duty_base: 20,
            servo_duty_span: 100,
            servo_max_angle: 180.0,
            servo_duty_full_scale: 1023,

            // Gate presets
            intake_open: PairPosition::new(135.0, 49.0),
            intake_closed: PairPosition::new(4.0, 180.0),
            drop_open: PairPosition::new(70.0, 70.0),
            drop_closed: PairPosition::new(4.0, 4.0),

            // Conveyor
            sort_steps: 600,
            recyclable_direction: RotationDirection::Forward,
            non_recyclable_direction: RotationDirection::Reverse,
            step_delay_us: 2_000,

            // Indicator
            capture_light: Rgb::WHITE,

            // Timing
            intake_open_hold_ms: 3_000,
            intake_close_hold_ms: 2_000,
            light_settle_ms: 1_000,
            category_dwell_ms: 2_000,
            pre_drop_hold_ms: 2_000,
            drop_open_hold_ms: 3_000,
            drop_close_hold_ms: 3_000,
            poll_interval_ms: 50,

            rearm_on_clear: true,

            // Classification
            classifier_endpoint: DEFAULT_ENDPOINT.into(),
            classifier_prompt: DEFAULT_PROMPT.into(),
            http_timeout_ms: 15_000,

            artifact_path: "/spiffs/photo.jpg".into(),
        }
    }
}

/// Configuration rejected at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The override document is not valid JSON for [`SorterConfig`].
    Corrupted,
    /// A field failed range validation; the message names it.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Corrupted => Self::Config("corrupted"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}

impl SorterConfig {
    /// Parse an override document and validate it.  Missing fields take
    /// their default values.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break the sort cycle.  Out-of-range values
    /// are rejected, never silently clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recyclable_direction == self.non_recyclable_direction {
            return Err(ConfigError::ValidationFailed(
                "recyclable and non-recyclable directions must be opposite",
            ));
        }
        if self.sort_steps == 0 {
            return Err(ConfigError::ValidationFailed("sort_steps must be non-zero"));
        }
        if self.servo_duty_span == 0 || self.servo_duty_full_scale == 0 {
            return Err(ConfigError::ValidationFailed("servo duty span/full scale must be non-zero"));
        }
        if u32::from(self.servo_duty_base) + u32::from(self.servo_duty_span)
            > u32::from(self.servo_duty_full_scale)
        {
            return Err(ConfigError::ValidationFailed("servo duty range exceeds full scale"));
        }
        if !(self.servo_max_angle > 0.0 && self.servo_max_angle <= 360.0) {
            return Err(ConfigError::ValidationFailed("servo_max_angle out of range"));
        }
        let presets = [
            self.intake_open,
            self.intake_closed,
            self.drop_open,
            self.drop_closed,
        ];
        let in_range = |a: f32| (0.0..=180.0).contains(&a);
        if !presets.iter().all(|p| in_range(p.first) && in_range(p.second)) {
            return Err(ConfigError::ValidationFailed("gate preset angle outside 0-180"));
        }
        if self.classifier_endpoint.is_empty() {
            return Err(ConfigError::ValidationFailed("classifier_endpoint is empty"));
        }
        if self.artifact_path.is_empty() {
            return Err(ConfigError::ValidationFailed("artifact_path is empty"));
        }
        Ok(())
    }

    /// Signed conveyor displacement for `category`, or `None` when the
    /// object should pass without redirection.
    pub fn sort_rotation(&self, category: WasteCategory) -> Option<i32> {
        match category {
            WasteCategory::Recyclable => Some(self.recyclable_direction.signed(self.sort_steps)),
            WasteCategory::NonRecyclable => {
                Some(self.non_recyclable_direction.signed(self.sort_steps))
            }
            WasteCategory::Organic | WasteCategory::Unknown => None,
        }
    }

    /// Copy with every hold multiplied by `factor` (0.0 → no waiting).
    /// Used by simulation and tests.
    pub fn scaled(&self, factor: f32) -> Self {
        let scale = |ms: u32| (ms as f32 * factor.max(0.0)) as u32;
        Self {
            intake_open_hold_ms: scale(self.intake_open_hold_ms),
            intake_close_hold_ms: scale(self.intake_close_hold_ms),
            light_settle_ms: scale(self.light_settle_ms),
            category_dwell_ms: scale(self.category_dwell_ms),
            pre_drop_hold_ms: scale(self.pre_drop_hold_ms),
            drop_open_hold_ms: scale(self.drop_open_hold_ms),
            drop_close_hold_ms: scale(self.drop_close_hold_ms),
            poll_interval_ms: scale(self.poll_interval_ms),
            step_delay_us: scale(self.step_delay_us),
            ..self.clone()
        }
    }

    /// Endpoint URL with the API key attached.
    pub fn endpoint_with_key(&self, api_key: &str) -> String {
        if api_key.is_empty() {
            return self.classifier_endpoint.clone();
        }
        let sep = if self.classifier_endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}key={}", self.classifier_endpoint, sep, api_key)
    }
}
