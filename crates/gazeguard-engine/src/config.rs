//! Engine configuration.
//!
//! All tuning lives in one strongly typed [`MonitorConfig`] with explicit
//! defaults. Callers may supply a partial override document
//! ([`MonitorConfigPatch`]) whose present fields are merged over the
//! defaults; a malformed document falls back to the full defaults and is
//! logged, never treated as fatal.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::ChannelId;

/// How head pose deviations are detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// Rotation-matrix classification with landmark-ratio fallback
    Full,
    /// Lateral turns only, always via landmark ratios
    TurnOnly,
}

/// Per-channel alerting knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelSettings {
    /// Whether this channel may emit alerts
    pub enabled: bool,
    /// Minimum milliseconds between alerts on this channel
    pub cooldown_ms: u64,
    /// Alerts before the channel escalates to a danger aggregate
    pub max_alerts: u32,
}

impl ChannelSettings {
    /// Creates channel settings.
    #[must_use]
    pub fn new(enabled: bool, cooldown_ms: u64, max_alerts: u32) -> Self {
        Self {
            enabled,
            cooldown_ms,
            max_alerts: max_alerts.max(1),
        }
    }

    /// Cooldown as a signed duration.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::milliseconds(self.cooldown_ms as i64)
    }
}

/// Settings table covering every alert channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelsConfig {
    /// Head raised channel
    pub head_up: ChannelSettings,
    /// Head lowered channel
    pub head_down: ChannelSettings,
    /// Head turned left channel
    pub head_left: ChannelSettings,
    /// Head turned right channel
    pub head_right: ChannelSettings,
    /// Gaze off-center channel
    pub gaze: ChannelSettings,
    /// Mouth open channel
    pub mouth: ChannelSettings,
    /// Multiple faces channel
    pub multi_face: ChannelSettings,
    /// No face detected channel
    pub no_face: ChannelSettings,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            head_up: ChannelSettings::new(true, 3000, 3),
            head_down: ChannelSettings::new(true, 3000, 3),
            head_left: ChannelSettings::new(true, 3000, 3),
            head_right: ChannelSettings::new(true, 3000, 3),
            gaze: ChannelSettings::new(true, 4000, 3),
            mouth: ChannelSettings::new(true, 2000, 5),
            multi_face: ChannelSettings::new(true, 5000, 3),
            no_face: ChannelSettings::new(true, 5000, 3),
        }
    }
}

impl ChannelsConfig {
    /// Returns the settings for a channel.
    #[must_use]
    pub fn settings_for(&self, channel: ChannelId) -> &ChannelSettings {
        match channel {
            ChannelId::HeadUp => &self.head_up,
            ChannelId::HeadDown => &self.head_down,
            ChannelId::HeadLeft => &self.head_left,
            ChannelId::HeadRight => &self.head_right,
            ChannelId::Gaze => &self.gaze,
            ChannelId::Mouth => &self.mouth,
            ChannelId::MultiFace => &self.multi_face,
            ChannelId::NoFace => &self.no_face,
        }
    }
}

/// Pose classification thresholds, in degrees unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseConfig {
    /// Deviations below this magnitude are neutral
    pub neutral_range_deg: f64,
    /// Downward pitch deviation that alerts
    pub down_threshold_deg: f64,
    /// Upward pitch deviation that alerts
    pub up_threshold_deg: f64,
    /// Lateral yaw deviation that alerts
    pub lateral_threshold_deg: f64,
    /// Nose offset as a fraction of shoulder width that alerts laterally
    /// in the ratio fallback
    pub lateral_ratio_threshold: f64,
    /// Nose position within the forehead-chin span above which the head
    /// counts as lowered (ratio fallback)
    pub down_ratio_threshold: f64,
    /// Nose position within the forehead-chin span below which the head
    /// counts as raised (ratio fallback)
    pub up_ratio_threshold: f64,
    /// Kalman process noise for the angle streams
    pub filter_process_noise: f64,
    /// Kalman measurement noise for the angle streams
    pub filter_measurement_noise: f64,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            neutral_range_deg: 8.0,
            down_threshold_deg: 15.0,
            up_threshold_deg: 12.0,
            lateral_threshold_deg: 20.0,
            lateral_ratio_threshold: 0.15,
            down_ratio_threshold: 0.62,
            up_ratio_threshold: 0.40,
            filter_process_noise: 1e-3,
            filter_measurement_noise: 1e-1,
        }
    }
}

/// Gaze classification tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeConfig {
    /// Iris offset, as a fraction of eye width, that maps to 100%
    /// confidence
    pub full_scale_offset_ratio: f64,
    /// Confidence below which the gaze counts as centered
    pub centered_below: f64,
    /// Confidence above which an off-center gaze alerts
    pub alert_above: f64,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            full_scale_offset_ratio: 0.35,
            centered_below: 60.0,
            alert_above: 75.0,
        }
    }
}

/// Mouth classification tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouthConfig {
    /// Normalized lip separation above which the mouth counts as open
    pub open_threshold: f64,
}

impl Default for MouthConfig {
    fn default() -> Self {
        Self {
            open_threshold: 0.05,
        }
    }
}

/// Attention score integration factors, per second of elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// Score gained per attentive second
    pub attention_increment: f64,
    /// Score lost per deviant second
    pub attention_decrement: f64,
    /// Score lost per second without a detected face
    pub no_face_decrement: f64,
    /// Starting score
    pub initial_score: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            attention_increment: 2.0,
            attention_decrement: 5.0,
            no_face_decrement: 10.0,
            initial_score: 100.0,
        }
    }
}

/// Alert aggregation and flush tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Interval of the background flush timer in milliseconds
    pub flush_interval_ms: u64,
    /// Hard capacity of the alert buffer; oldest entries evict first
    pub buffer_cap: usize,
    /// Buffered event count that triggers an early flush
    pub flush_min_events: usize,
    /// Critical event count that triggers an early flush
    pub flush_min_critical: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            flush_interval_ms: 60_000,
            buffer_cap: 50,
            flush_min_events: 10,
            flush_min_critical: 5,
        }
    }
}

impl AggregatorConfig {
    /// Flush timer interval as a std duration.
    #[must_use]
    pub fn flush_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.flush_interval_ms)
    }
}

/// Top-level engine configuration with explicit defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Capture device identifier reported with dispatched batches
    pub device_id: String,
    /// Monitored subject identifier
    pub subject_id: String,
    /// Pose detection mode
    pub detection_mode: DetectionMode,
    /// Frames averaged into the calibration baseline
    pub reference_frames: usize,
    /// Frames in the pose smoothing window
    pub smoothing_frames: usize,
    /// Pose thresholds
    pub pose: PoseConfig,
    /// Gaze tuning
    pub gaze: GazeConfig,
    /// Mouth tuning
    pub mouth: MouthConfig,
    /// Attention score factors
    pub score: ScoreConfig,
    /// Aggregation and flush tuning
    pub aggregator: AggregatorConfig,
    /// Per-channel alerting knobs
    pub channels: ChannelsConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            device_id: "unknown-device".to_string(),
            subject_id: "unknown-subject".to_string(),
            detection_mode: DetectionMode::Full,
            reference_frames: 30,
            smoothing_frames: 5,
            pose: PoseConfig::default(),
            gaze: GazeConfig::default(),
            mouth: MouthConfig::default(),
            score: ScoreConfig::default(),
            aggregator: AggregatorConfig::default(),
            channels: ChannelsConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> MonitorConfigBuilder {
        MonitorConfigBuilder::default()
    }

    /// Applies a partial override, returning the merged configuration.
    ///
    /// Only fields present in the patch change; everything else keeps
    /// its current value.
    #[must_use]
    pub fn merged(mut self, patch: MonitorConfigPatch) -> Self {
        if let Some(v) = patch.device_id {
            self.device_id = v;
        }
        if let Some(v) = patch.subject_id {
            self.subject_id = v;
        }
        if let Some(v) = patch.detection_mode {
            self.detection_mode = v;
        }
        if let Some(v) = patch.reference_frames {
            self.reference_frames = v.max(1);
        }
        if let Some(v) = patch.smoothing_frames {
            self.smoothing_frames = v.max(1);
        }
        if let Some(p) = patch.pose {
            self.pose = p.apply(self.pose);
        }
        if let Some(p) = patch.gaze {
            self.gaze = p.apply(self.gaze);
        }
        if let Some(p) = patch.mouth {
            self.mouth = p.apply(self.mouth);
        }
        if let Some(p) = patch.score {
            self.score = p.apply(self.score);
        }
        if let Some(p) = patch.aggregator {
            self.aggregator = p.apply(self.aggregator);
        }
        if let Some(p) = patch.channels {
            self.channels = p.apply(self.channels);
        }
        self
    }

    /// Builds a configuration from a JSON override document.
    ///
    /// A malformed document falls back to the full defaults; partial
    /// documents merge over the defaults field by field.
    #[must_use]
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<MonitorConfigPatch>(json) {
            Ok(patch) => Self::default().merged(patch),
            Err(error) => {
                warn!(%error, "malformed config override, using defaults");
                Self::default()
            }
        }
    }
}

/// Builder for [`MonitorConfig`].
#[derive(Debug, Default)]
pub struct MonitorConfigBuilder {
    config: MonitorConfig,
}

impl MonitorConfigBuilder {
    /// Set the capture device identifier.
    #[must_use]
    pub fn device_id(mut self, id: impl Into<String>) -> Self {
        self.config.device_id = id.into();
        self
    }

    /// Set the subject identifier.
    #[must_use]
    pub fn subject_id(mut self, id: impl Into<String>) -> Self {
        self.config.subject_id = id.into();
        self
    }

    /// Set the pose detection mode.
    #[must_use]
    pub fn detection_mode(mut self, mode: DetectionMode) -> Self {
        self.config.detection_mode = mode;
        self
    }

    /// Set the number of calibration reference frames (at least 1).
    #[must_use]
    pub fn reference_frames(mut self, frames: usize) -> Self {
        self.config.reference_frames = frames.max(1);
        self
    }

    /// Set the pose smoothing window size (at least 1).
    #[must_use]
    pub fn smoothing_frames(mut self, frames: usize) -> Self {
        self.config.smoothing_frames = frames.max(1);
        self
    }

    /// Replace the pose thresholds.
    #[must_use]
    pub fn pose(mut self, pose: PoseConfig) -> Self {
        self.config.pose = pose;
        self
    }

    /// Replace the gaze tuning.
    #[must_use]
    pub fn gaze(mut self, gaze: GazeConfig) -> Self {
        self.config.gaze = gaze;
        self
    }

    /// Replace the mouth tuning.
    #[must_use]
    pub fn mouth(mut self, mouth: MouthConfig) -> Self {
        self.config.mouth = mouth;
        self
    }

    /// Replace the attention score factors.
    #[must_use]
    pub fn score(mut self, score: ScoreConfig) -> Self {
        self.config.score = score;
        self
    }

    /// Replace the aggregation tuning.
    #[must_use]
    pub fn aggregator(mut self, aggregator: AggregatorConfig) -> Self {
        self.config.aggregator = aggregator;
        self
    }

    /// Replace the channel settings table.
    #[must_use]
    pub fn channels(mut self, channels: ChannelsConfig) -> Self {
        self.config.channels = channels;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> MonitorConfig {
        self.config
    }
}

// =============================================================================
// Partial override documents
// =============================================================================

/// Partial override for [`ChannelSettings`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChannelSettingsPatch {
    /// Override the enabled flag
    pub enabled: Option<bool>,
    /// Override the cooldown
    pub cooldown_ms: Option<u64>,
    /// Override the escalation limit
    pub max_alerts: Option<u32>,
}

impl ChannelSettingsPatch {
    fn apply(self, mut base: ChannelSettings) -> ChannelSettings {
        if let Some(v) = self.enabled {
            base.enabled = v;
        }
        if let Some(v) = self.cooldown_ms {
            base.cooldown_ms = v;
        }
        if let Some(v) = self.max_alerts {
            base.max_alerts = v.max(1);
        }
        base
    }
}

/// Partial override for the channel settings table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChannelsPatch {
    /// Head raised channel override
    pub head_up: Option<ChannelSettingsPatch>,
    /// Head lowered channel override
    pub head_down: Option<ChannelSettingsPatch>,
    /// Head turned left channel override
    pub head_left: Option<ChannelSettingsPatch>,
    /// Head turned right channel override
    pub head_right: Option<ChannelSettingsPatch>,
    /// Gaze channel override
    pub gaze: Option<ChannelSettingsPatch>,
    /// Mouth channel override
    pub mouth: Option<ChannelSettingsPatch>,
    /// Multiple faces channel override
    pub multi_face: Option<ChannelSettingsPatch>,
    /// No face channel override
    pub no_face: Option<ChannelSettingsPatch>,
}

impl ChannelsPatch {
    fn apply(self, mut base: ChannelsConfig) -> ChannelsConfig {
        if let Some(p) = self.head_up {
            base.head_up = p.apply(base.head_up);
        }
        if let Some(p) = self.head_down {
            base.head_down = p.apply(base.head_down);
        }
        if let Some(p) = self.head_left {
            base.head_left = p.apply(base.head_left);
        }
        if let Some(p) = self.head_right {
            base.head_right = p.apply(base.head_right);
        }
        if let Some(p) = self.gaze {
            base.gaze = p.apply(base.gaze);
        }
        if let Some(p) = self.mouth {
            base.mouth = p.apply(base.mouth);
        }
        if let Some(p) = self.multi_face {
            base.multi_face = p.apply(base.multi_face);
        }
        if let Some(p) = self.no_face {
            base.no_face = p.apply(base.no_face);
        }
        base
    }
}

/// Partial override for [`PoseConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PoseConfigPatch {
    /// Override the neutral range
    pub neutral_range_deg: Option<f64>,
    /// Override the downward threshold
    pub down_threshold_deg: Option<f64>,
    /// Override the upward threshold
    pub up_threshold_deg: Option<f64>,
    /// Override the lateral threshold
    pub lateral_threshold_deg: Option<f64>,
    /// Override the lateral ratio threshold
    pub lateral_ratio_threshold: Option<f64>,
    /// Override the downward ratio threshold
    pub down_ratio_threshold: Option<f64>,
    /// Override the upward ratio threshold
    pub up_ratio_threshold: Option<f64>,
}

impl PoseConfigPatch {
    fn apply(self, mut base: PoseConfig) -> PoseConfig {
        if let Some(v) = self.neutral_range_deg {
            base.neutral_range_deg = v;
        }
        if let Some(v) = self.down_threshold_deg {
            base.down_threshold_deg = v;
        }
        if let Some(v) = self.up_threshold_deg {
            base.up_threshold_deg = v;
        }
        if let Some(v) = self.lateral_threshold_deg {
            base.lateral_threshold_deg = v;
        }
        if let Some(v) = self.lateral_ratio_threshold {
            base.lateral_ratio_threshold = v;
        }
        if let Some(v) = self.down_ratio_threshold {
            base.down_ratio_threshold = v;
        }
        if let Some(v) = self.up_ratio_threshold {
            base.up_ratio_threshold = v;
        }
        base
    }
}

/// Partial override for [`GazeConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GazeConfigPatch {
    /// Override the full-scale offset ratio
    pub full_scale_offset_ratio: Option<f64>,
    /// Override the centered threshold
    pub centered_below: Option<f64>,
    /// Override the alert threshold
    pub alert_above: Option<f64>,
}

impl GazeConfigPatch {
    fn apply(self, mut base: GazeConfig) -> GazeConfig {
        if let Some(v) = self.full_scale_offset_ratio {
            base.full_scale_offset_ratio = v;
        }
        if let Some(v) = self.centered_below {
            base.centered_below = v;
        }
        if let Some(v) = self.alert_above {
            base.alert_above = v;
        }
        base
    }
}

/// Partial override for [`MouthConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MouthConfigPatch {
    /// Override the open threshold
    pub open_threshold: Option<f64>,
}

impl MouthConfigPatch {
    fn apply(self, mut base: MouthConfig) -> MouthConfig {
        if let Some(v) = self.open_threshold {
            base.open_threshold = v;
        }
        base
    }
}

/// Partial override for [`ScoreConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoreConfigPatch {
    /// Override the attentive increment
    pub attention_increment: Option<f64>,
    /// Override the deviant decrement
    pub attention_decrement: Option<f64>,
    /// Override the no-face decrement
    pub no_face_decrement: Option<f64>,
}

impl ScoreConfigPatch {
    fn apply(self, mut base: ScoreConfig) -> ScoreConfig {
        if let Some(v) = self.attention_increment {
            base.attention_increment = v;
        }
        if let Some(v) = self.attention_decrement {
            base.attention_decrement = v;
        }
        if let Some(v) = self.no_face_decrement {
            base.no_face_decrement = v;
        }
        base
    }
}

/// Partial override for [`AggregatorConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AggregatorConfigPatch {
    /// Override the flush interval
    pub flush_interval_ms: Option<u64>,
    /// Override the buffer capacity
    pub buffer_cap: Option<usize>,
    /// Override the count trigger
    pub flush_min_events: Option<usize>,
    /// Override the critical trigger
    pub flush_min_critical: Option<usize>,
}

impl AggregatorConfigPatch {
    fn apply(self, mut base: AggregatorConfig) -> AggregatorConfig {
        if let Some(v) = self.flush_interval_ms {
            base.flush_interval_ms = v;
        }
        if let Some(v) = self.buffer_cap {
            base.buffer_cap = v.max(1);
        }
        if let Some(v) = self.flush_min_events {
            base.flush_min_events = v;
        }
        if let Some(v) = self.flush_min_critical {
            base.flush_min_critical = v;
        }
        base
    }
}

/// Top-level partial override document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MonitorConfigPatch {
    /// Override the device identifier
    pub device_id: Option<String>,
    /// Override the subject identifier
    pub subject_id: Option<String>,
    /// Override the detection mode
    pub detection_mode: Option<DetectionMode>,
    /// Override the calibration frame count
    pub reference_frames: Option<usize>,
    /// Override the smoothing window size
    pub smoothing_frames: Option<usize>,
    /// Override pose thresholds
    pub pose: Option<PoseConfigPatch>,
    /// Override gaze tuning
    pub gaze: Option<GazeConfigPatch>,
    /// Override mouth tuning
    pub mouth: Option<MouthConfigPatch>,
    /// Override score factors
    pub score: Option<ScoreConfigPatch>,
    /// Override aggregation tuning
    pub aggregator: Option<AggregatorConfigPatch>,
    /// Override channel settings
    pub channels: Option<ChannelsPatch>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.reference_frames, 30);
        assert_eq!(config.smoothing_frames, 5);
        assert_eq!(config.aggregator.flush_interval_ms, 60_000);
        assert_eq!(config.aggregator.buffer_cap, 50);
        assert_eq!(config.aggregator.flush_min_events, 10);
        assert_eq!(config.aggregator.flush_min_critical, 5);
        assert_eq!(config.channels.mouth.max_alerts, 5);
        assert!((config.pose.neutral_range_deg - 8.0).abs() < f64::EPSILON);
        assert!((config.pose.lateral_ratio_threshold - 0.15).abs() < f64::EPSILON);
    }

    #[test]
    fn test_builder_clamps() {
        let config = MonitorConfig::builder()
            .reference_frames(0)
            .smoothing_frames(0)
            .build();
        assert_eq!(config.reference_frames, 1);
        assert_eq!(config.smoothing_frames, 1);
    }

    #[test]
    fn test_partial_merge_keeps_defaults() {
        let json = r#"{
            "reference_frames": 10,
            "channels": { "mouth": { "cooldown_ms": 1500 } },
            "pose": { "lateral_threshold_deg": 25.0 }
        }"#;
        let config = MonitorConfig::from_json(json);

        assert_eq!(config.reference_frames, 10);
        assert_eq!(config.channels.mouth.cooldown_ms, 1500);
        // Untouched fields keep their defaults
        assert_eq!(config.channels.mouth.max_alerts, 5);
        assert!((config.pose.lateral_threshold_deg - 25.0).abs() < f64::EPSILON);
        assert!((config.pose.down_threshold_deg - 15.0).abs() < f64::EPSILON);
        assert_eq!(config.smoothing_frames, 5);
    }

    #[test]
    fn test_malformed_override_falls_back_to_defaults() {
        let config = MonitorConfig::from_json("{ not json");
        assert_eq!(config, MonitorConfig::default());

        let config = MonitorConfig::from_json(r#"{"reference_frames": "thirty"}"#);
        assert_eq!(config, MonitorConfig::default(), "type mismatch should fall back whole");
    }

    #[test]
    fn test_channel_settings_lookup() {
        let channels = ChannelsConfig::default();
        for channel in ChannelId::ALL {
            let settings = channels.settings_for(channel);
            assert!(settings.enabled, "channel {channel} should default enabled");
            assert!(settings.cooldown_ms > 0);
        }
    }
}
