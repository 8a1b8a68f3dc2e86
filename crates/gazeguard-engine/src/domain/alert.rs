//! Alert events emitted by the threshold engine.
//!
//! An [`AlertEvent`] is immutable once created: the aggregation layer
//! buffers, evicts, and dispatches events but never mutates them.

use chrono::{DateTime, Utc};
use gazeguard_core::PoseAngles;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::channel::{ChannelId, GazeDirection};

/// Unique identifier for an alert event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertId(Uuid);

impl AlertId {
    /// Creates a new unique alert ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AlertId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AlertId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Alert severity, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational notice
    Info,
    /// Deviation worth attention
    Warning,
    /// Sustained or escalated deviation
    Danger,
}

impl Severity {
    /// Returns the severity name as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }

    /// Returns `true` if this severity counts toward the critical flush
    /// trigger of the aggregator.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Warning | Self::Danger)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Gaze direction with its percentage confidence at alert time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeSnapshot {
    /// Dominant gaze direction
    pub direction: GazeDirection,
    /// Confidence in [0, 100]
    pub confidence: f64,
}

/// Snapshot of channel context captured with each alert.
///
/// All fields are optional; a channel only populates the context it had
/// available when the alert fired.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertContext {
    /// Smoothed pose deviation from the calibration baseline, degrees
    pub pose_deviation: Option<PoseAngles>,
    /// Gaze direction and confidence
    pub gaze: Option<GazeSnapshot>,
    /// Seconds the current gaze direction has been held
    pub focus_secs: Option<f64>,
    /// Whether the mouth was open
    pub mouth_open: bool,
    /// Attention score at alert time, [0, 100]
    pub attention_score: f64,
}

impl AlertContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a pose deviation snapshot.
    #[must_use]
    pub fn with_pose_deviation(mut self, deviation: PoseAngles) -> Self {
        self.pose_deviation = Some(deviation);
        self
    }

    /// Attaches a gaze snapshot.
    #[must_use]
    pub fn with_gaze(mut self, direction: GazeDirection, confidence: f64) -> Self {
        self.gaze = Some(GazeSnapshot {
            direction,
            confidence,
        });
        self
    }

    /// Attaches the current focus duration in seconds.
    #[must_use]
    pub fn with_focus_secs(mut self, secs: f64) -> Self {
        self.focus_secs = Some(secs);
        self
    }

    /// Marks the mouth as open.
    #[must_use]
    pub fn with_mouth_open(mut self, open: bool) -> Self {
        self.mouth_open = open;
        self
    }

    /// Attaches the attention score snapshot.
    #[must_use]
    pub fn with_attention_score(mut self, score: f64) -> Self {
        self.attention_score = score;
        self
    }
}

/// An immutable alert emitted by the threshold engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    id: AlertId,
    channel: ChannelId,
    severity: Severity,
    message: String,
    context: AlertContext,
    timestamp: DateTime<Utc>,
}

impl AlertEvent {
    /// Creates a new alert event timestamped at `timestamp`.
    #[must_use]
    pub fn new(
        channel: ChannelId,
        severity: Severity,
        message: impl Into<String>,
        context: AlertContext,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AlertId::new(),
            channel,
            severity,
            message: message.into(),
            context,
            timestamp,
        }
    }

    /// Returns the alert ID.
    #[must_use]
    pub fn id(&self) -> &AlertId {
        &self.id
    }

    /// Returns the channel that produced this alert.
    #[must_use]
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Returns the severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the captured channel context.
    #[must_use]
    pub fn context(&self) -> &AlertContext {
        &self.context
    }

    /// Returns the emission timestamp.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns `true` if this event counts toward the critical flush trigger.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.severity.is_critical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Danger);
    }

    #[test]
    fn test_severity_critical() {
        assert!(!Severity::Info.is_critical());
        assert!(Severity::Warning.is_critical());
        assert!(Severity::Danger.is_critical());
    }

    #[test]
    fn test_alert_event_accessors() {
        let context = AlertContext::new()
            .with_gaze(GazeDirection::Left, 82.0)
            .with_attention_score(64.0);
        let event = AlertEvent::new(
            ChannelId::Gaze,
            Severity::Warning,
            "Gaze held left",
            context,
            Utc::now(),
        );

        assert_eq!(event.channel(), ChannelId::Gaze);
        assert_eq!(event.severity(), Severity::Warning);
        assert_eq!(event.message(), "Gaze held left");
        assert!(event.is_critical());

        let gaze = event.context().gaze.unwrap();
        assert_eq!(gaze.direction, GazeDirection::Left);
        assert!((gaze.confidence - 82.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_alert_ids_unique() {
        let a = AlertId::new();
        let b = AlertId::new();
        assert_ne!(a, b);
    }
}
