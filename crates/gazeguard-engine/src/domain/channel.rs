//! Alert channels and per-channel threshold state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Direction vocabulary for head pose deviations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoseDirection {
    /// Head nodded downward past threshold
    Down,
    /// Head raised upward past threshold
    Up,
    /// Head turned to the subject's left
    Left,
    /// Head turned to the subject's right
    Right,
    /// Head tilted sideways
    Tilted,
}

impl PoseDirection {
    /// Returns the direction name as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
            Self::Left => "left",
            Self::Right => "right",
            Self::Tilted => "tilted",
        }
    }
}

impl std::fmt::Display for PoseDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction vocabulary for gaze classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GazeDirection {
    /// Gaze resting near the eye center
    Center,
    /// Gaze shifted left
    Left,
    /// Gaze shifted right
    Right,
    /// Gaze shifted up
    Up,
    /// Gaze shifted down
    Down,
}

impl GazeDirection {
    /// Returns the direction name as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl std::fmt::Display for GazeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifier for an alert channel.
///
/// Every monitored condition belongs to exactly one channel; cooldown and
/// escalation bookkeeping is kept per channel in a single owned table
/// indexed by this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ChannelId {
    /// Head raised above the vertical threshold
    HeadUp = 0,
    /// Head lowered below the vertical threshold
    HeadDown = 1,
    /// Head turned left past the lateral threshold
    HeadLeft = 2,
    /// Head turned right past the lateral threshold
    HeadRight = 3,
    /// Gaze held off-center with high confidence
    Gaze = 4,
    /// Mouth open past the separation threshold
    Mouth = 5,
    /// More than one face in the frame
    MultiFace = 6,
    /// No face detected
    NoFace = 7,
}

/// Number of alert channels.
pub const CHANNEL_COUNT: usize = 8;

impl ChannelId {
    /// All channels in table order.
    pub const ALL: [Self; CHANNEL_COUNT] = [
        Self::HeadUp,
        Self::HeadDown,
        Self::HeadLeft,
        Self::HeadRight,
        Self::Gaze,
        Self::Mouth,
        Self::MultiFace,
        Self::NoFace,
    ];

    /// Returns the channel name as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HeadUp => "head_up",
            Self::HeadDown => "head_down",
            Self::HeadLeft => "head_left",
            Self::HeadRight => "head_right",
            Self::Gaze => "gaze",
            Self::Mouth => "mouth",
            Self::MultiFace => "multi_face",
            Self::NoFace => "no_face",
        }
    }

    /// Human-readable label used in dispatched reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::HeadUp => "Head raised",
            Self::HeadDown => "Head lowered",
            Self::HeadLeft => "Head turned left",
            Self::HeadRight => "Head turned right",
            Self::Gaze => "Gaze off-center",
            Self::Mouth => "Mouth open",
            Self::MultiFace => "Multiple faces",
            Self::NoFace => "No face detected",
        }
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-channel threshold bookkeeping.
///
/// Invariant: `last_alert_at` only ever moves forward in time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelState {
    /// When this channel last emitted an alert
    pub last_alert_at: Option<DateTime<Utc>>,
    /// Alerts emitted since the last escalation reset
    pub escalation_count: u32,
}

impl ChannelState {
    /// Creates an idle channel state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the cooldown window has elapsed at `now`.
    ///
    /// A channel that has never alerted is always past cooldown.
    #[must_use]
    pub fn cooldown_elapsed(&self, now: DateTime<Utc>, cooldown: Duration) -> bool {
        match self.last_alert_at {
            Some(last) => now.signed_duration_since(last) >= cooldown,
            None => true,
        }
    }

    /// Records an alert emission at `now` and bumps the escalation count.
    ///
    /// `last_alert_at` never moves backwards, even if a stale timestamp
    /// is supplied.
    pub fn record_alert(&mut self, now: DateTime<Utc>) {
        match self.last_alert_at {
            Some(last) if last > now => {}
            _ => self.last_alert_at = Some(now),
        }
        self.escalation_count += 1;
    }

    /// Resets the escalation counter after a danger aggregate fired.
    pub fn reset_escalation(&mut self) {
        self.escalation_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_table_order() {
        for (i, channel) in ChannelId::ALL.iter().enumerate() {
            assert_eq!(*channel as usize, i, "channel {channel} out of table order");
        }
    }

    #[test]
    fn test_cooldown_never_alerted() {
        let state = ChannelState::new();
        assert!(state.cooldown_elapsed(Utc::now(), Duration::seconds(3)));
    }

    #[test]
    fn test_cooldown_enforced() {
        let now = Utc::now();
        let mut state = ChannelState::new();
        state.record_alert(now);

        let within = now + Duration::milliseconds(2999);
        let past = now + Duration::milliseconds(3000);
        assert!(!state.cooldown_elapsed(within, Duration::milliseconds(3000)));
        assert!(state.cooldown_elapsed(past, Duration::milliseconds(3000)));
    }

    #[test]
    fn test_last_alert_monotonic() {
        let now = Utc::now();
        let mut state = ChannelState::new();
        state.record_alert(now);
        state.record_alert(now - Duration::seconds(10));

        assert_eq!(state.last_alert_at, Some(now), "stale timestamp must not rewind");
        assert_eq!(state.escalation_count, 2);
    }

    #[test]
    fn test_escalation_reset() {
        let mut state = ChannelState::new();
        state.record_alert(Utc::now());
        state.record_alert(Utc::now());
        state.reset_escalation();
        assert_eq!(state.escalation_count, 0);
        assert!(state.last_alert_at.is_some(), "reset must not clear last alert time");
    }
}
