//! Per-channel alert gating.
//!
//! The threshold engine owns one [`ChannelState`] per channel in a
//! single table indexed by [`ChannelId`]. A channel whose condition
//! fires emits at most one alert per cooldown window; reaching the
//! channel's `max_alerts` turns that emission into a danger aggregate
//! and resets the escalation counter.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::ChannelsConfig;
use crate::domain::channel::CHANNEL_COUNT;
use crate::domain::{AlertContext, AlertEvent, ChannelId, ChannelState, Severity};

/// Cooldown and escalation gate for all alert channels.
#[derive(Debug)]
pub struct AlertThresholdEngine {
    channels: ChannelsConfig,
    states: [ChannelState; CHANNEL_COUNT],
}

impl AlertThresholdEngine {
    /// Creates an engine with all channels idle.
    #[must_use]
    pub fn new(channels: ChannelsConfig) -> Self {
        Self {
            channels,
            states: [ChannelState::new(); CHANNEL_COUNT],
        }
    }

    /// Evaluates a fired condition on `channel` at `now`.
    ///
    /// Returns the alert to record, or `None` when the channel is
    /// disabled or still cooling down. The emission that reaches the
    /// channel's `max_alerts` is a danger aggregate and resets the
    /// escalation counter; every other emission is a warning.
    pub fn evaluate(
        &mut self,
        channel: ChannelId,
        message: impl Into<String>,
        context: AlertContext,
        now: DateTime<Utc>,
    ) -> Option<AlertEvent> {
        let settings = *self.channels.settings_for(channel);
        if !settings.enabled {
            return None;
        }

        let state = &mut self.states[channel as usize];
        if !state.cooldown_elapsed(now, settings.cooldown()) {
            debug!(channel = %channel, "alert suppressed by cooldown");
            return None;
        }

        state.record_alert(now);

        if state.escalation_count >= settings.max_alerts {
            let count = state.escalation_count;
            state.reset_escalation();
            return Some(AlertEvent::new(
                channel,
                Severity::Danger,
                format!("{} repeated {count} times", channel.label()),
                context,
                now,
            ));
        }

        Some(AlertEvent::new(
            channel,
            Severity::Warning,
            message,
            context,
            now,
        ))
    }

    /// Current bookkeeping for a channel.
    #[must_use]
    pub fn state(&self, channel: ChannelId) -> &ChannelState {
        &self.states[channel as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChannelSettings, ChannelsConfig};
    use chrono::Duration;

    fn engine() -> AlertThresholdEngine {
        AlertThresholdEngine::new(ChannelsConfig::default())
    }

    fn fire(
        engine: &mut AlertThresholdEngine,
        channel: ChannelId,
        now: DateTime<Utc>,
    ) -> Option<AlertEvent> {
        engine.evaluate(channel, "condition fired", AlertContext::new(), now)
    }

    #[test]
    fn test_first_emission_is_warning() {
        let mut engine = engine();
        let alert = fire(&mut engine, ChannelId::HeadDown, Utc::now()).unwrap();
        assert_eq!(alert.severity(), Severity::Warning);
        assert_eq!(alert.channel(), ChannelId::HeadDown);
    }

    #[test]
    fn test_cooldown_suppresses_within_window() {
        let mut engine = engine();
        let t0 = Utc::now();
        assert!(fire(&mut engine, ChannelId::Gaze, t0).is_some());

        // Gaze cooldown defaults to 4000 ms
        assert!(fire(&mut engine, ChannelId::Gaze, t0 + Duration::milliseconds(3999)).is_none());
        assert!(fire(&mut engine, ChannelId::Gaze, t0 + Duration::milliseconds(4000)).is_some());
    }

    #[test]
    fn test_channels_cool_down_independently() {
        let mut engine = engine();
        let t0 = Utc::now();
        assert!(fire(&mut engine, ChannelId::HeadLeft, t0).is_some());
        assert!(
            fire(&mut engine, ChannelId::HeadRight, t0).is_some(),
            "a different channel must not share the cooldown"
        );
    }

    #[test]
    fn test_disabled_channel_never_alerts() {
        let mut channels = ChannelsConfig::default();
        channels.multi_face = ChannelSettings::new(false, 0, 3);
        let mut engine = AlertThresholdEngine::new(channels);

        assert!(fire(&mut engine, ChannelId::MultiFace, Utc::now()).is_none());
        assert_eq!(engine.state(ChannelId::MultiFace).escalation_count, 0);
    }

    #[test]
    fn test_escalation_danger_exactly_once_then_reset() {
        let mut channels = ChannelsConfig::default();
        channels.mouth = ChannelSettings::new(true, 1000, 5);
        let mut engine = AlertThresholdEngine::new(channels);

        let t0 = Utc::now();
        let mut severities = Vec::new();
        for i in 0..10 {
            let now = t0 + Duration::seconds(i * 2);
            if let Some(alert) = fire(&mut engine, ChannelId::Mouth, now) {
                severities.push(alert.severity());
            }
        }

        // Two full cycles: four warnings then a danger, twice
        let expected = vec![
            Severity::Warning,
            Severity::Warning,
            Severity::Warning,
            Severity::Warning,
            Severity::Danger,
            Severity::Warning,
            Severity::Warning,
            Severity::Warning,
            Severity::Warning,
            Severity::Danger,
        ];
        assert_eq!(severities, expected);
        assert_eq!(engine.state(ChannelId::Mouth).escalation_count, 0);
    }

    #[test]
    fn test_last_alert_time_moves_forward() {
        let mut engine = engine();
        let t0 = Utc::now();
        fire(&mut engine, ChannelId::NoFace, t0);
        let first = engine.state(ChannelId::NoFace).last_alert_at.unwrap();

        fire(&mut engine, ChannelId::NoFace, t0 + Duration::seconds(10));
        let second = engine.state(ChannelId::NoFace).last_alert_at.unwrap();
        assert!(second > first);
    }
}
