//! Typed event stream exposed to observers.
//!
//! The engine communicates with presentation layers exclusively through
//! pure-data [`MonitorEvent`] values delivered to registered
//! [`MonitorObserver`]s. No callback receives mutable engine state.

use chrono::{DateTime, Utc};
use gazeguard_core::PoseAngles;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::alert::AlertEvent;

/// A typed notification emitted by the monitoring session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// Calibration finished and the baseline is frozen
    CalibrationCompleted {
        /// The frozen neutral-pose baseline, degrees
        baseline: PoseAngles,
        /// When calibration completed
        timestamp: DateTime<Utc>,
    },
    /// An alert passed the threshold engine
    Alert(AlertEvent),
    /// The attention score changed
    ScoreUpdated {
        /// New score in [0, 100]
        score: f64,
        /// When the score was updated
        timestamp: DateTime<Utc>,
    },
    /// The session was stopped and the flush timer cancelled
    SessionStopped {
        /// When the session stopped
        timestamp: DateTime<Utc>,
    },
}

impl MonitorEvent {
    /// Returns the event timestamp.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::CalibrationCompleted { timestamp, .. }
            | Self::ScoreUpdated { timestamp, .. }
            | Self::SessionStopped { timestamp } => *timestamp,
            Self::Alert(event) => event.timestamp(),
        }
    }

    /// Returns the event type as a string.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CalibrationCompleted { .. } => "calibration_completed",
            Self::Alert(_) => "alert",
            Self::ScoreUpdated { .. } => "score_updated",
            Self::SessionStopped { .. } => "session_stopped",
        }
    }
}

/// Observer registered on a monitoring session.
///
/// Implementations must be cheap; `on_event` runs on the frame path.
pub trait MonitorObserver: Send + Sync {
    /// Called for every event the session emits.
    fn on_event(&self, event: &MonitorEvent);
}

/// Event log keeping all events in memory.
///
/// Useful for tests and for presentation layers that poll instead of
/// subscribing.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    events: RwLock<Vec<MonitorEvent>>,
}

impl InMemoryEventLog {
    /// Creates an empty event log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<MonitorEvent> {
        self.events.read().clone()
    }

    /// Returns all recorded alert events.
    #[must_use]
    pub fn alerts(&self) -> Vec<AlertEvent> {
        self.events
            .read()
            .iter()
            .filter_map(|e| match e {
                MonitorEvent::Alert(alert) => Some(alert.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns `true` if no events were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl MonitorObserver for InMemoryEventLog {
    fn on_event(&self, event: &MonitorEvent) {
        self.events.write().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alert::AlertContext;
    use crate::domain::channel::ChannelId;
    use crate::domain::Severity;

    #[test]
    fn test_event_type_names() {
        let event = MonitorEvent::ScoreUpdated {
            score: 80.0,
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type(), "score_updated");
    }

    #[test]
    fn test_in_memory_log_records() {
        let log = InMemoryEventLog::new();
        assert!(log.is_empty());

        log.on_event(&MonitorEvent::SessionStopped {
            timestamp: Utc::now(),
        });
        log.on_event(&MonitorEvent::Alert(AlertEvent::new(
            ChannelId::Mouth,
            Severity::Warning,
            "Mouth open",
            AlertContext::new(),
            Utc::now(),
        )));

        assert_eq!(log.len(), 2);
        assert_eq!(log.alerts().len(), 1);
    }
}
