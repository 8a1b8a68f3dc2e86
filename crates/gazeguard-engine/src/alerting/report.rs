//! Aggregated report generation.
//!
//! Each flush turns the drained batch of alert events into one
//! human-readable report plus the metadata the collector needs to file
//! it. Events are summarized in buffer order (oldest first).

use chrono::{DateTime, Utc};
use gazeguard_core::SessionId;
use serde::{Deserialize, Serialize};

use crate::domain::AlertEvent;

/// Alert-type identifier reported with every batch.
pub const ALERT_TYPE: &str = "attention_monitor";

/// Identity fields attached to every dispatched report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportIdentity {
    /// Capture device identifier
    pub device_id: String,
    /// Monitored subject identifier
    pub subject_id: String,
    /// Session this report belongs to
    pub session_id: SessionId,
}

/// One dispatched batch: metadata plus the aggregated text report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedReport {
    /// Alert-type identifier, always [`ALERT_TYPE`]
    pub alert_type: String,
    /// Capture device identifier
    pub device_id: String,
    /// Monitored subject identifier
    pub subject_id: String,
    /// Session identifier
    pub session_id: String,
    /// Events summarized in this report
    pub event_count: usize,
    /// Critical (warning or danger) events in this report
    pub critical_count: usize,
    /// Human-readable aggregated summary
    pub report: String,
    /// When this report was generated
    pub generated_at: DateTime<Utc>,
}

/// Builds aggregated reports for one session.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    identity: ReportIdentity,
}

impl ReportBuilder {
    /// Creates a builder for the given identity.
    #[must_use]
    pub fn new(identity: ReportIdentity) -> Self {
        Self { identity }
    }

    /// Builds one report from a drained batch.
    #[must_use]
    pub fn build(&self, events: &[AlertEvent]) -> AggregatedReport {
        let critical_count = events.iter().filter(|e| e.is_critical()).count();

        let mut report = format!(
            "Attention report for {} on {} - {} event(s), {} critical\n",
            self.identity.subject_id,
            self.identity.device_id,
            events.len(),
            critical_count,
        );
        for event in events {
            report.push_str(&format_event(event));
        }

        AggregatedReport {
            alert_type: ALERT_TYPE.to_string(),
            device_id: self.identity.device_id.clone(),
            subject_id: self.identity.subject_id.clone(),
            session_id: self.identity.session_id.to_string(),
            event_count: events.len(),
            critical_count,
            report,
            generated_at: Utc::now(),
        }
    }
}

/// Formats one event as an indented block.
fn format_event(event: &AlertEvent) -> String {
    let mut block = format!(
        "[{}] {} ({}): {}\n",
        event.timestamp().format("%H:%M:%S"),
        event.channel().label(),
        event.severity(),
        event.message(),
    );

    let context = event.context();
    if let Some(deviation) = context.pose_deviation {
        block.push_str(&format!(
            "  pose deviation: pitch {:.1} deg, yaw {:.1} deg, roll {:.1} deg\n",
            deviation.pitch, deviation.yaw, deviation.roll,
        ));
    }
    if let Some(gaze) = context.gaze {
        block.push_str(&format!(
            "  gaze: {} ({:.0}%)\n",
            gaze.direction, gaze.confidence,
        ));
    }
    if let Some(focus) = context.focus_secs {
        block.push_str(&format!("  focus: {focus:.1}s\n"));
    }
    if context.mouth_open {
        block.push_str("  mouth: open\n");
    }
    if context.attention_score > 30.0 {
        block.push_str(&format!(
            "  attention score: {:.0}\n",
            context.attention_score
        ));
    }

    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlertContext, ChannelId, GazeDirection, Severity};
    use gazeguard_core::PoseAngles;

    fn builder() -> ReportBuilder {
        ReportBuilder::new(ReportIdentity {
            device_id: "cam-7".to_string(),
            subject_id: "subject-12".to_string(),
            session_id: SessionId::new(),
        })
    }

    #[test]
    fn test_report_metadata() {
        let events = vec![
            AlertEvent::new(
                ChannelId::HeadRight,
                Severity::Warning,
                "Head turned right",
                AlertContext::new(),
                Utc::now(),
            ),
            AlertEvent::new(
                ChannelId::NoFace,
                Severity::Info,
                "Subject left the frame",
                AlertContext::new(),
                Utc::now(),
            ),
        ];

        let report = builder().build(&events);
        assert_eq!(report.alert_type, ALERT_TYPE);
        assert_eq!(report.event_count, 2);
        assert_eq!(report.critical_count, 1);
        assert_eq!(report.device_id, "cam-7");
        assert!(report.report.contains("2 event(s), 1 critical"));
    }

    #[test]
    fn test_event_block_includes_context() {
        let context = AlertContext::new()
            .with_pose_deviation(PoseAngles::new(2.1, 22.4, 0.3))
            .with_gaze(GazeDirection::Left, 82.0)
            .with_focus_secs(4.2)
            .with_mouth_open(true)
            .with_attention_score(64.0);
        let event = AlertEvent::new(
            ChannelId::Gaze,
            Severity::Warning,
            "Gaze held left",
            context,
            Utc::now(),
        );

        let report = builder().build(&[event]);
        assert!(report.report.contains("yaw 22.4 deg"));
        assert!(report.report.contains("gaze: left (82%)"));
        assert!(report.report.contains("focus: 4.2s"));
        assert!(report.report.contains("mouth: open"));
        assert!(report.report.contains("attention score: 64"));
    }

    #[test]
    fn test_low_score_and_closed_mouth_omitted() {
        let context = AlertContext::new().with_attention_score(12.0);
        let event = AlertEvent::new(
            ChannelId::NoFace,
            Severity::Warning,
            "Subject left the frame",
            context,
            Utc::now(),
        );

        let report = builder().build(&[event]);
        assert!(!report.report.contains("attention score"), "scores of 30 or below are omitted");
        assert!(!report.report.contains("mouth: open"));
    }

    #[test]
    fn test_serializes_to_json() {
        let report = builder().build(&[]);
        let json = serde_json::to_string(&report).expect("report should serialize");
        assert!(json.contains("\"alert_type\":\"attention_monitor\""));
    }
}
