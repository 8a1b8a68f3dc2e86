//! Per-session monitoring coordinator.
//!
//! A [`MonitorSession`] owns the classifiers, the threshold engine, the
//! score model, and the alert aggregator for one subject. Frames are
//! processed synchronously, one at a time; the only concurrent actor is
//! the background flush timer, which shares the aggregator's mutex and
//! is cancelled deterministically on stop.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gazeguard_core::{FrameSample, SessionId};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::alerting::{AlertAggregator, AlertThresholdEngine, ReportDispatcher, ReportIdentity};
use crate::calibrate::{CalibrationBaseline, Calibrator};
use crate::classify::{GazeClassifier, MouthClassifier, PoseClassifier, PresenceDetector};
use crate::config::MonitorConfig;
use crate::domain::{
    AlertContext, AlertEvent, ChannelId, GazeDirection, MonitorEvent, MonitorObserver,
};
use crate::score::AttentionScoreModel;
use crate::Result;

/// Lifecycle state of a monitoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accumulating reference frames for the baseline
    Calibrating,
    /// Baseline frozen, classification active
    Monitoring,
    /// Stopped; further frames are discarded
    Stopped,
}

/// Result of processing one frame.
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    /// Session state after the frame
    pub state: SessionState,
    /// Alerts emitted for this frame
    pub alerts: Vec<AlertEvent>,
    /// Attention score after the frame
    pub attention_score: f64,
    /// Whether the frame signalled a count-triggered flush
    pub flush_requested: bool,
}

/// Coordinator for one monitoring session.
pub struct MonitorSession {
    config: MonitorConfig,
    session_id: SessionId,
    state: SessionState,
    calibrator: Calibrator,
    baseline: Option<CalibrationBaseline>,
    pose: PoseClassifier,
    gaze: GazeClassifier,
    mouth: MouthClassifier,
    presence: PresenceDetector,
    score: AttentionScoreModel,
    thresholds: AlertThresholdEngine,
    aggregator: Arc<AlertAggregator>,
    observers: Vec<Arc<dyn MonitorObserver>>,
    last_frame_at: Option<DateTime<Utc>>,
    shutdown: watch::Sender<bool>,
    flush_task: Option<tokio::task::JoinHandle<()>>,
}

impl MonitorSession {
    /// Creates a session in the `Calibrating` state.
    #[must_use]
    pub fn new(config: MonitorConfig, dispatcher: Arc<dyn ReportDispatcher>) -> Self {
        let session_id = SessionId::new();
        let aggregator = Arc::new(AlertAggregator::new(
            config.aggregator,
            ReportIdentity {
                device_id: config.device_id.clone(),
                subject_id: config.subject_id.clone(),
                session_id,
            },
            dispatcher,
        ));
        let (shutdown, _) = watch::channel(false);

        Self {
            session_id,
            state: SessionState::Calibrating,
            calibrator: Calibrator::new(config.reference_frames),
            baseline: None,
            pose: PoseClassifier::new(config.pose, config.detection_mode, config.smoothing_frames),
            gaze: GazeClassifier::new(config.gaze),
            mouth: MouthClassifier::new(config.mouth),
            presence: PresenceDetector::new(),
            score: AttentionScoreModel::new(config.score),
            thresholds: AlertThresholdEngine::new(config.channels.clone()),
            aggregator,
            observers: Vec::new(),
            last_frame_at: None,
            shutdown,
            flush_task: None,
            config,
        }
    }

    /// Registers an observer for session events.
    pub fn register_observer(&mut self, observer: Arc<dyn MonitorObserver>) {
        self.observers.push(observer);
    }

    /// Starts the background flush timer.
    ///
    /// Without a tokio runtime on the current thread the timer cannot
    /// run; buffered events then only leave through count-triggered
    /// flushes once a runtime is available.
    pub fn start(&mut self) {
        if self.flush_task.is_some() || self.state == SessionState::Stopped {
            return;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            warn!("no tokio runtime, background flush timer not started");
            return;
        }
        let handle = self.aggregator.spawn_flush_timer(self.shutdown.subscribe());
        self.flush_task = Some(handle);
        info!(session_id = %self.session_id, "monitoring session started");
    }

    /// Stops the session: cancels the flush timer (after one final
    /// flush), discards all further frames, and notifies observers.
    pub async fn stop(&mut self) {
        if self.state == SessionState::Stopped {
            return;
        }
        self.state = SessionState::Stopped;
        let _ = self.shutdown.send(true);
        if let Some(task) = self.flush_task.take() {
            let _ = task.await;
        }
        self.emit(&MonitorEvent::SessionStopped {
            timestamp: Utc::now(),
        });
        info!(session_id = %self.session_id, "monitoring session stopped");
    }

    /// Processes one frame synchronously.
    ///
    /// All classification, threshold gating, and score integration
    /// happens inline; no network I/O occurs on this path. Frames
    /// arriving after `stop` are discarded.
    ///
    /// # Errors
    ///
    /// Frame processing degrades instead of failing; errors are
    /// reserved for future session-level misuses and are not produced
    /// by any current path.
    pub fn process_frame(&mut self, sample: &FrameSample) -> Result<FrameOutcome> {
        if self.state == SessionState::Stopped {
            debug!(session_id = %self.session_id, "frame discarded after stop");
            return Ok(FrameOutcome {
                state: self.state,
                alerts: Vec::new(),
                attention_score: self.score.score(),
                flush_requested: false,
            });
        }

        let now = sample.timestamp;
        let elapsed_secs = self
            .last_frame_at
            .map(|last| (now.signed_duration_since(last).num_milliseconds().max(0) as f64) / 1000.0)
            .unwrap_or(0.0);
        self.last_frame_at = Some(now);

        let presence = self.presence.classify(sample);
        let mut alerts = Vec::new();
        let mut is_deviant = false;

        if presence.is_absent() {
            if let Some(alert) = self.thresholds.evaluate(
                ChannelId::NoFace,
                "Subject left the frame",
                AlertContext::new().with_attention_score(self.score.score()),
                now,
            ) {
                alerts.push(alert);
            }
        } else {
            if presence.is_multiple() {
                if let Some(alert) = self.thresholds.evaluate(
                    ChannelId::MultiFace,
                    format!("{} faces in frame", presence.face_count),
                    AlertContext::new().with_attention_score(self.score.score()),
                    now,
                ) {
                    alerts.push(alert);
                }
                is_deviant = true;
            }

            match self.state {
                SessionState::Calibrating => {
                    let angles = self.pose.raw_angles(sample);
                    if let Some(baseline) = self.calibrator.observe(angles) {
                        self.baseline = Some(baseline);
                        self.state = SessionState::Monitoring;
                        info!(
                            session_id = %self.session_id,
                            pitch = baseline.angles().pitch,
                            yaw = baseline.angles().yaw,
                            "calibration complete"
                        );
                        self.emit(&MonitorEvent::CalibrationCompleted {
                            baseline: baseline.angles(),
                            timestamp: now,
                        });
                    }
                }
                SessionState::Monitoring => {
                    self.classify_face(sample, now, &mut alerts, &mut is_deviant);
                }
                // Stopped sessions already returned above
                SessionState::Stopped => {}
            }
        }

        let attention_score =
            self.score
                .update(!presence.is_absent(), is_deviant, elapsed_secs);
        self.emit(&MonitorEvent::ScoreUpdated {
            score: attention_score,
            timestamp: now,
        });

        let mut flush_requested = false;
        for alert in &alerts {
            self.emit(&MonitorEvent::Alert(alert.clone()));
            if self.aggregator.record(alert.clone()) {
                flush_requested = true;
            }
        }
        if flush_requested {
            self.aggregator.request_flush();
        }

        Ok(FrameOutcome {
            state: self.state,
            alerts,
            attention_score,
            flush_requested,
        })
    }

    /// Pose, gaze, and mouth classification for a monitored frame.
    fn classify_face(
        &mut self,
        sample: &FrameSample,
        now: DateTime<Utc>,
        alerts: &mut Vec<AlertEvent>,
        is_deviant: &mut bool,
    ) {
        let Some(baseline) = self.baseline else {
            return;
        };
        let score = self.score.score();

        if let Some(reading) = self.pose.classify(sample, &baseline) {
            *is_deviant |= reading.is_deviant();
            for channel in &reading.channels {
                let mut context = AlertContext::new().with_attention_score(score);
                if let Some(deviation) = reading.deviation {
                    context = context.with_pose_deviation(deviation);
                }
                if let Some(alert) =
                    self.thresholds
                        .evaluate(*channel, channel.label(), context, now)
                {
                    alerts.push(alert);
                }
            }
        }

        let Some(face) = sample.primary_face() else {
            return;
        };

        let gaze = self.gaze.classify(face, now);
        if !gaze.is_centered {
            *is_deviant = true;
        }
        if self.gaze.alert_condition(&gaze) {
            let context = AlertContext::new()
                .with_gaze(gaze.direction, gaze.confidence)
                .with_focus_secs(gaze.focus_secs)
                .with_attention_score(score);
            if let Some(alert) = self.thresholds.evaluate(
                ChannelId::Gaze,
                format!("Gaze held {}", gaze.direction),
                context,
                now,
            ) {
                alerts.push(alert);
            }
        }

        if let Some(mouth) = self.mouth.classify(face) {
            if mouth.is_open {
                *is_deviant = true;
                let context = AlertContext::new()
                    .with_mouth_open(true)
                    .with_attention_score(score);
                if let Some(alert) =
                    self.thresholds
                        .evaluate(ChannelId::Mouth, "Mouth open", context, now)
                {
                    alerts.push(alert);
                }
            }
        }
    }

    fn emit(&self, event: &MonitorEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }

    /// Session identifier.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current attention score.
    #[must_use]
    pub fn attention_score(&self) -> f64 {
        self.score.score()
    }

    /// The frozen baseline, once calibration completed.
    #[must_use]
    pub fn baseline(&self) -> Option<CalibrationBaseline> {
        self.baseline
    }

    /// Longest dwell recorded for a gaze direction.
    #[must_use]
    pub fn max_focus_secs(&self, direction: GazeDirection) -> f64 {
        self.gaze.max_focus_secs(direction)
    }

    /// The session's alert aggregator.
    #[must_use]
    pub fn aggregator(&self) -> &Arc<AlertAggregator> {
        &self.aggregator
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}
