//! # GazeGuard Engine
//!
//! Attention monitoring and alert aggregation for landmark-based frame
//! streams.
//!
//! The engine consumes [`FrameSample`](gazeguard_core::FrameSample)
//! values produced by an upstream capture pipeline and turns them into
//! attention signals: head pose deviation from a per-session calibrated
//! baseline, gaze direction with dwell tracking, mouth state, and face
//! presence. Deviations pass through a per-channel threshold engine
//! (cooldowns and escalation) into a capacity-bounded aggregator that
//! batches alerts into human-readable reports and dispatches them in the
//! background.
//!
//! ## Architecture
//!
//! ```text
//! FrameSample
//!     |
//!     v
//! MonitorSession ── Calibrator ──> CalibrationBaseline
//!     |
//!     +── PoseClassifier ──┐
//!     +── GazeClassifier ──┼──> AlertThresholdEngine ──> AlertAggregator
//!     +── MouthClassifier ─┤         (cooldowns,             (buffer,
//!     +── PresenceDetector ┘          escalation)             flush)
//!     |                                                         |
//!     +── AttentionScoreModel                                   v
//!     +── MonitorObserver events                        ReportDispatcher
//! ```
//!
//! Frame processing is synchronous and CPU-only; the single background
//! task is the aggregator's flush timer, cancelled deterministically
//! when the session stops.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gazeguard_core::FrameSample;
//! use gazeguard_engine::alerting::LogDispatcher;
//! use gazeguard_engine::config::MonitorConfig;
//! use gazeguard_engine::session::MonitorSession;
//!
//! # #[tokio::main]
//! # async fn main() -> gazeguard_engine::Result<()> {
//! let config = MonitorConfig::builder()
//!     .device_id("cam-7")
//!     .subject_id("subject-12")
//!     .build();
//!
//! let mut session = MonitorSession::new(config, Arc::new(LogDispatcher::new()));
//! session.start();
//!
//! let outcome = session.process_frame(&FrameSample::empty())?;
//! println!("score: {:.0}", outcome.attention_score);
//!
//! session.stop().await;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod alerting;
pub mod calibrate;
pub mod classify;
pub mod config;
pub mod domain;
pub mod score;
pub mod session;
pub mod signal;

use crate::alerting::DispatchError;
use gazeguard_core::CoreError;

/// Engine version, from the crate manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Top-level engine error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    /// Error from the core types layer
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Error dispatching an aggregated report
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Invalid engine configuration
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the problem
        message: String,
    },

    /// Session used in a state that does not support the operation
    #[error("Session error: {message}")]
    Session {
        /// Description of the problem
        message: String,
    },
}

impl EngineError {
    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a session error.
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

pub use crate::alerting::{
    AggregatedReport, AlertAggregator, AlertThresholdEngine, HttpDispatcher, LogDispatcher,
    ReportDispatcher,
};
pub use crate::calibrate::{CalibrationBaseline, Calibrator};
pub use crate::config::{DetectionMode, MonitorConfig};
pub use crate::domain::{
    AlertContext, AlertEvent, ChannelId, GazeDirection, MonitorEvent, MonitorObserver,
    PoseDirection, Severity,
};
pub use crate::session::{FrameOutcome, MonitorSession, SessionState};

/// Commonly used types.
pub mod prelude {
    pub use crate::alerting::{LogDispatcher, ReportDispatcher};
    pub use crate::config::{DetectionMode, MonitorConfig};
    pub use crate::domain::{
        AlertEvent, ChannelId, GazeDirection, MonitorEvent, MonitorObserver, Severity,
    };
    pub use crate::session::{FrameOutcome, MonitorSession, SessionState};
    pub use crate::{EngineError, Result};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_matches_manifest() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_error_conversions() {
        let core = CoreError::validation("bad input");
        let engine: EngineError = core.into();
        assert!(matches!(engine, EngineError::Core(_)));

        let err = EngineError::configuration("missing device id");
        assert!(err.to_string().contains("missing device id"));
    }
}
