//! Dispatch boundary.
//!
//! A [`ReportDispatcher`] delivers one [`AggregatedReport`] per flush to
//! whatever sink the deployment wires in. Failures are reported back to
//! the aggregator, which requeues the batch; nothing here retries.

use async_trait::async_trait;
use tracing::info;

use super::report::AggregatedReport;

/// Errors from report dispatch.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Transport-level failure
    #[error("Dispatch transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The collector answered with a non-success status
    #[error("Dispatch rejected with status {status}")]
    Rejected {
        /// HTTP status code returned by the collector
        status: u16,
    },

    /// Sink-specific failure
    #[error("Dispatch failed: {message}")]
    Failed {
        /// Description of the failure
        message: String,
    },
}

impl DispatchError {
    /// Creates a sink-specific failure.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Sink for aggregated reports.
#[async_trait]
pub trait ReportDispatcher: Send + Sync {
    /// Dispatcher name for logging.
    fn name(&self) -> &str;

    /// Delivers one report.
    async fn dispatch(&self, report: &AggregatedReport) -> Result<(), DispatchError>;
}

/// Dispatcher that POSTs reports as JSON to a collector endpoint.
pub struct HttpDispatcher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDispatcher {
    /// Creates a dispatcher targeting `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ReportDispatcher for HttpDispatcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn dispatch(&self, report: &AggregatedReport) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(report)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
            });
        }

        info!(
            session_id = %report.session_id,
            event_count = report.event_count,
            "report dispatched"
        );
        Ok(())
    }
}

/// Dispatcher that logs reports instead of sending them.
///
/// Useful for local runs and as a wiring default before a collector
/// endpoint is configured.
#[derive(Debug, Default)]
pub struct LogDispatcher;

impl LogDispatcher {
    /// Creates a log dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReportDispatcher for LogDispatcher {
    fn name(&self) -> &str {
        "log"
    }

    async fn dispatch(&self, report: &AggregatedReport) -> Result<(), DispatchError> {
        info!(
            session_id = %report.session_id,
            event_count = report.event_count,
            critical_count = report.critical_count,
            "attention report:\n{}",
            report.report
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerting::report::{ReportBuilder, ReportIdentity};
    use gazeguard_core::SessionId;

    fn report() -> AggregatedReport {
        ReportBuilder::new(ReportIdentity {
            device_id: "dev".to_string(),
            subject_id: "subj".to_string(),
            session_id: SessionId::new(),
        })
        .build(&[])
    }

    #[tokio::test]
    async fn test_log_dispatcher_always_succeeds() {
        let dispatcher = LogDispatcher::new();
        assert_eq!(dispatcher.name(), "log");
        assert!(dispatcher.dispatch(&report()).await.is_ok());
    }

    #[tokio::test]
    async fn test_http_dispatcher_unreachable_endpoint_fails() {
        let dispatcher = HttpDispatcher::new("http://127.0.0.1:1/alerts");
        let result = dispatcher.dispatch(&report()).await;
        assert!(matches!(result, Err(DispatchError::Transport(_))));
    }

    #[test]
    fn test_dispatch_error_display() {
        let err = DispatchError::Rejected { status: 503 };
        assert!(err.to_string().contains("503"));
    }
}
