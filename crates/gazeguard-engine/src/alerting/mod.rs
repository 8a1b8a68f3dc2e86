//! Alerting context: threshold gating, aggregation, and dispatch.

mod aggregator;
mod dispatcher;
mod report;
mod threshold;

pub use aggregator::{AlertAggregator, FlushOutcome, FlushTrigger};
pub use dispatcher::{DispatchError, HttpDispatcher, LogDispatcher, ReportDispatcher};
pub use report::{AggregatedReport, ReportBuilder, ReportIdentity};
pub use threshold::AlertThresholdEngine;
