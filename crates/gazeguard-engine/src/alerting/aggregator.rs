//! Alert buffering and flush policy.
//!
//! All buffer state sits behind one mutex shared by the frame path
//! (`record`) and the background flush timer. The frame path never
//! performs network I/O; it only appends and signals that a flush is
//! worth attempting.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::dispatcher::{DispatchError, ReportDispatcher};
use super::report::{ReportBuilder, ReportIdentity};
use crate::config::AggregatorConfig;
use crate::domain::AlertEvent;

/// Why a flush was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// The count trigger fired after a recorded event
    Count,
    /// The background timer elapsed
    Interval,
    /// The session is shutting down
    Shutdown,
}

/// Result of a flush attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// A batch of this many events was dispatched
    Flushed(usize),
    /// The count trigger was no longer satisfied on re-check; events
    /// stay buffered
    Skipped,
    /// The buffer was empty
    Empty,
}

/// Capacity-bounded alert buffer with threshold- and timer-driven flush.
///
/// The count trigger is evaluated after every `record`: once more than
/// `flush_min_events` events are buffered, the batch flushes when its
/// critical count exceeds `flush_min_critical` (or the buffer is at
/// capacity). Batches that stay below the critical trigger leave with
/// the interval timer instead, so nothing ages indefinitely.
pub struct AlertAggregator {
    config: AggregatorConfig,
    buffer: Mutex<VecDeque<AlertEvent>>,
    reports: ReportBuilder,
    dispatcher: Arc<dyn ReportDispatcher>,
}

impl AlertAggregator {
    /// Creates an aggregator dispatching through `dispatcher`.
    #[must_use]
    pub fn new(
        config: AggregatorConfig,
        identity: ReportIdentity,
        dispatcher: Arc<dyn ReportDispatcher>,
    ) -> Self {
        Self {
            config,
            buffer: Mutex::new(VecDeque::with_capacity(config.buffer_cap)),
            reports: ReportBuilder::new(identity),
            dispatcher,
        }
    }

    /// Appends an event, evicting the oldest entry past capacity.
    ///
    /// Returns `true` when the count trigger is worth evaluating; the
    /// caller decides how to schedule the flush.
    pub fn record(&self, event: AlertEvent) -> bool {
        let mut buffer = self.buffer.lock();
        while buffer.len() >= self.config.buffer_cap {
            buffer.pop_front();
        }
        buffer.push_back(event);
        buffer.len() > self.config.flush_min_events
    }

    /// Number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Returns `true` if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    /// Number of buffered critical (warning or danger) events.
    #[must_use]
    pub fn critical_count(&self) -> usize {
        self.buffer.lock().iter().filter(|e| e.is_critical()).count()
    }

    /// Attempts one flush.
    ///
    /// The count-trigger path re-checks eligibility under the lock and
    /// degenerates to a no-op when the buffer shrank below the minimum;
    /// timer and shutdown paths flush any non-empty buffer. On dispatch
    /// failure the whole batch is pushed back at the front of the
    /// buffer, oldest first.
    ///
    /// # Errors
    ///
    /// Returns the dispatch error after requeueing; callers log and
    /// move on, the frame path never sees it.
    pub async fn flush(&self, trigger: FlushTrigger) -> Result<FlushOutcome, DispatchError> {
        let batch: Vec<AlertEvent> = {
            let mut buffer = self.buffer.lock();
            match trigger {
                FlushTrigger::Count => {
                    let total = buffer.len();
                    if total < self.config.flush_min_events {
                        debug!(total, "count flush re-check below minimum, keeping buffer");
                        return Ok(FlushOutcome::Skipped);
                    }
                    let critical = buffer.iter().filter(|e| e.is_critical()).count();
                    let at_capacity = total >= self.config.buffer_cap;
                    if critical <= self.config.flush_min_critical && !at_capacity {
                        debug!(total, critical, "count flush below critical trigger");
                        return Ok(FlushOutcome::Skipped);
                    }
                }
                FlushTrigger::Interval | FlushTrigger::Shutdown => {
                    if buffer.is_empty() {
                        return Ok(FlushOutcome::Empty);
                    }
                }
            }
            buffer.drain(..).collect()
        };

        let report = self.reports.build(&batch);
        match self.dispatcher.dispatch(&report).await {
            Ok(()) => {
                info!(
                    dispatcher = self.dispatcher.name(),
                    count = batch.len(),
                    trigger = ?trigger,
                    "alert batch flushed"
                );
                Ok(FlushOutcome::Flushed(batch.len()))
            }
            Err(error) => {
                warn!(
                    dispatcher = self.dispatcher.name(),
                    count = batch.len(),
                    %error,
                    "dispatch failed, requeueing batch"
                );
                let mut buffer = self.buffer.lock();
                for event in batch.into_iter().rev() {
                    buffer.push_front(event);
                }
                while buffer.len() > self.config.buffer_cap {
                    buffer.pop_front();
                }
                Err(error)
            }
        }
    }

    /// Schedules a count-triggered flush off the frame path.
    ///
    /// With no runtime available the flush is left to the interval
    /// timer; the frame path never blocks on the network either way.
    pub fn request_flush(self: &Arc<Self>) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let aggregator = Arc::clone(self);
                handle.spawn(async move {
                    let _ = aggregator.flush(FlushTrigger::Count).await;
                });
            }
            Err(_) => debug!("no runtime for count flush, deferring to interval timer"),
        }
    }

    /// Spawns the background interval flush task.
    ///
    /// The task flushes every `flush_interval_ms`, performs one final
    /// shutdown flush when `shutdown` flips to `true`, and then exits.
    pub fn spawn_flush_timer(
        self: &Arc<Self>,
        mut shutdown: watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let aggregator = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(aggregator.config.flush_interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let _ = aggregator.flush(FlushTrigger::Interval).await;
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            let _ = aggregator.flush(FlushTrigger::Shutdown).await;
                            break;
                        }
                    }
                }
            }
        })
    }
}
