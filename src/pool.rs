//! Execution pool: bounded-concurrency scheduler
//!
//! Runs a queue of execution units with at most `max_concurrency` in flight,
//! draining the queue to completion without halting on individual failures.
//! One pool instance drives exactly one drain cycle.

use std::cell::Cell;
use std::rc::Rc;

use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::monitor::run_unit;
use crate::probes::ProbeContext;
use crate::unit::{ExecutionUnit, Outcome};

/// Run-level cancellation handle.
///
/// Cancelling stops pending units from starting; already-active units
/// continue to their own timeout (probes cannot be forcibly interrupted).
#[derive(Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Lifecycle notification for one execution unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgressEvent {
    Started,
    Success,
    Failure,
    TimedOut,
}

/// Payload handed to the caller's progress callback.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub id: String,
    pub tier: String,
    pub event: ProgressEvent,
    pub progress_fraction: f64,
}

pub type ProgressFn = Rc<dyn Fn(&ProgressUpdate)>;

/// Shared across tiers so the fraction covers the whole run.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: ProgressFn,
    completed: Rc<Cell<usize>>,
    total: usize,
}

impl ProgressReporter {
    pub fn new(callback: ProgressFn, total: usize) -> Self {
        Self {
            callback,
            completed: Rc::new(Cell::new(0)),
            total,
        }
    }

    fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed.get() as f64 / self.total as f64
        }
    }

    fn started(&self, unit: &ExecutionUnit) {
        (self.callback)(&ProgressUpdate {
            id: unit.id.clone(),
            tier: unit.tier.clone(),
            event: ProgressEvent::Started,
            progress_fraction: self.fraction(),
        });
    }

    fn terminal(&self, unit: &ExecutionUnit, outcome: &Outcome) {
        self.completed.set(self.completed.get() + 1);
        let event = match outcome {
            Outcome::Success { .. } => ProgressEvent::Success,
            Outcome::Failure { .. } => ProgressEvent::Failure,
            Outcome::TimedOut { .. } => ProgressEvent::TimedOut,
        };
        (self.callback)(&ProgressUpdate {
            id: unit.id.clone(),
            tier: unit.tier.clone(),
            event,
            progress_fraction: self.fraction(),
        });
    }
}

/// Terminal result of one unit, labeled for aggregation.
#[derive(Debug, Clone)]
pub struct UnitResult {
    pub id: String,
    pub tier: String,
    pub outcome: Outcome,
}

/// Bounded-concurrency scheduler for one drain cycle.
#[derive(Debug)]
pub struct ExecutionPool {
    max_concurrency: usize,
}

impl ExecutionPool {
    /// Fails with `InvalidConfig` before any execution if the cap is zero.
    pub fn new(max_concurrency: usize) -> Result<Self> {
        if max_concurrency < 1 {
            return Err(Error::InvalidConfig(format!(
                "maxConcurrency must be >= 1, got {}",
                max_concurrency
            )));
        }
        Ok(Self { max_concurrency })
    }

    /// Drain the given units, yielding one terminal result per unit.
    ///
    /// The stream is finite and the pool is consumed: at most
    /// `max_concurrency` unit futures are polled at any instant, a settled
    /// unit frees its slot for the next pending one, and per-unit errors are
    /// recorded rather than propagated. A unit first polled after
    /// cancellation resolves immediately without invoking its probe.
    pub fn run(
        self,
        units: Vec<ExecutionUnit>,
        ctx: Rc<ProbeContext>,
        skip_unavailable: bool,
        cancel: CancelToken,
        progress: Option<ProgressReporter>,
    ) -> impl Stream<Item = UnitResult> {
        let max_concurrency = self.max_concurrency;
        stream::iter(units.into_iter().map(move |unit| {
            let ctx = ctx.clone();
            let cancel = cancel.clone();
            let progress = progress.clone();
            async move {
                if cancel.is_cancelled() {
                    let outcome = Outcome::Failure {
                        reason: "collection cancelled".to_string(),
                        duration_ms: 0,
                    };
                    if let Some(reporter) = &progress {
                        reporter.terminal(&unit, &outcome);
                    }
                    return UnitResult {
                        id: unit.id,
                        tier: unit.tier,
                        outcome,
                    };
                }

                if let Some(reporter) = &progress {
                    reporter.started(&unit);
                }
                let outcome = run_unit(&unit, ctx, skip_unavailable).await;
                if let Some(reporter) = &progress {
                    reporter.terminal(&unit, &outcome);
                }
                UnitResult {
                    id: unit.id,
                    tier: unit.tier,
                    outcome,
                }
            }
        }))
        .buffer_unordered(max_concurrency)
    }
}
