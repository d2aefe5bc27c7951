//! Timeout/cancellation monitor
//!
//! Bounds the wall-clock time an execution unit may occupy the pool by
//! racing the probe's settlement against the unit's deadline. The deadline
//! covers the whole unit including retries, so a retrying unit cannot hold
//! a pool slot past its budget.
//!
//! Timeouts abandon, they do not cancel: the losing probe future is handed
//! to the runtime to continue unobserved, and the `select` guarantees the
//! already-recorded outcome cannot be altered by a late settlement.

use std::rc::Rc;

use futures::future::{self, Either};
use serde_json::json;

use crate::probes::ProbeContext;
use crate::registry::ProbeReading;
use crate::runtime::{now_ms, sleep, spawn_abandoned};
use crate::unit::{ExecutionUnit, Outcome};

/// Drive one unit to its terminal outcome.
pub async fn run_unit(
    unit: &ExecutionUnit,
    ctx: Rc<ProbeContext>,
    skip_unavailable: bool,
) -> Outcome {
    let started = now_ms();
    let deadline = started + unit.timeout_ms;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let remaining = deadline.saturating_sub(now_ms());
        if remaining == 0 {
            return Outcome::TimedOut {
                duration_ms: unit.timeout_ms,
            };
        }

        let probe_future = (unit.probe)(ctx.clone());
        let timer = Box::pin(sleep(remaining));

        match future::select(probe_future, timer).await {
            Either::Left((settled, _timer)) => {
                let duration_ms = now_ms().saturating_sub(started);
                match settled {
                    Ok(ProbeReading::Available(value)) => {
                        return Outcome::Success { value, duration_ms };
                    }
                    Ok(ProbeReading::Unavailable) => {
                        // Unavailability is deterministic; retrying cannot help.
                        return if skip_unavailable {
                            Outcome::Success {
                                value: json!({ "available": false }),
                                duration_ms,
                            }
                        } else {
                            Outcome::Failure {
                                reason: "probe unavailable in this environment".to_string(),
                                duration_ms,
                            }
                        };
                    }
                    Err(err) => {
                        if attempt < unit.attempts {
                            log::debug!(
                                "probe {} attempt {}/{} failed: {}",
                                unit.id,
                                attempt,
                                unit.attempts,
                                err
                            );
                            if unit.retry_delay_ms > 0 {
                                sleep(unit.retry_delay_ms).await;
                            }
                            continue;
                        }
                        return Outcome::Failure {
                            reason: err.to_string(),
                            duration_ms,
                        };
                    }
                }
            }
            Either::Right(((), probe_future)) => {
                spawn_abandoned(async move {
                    let _ = probe_future.await;
                });
                return Outcome::TimedOut {
                    duration_ms: unit.timeout_ms,
                };
            }
        }
    }
}
