//! Execution units and their terminal outcomes
//!
//! An execution unit binds a probe to run-specific parameters (timeout,
//! retry budget). Units are created fresh per collection run and never
//! shared; each submitted unit yields exactly one terminal Outcome.

use serde::Serialize;
use serde_json::Value;

use crate::config::CollectConfig;
use crate::registry::{ProbeFn, Tier};

/// A probe bound with run-specific execution parameters.
#[derive(Clone)]
pub struct ExecutionUnit {
    pub id: String,
    pub tier: String,
    pub probe: ProbeFn,
    pub timeout_ms: u64,
    /// Total attempts (>= 1); failed attempts are retried, timeouts are not
    pub attempts: u32,
    pub retry_delay_ms: u64,
}

impl ExecutionUnit {
    /// Build the units for one tier from the run configuration.
    pub fn for_tier(tier: &Tier, config: &CollectConfig) -> Vec<ExecutionUnit> {
        tier.entries()
            .iter()
            .map(|(id, probe)| ExecutionUnit {
                id: id.clone(),
                tier: tier.name().to_string(),
                probe: probe.clone(),
                timeout_ms: config.per_unit_timeout_ms,
                attempts: config.retry_attempts,
                retry_delay_ms: config.retry_delay_ms,
            })
            .collect()
    }
}

/// Terminal result of one execution unit. Exactly one tag per unit per run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Outcome {
    #[serde(rename_all = "camelCase")]
    Success { value: Value, duration_ms: u64 },
    #[serde(rename_all = "camelCase")]
    Failure { reason: String, duration_ms: u64 },
    #[serde(rename_all = "camelCase")]
    TimedOut { duration_ms: u64 },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn duration_ms(&self) -> u64 {
        match self {
            Outcome::Success { duration_ms, .. }
            | Outcome::Failure { duration_ms, .. }
            | Outcome::TimedOut { duration_ms } => *duration_ms,
        }
    }
}
