//! Result aggregation
//!
//! Folds the stream of per-unit results into one immutable collection run
//! record with summary counters. Duplicate ids are rejected at registration,
//! long before this point; seeing one here (or a count mismatch) means the
//! engine itself is broken and is reported as an invariant violation.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::pool::UnitResult;
use crate::unit::Outcome;

/// One recorded outcome, labeled with the tier that produced it.
#[derive(Debug, Clone)]
pub struct RecordedOutcome {
    pub tier: String,
    pub outcome: Outcome,
}

/// The complete set of outcomes for one collection invocation.
///
/// Immutable once built; the payload builder consumes it read-only.
#[derive(Debug, Clone)]
pub struct CollectionRun {
    pub run_id: String,
    /// Wall-clock epoch ms at run start
    pub started_at: u64,
    /// Tier names in execution order
    pub tiers_executed: Vec<String>,
    pub outcomes: BTreeMap<String, RecordedOutcome>,
    /// Wall-clock epoch ms at run completion
    pub completed_at: u64,
    /// Monotonic duration of the whole run
    pub execution_time_ms: u64,
    pub success_count: usize,
    pub failure_count: usize,
}

impl CollectionRun {
    /// Build the run record from the drained results.
    ///
    /// `submitted` is the number of units handed to the pool across all
    /// tiers; any divergence from the result count is an engine defect.
    pub fn aggregate(
        run_id: String,
        started_at: u64,
        completed_at: u64,
        execution_time_ms: u64,
        tiers_executed: Vec<String>,
        results: Vec<UnitResult>,
        submitted: usize,
    ) -> Result<Self> {
        if results.len() != submitted {
            return Err(Error::AggregationInvariant(format!(
                "submitted {} units but collected {} outcomes",
                submitted,
                results.len()
            )));
        }

        let mut outcomes = BTreeMap::new();
        let mut success_count = 0;
        let mut failure_count = 0;

        for result in results {
            if result.outcome.is_success() {
                success_count += 1;
            } else {
                failure_count += 1;
            }
            let previous = outcomes.insert(
                result.id.clone(),
                RecordedOutcome {
                    tier: result.tier,
                    outcome: result.outcome,
                },
            );
            if previous.is_some() {
                return Err(Error::AggregationInvariant(format!(
                    "two outcomes recorded for probe id '{}'",
                    result.id
                )));
            }
        }

        Ok(CollectionRun {
            run_id,
            started_at,
            tiers_executed,
            outcomes,
            completed_at,
            execution_time_ms,
            success_count,
            failure_count,
        })
    }

    /// Outcomes per tier; every executed tier is present, even at zero.
    pub fn tier_breakdown(&self) -> BTreeMap<String, usize> {
        let mut breakdown: BTreeMap<String, usize> = self
            .tiers_executed
            .iter()
            .map(|tier| (tier.clone(), 0))
            .collect();
        for recorded in self.outcomes.values() {
            *breakdown.entry(recorded.tier.clone()).or_insert(0) += 1;
        }
        breakdown
    }
}
