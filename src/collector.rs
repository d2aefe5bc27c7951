//! Collection orchestration
//!
//! The `collect` entry point: validates configuration, turns the registry's
//! tiers into execution units, drains them through the bounded pool one tier
//! at a time (tier N+1 is not submitted until tier N has fully drained, so
//! cheap signals survive even if later tiers hang), aggregates the outcomes
//! and builds the output record. Once pre-flight validation passes, a record
//! is always produced no matter how many probes fail.

use std::rc::Rc;

use futures::StreamExt;

use crate::aggregator::CollectionRun;
use crate::config::CollectConfig;
use crate::error::Result;
use crate::payload::{self, OutputRecord};
use crate::pool::{CancelToken, ExecutionPool, ProgressFn, ProgressReporter, UnitResult};
use crate::probes::ProbeContext;
use crate::registry::ProbeRegistry;
use crate::runtime::{now_ms, wallclock_ms};
use crate::unit::ExecutionUnit;

/// Run a full collection over the registry with the given configuration.
pub async fn collect(registry: &ProbeRegistry, config: &CollectConfig) -> Result<OutputRecord> {
    collect_with(registry, config, None, CancelToken::new()).await
}

/// Run a full collection with optional progress reporting and cancellation.
///
/// Cancellation stops pending units from starting; units already in flight
/// run to their own timeout, and every unit still receives a terminal
/// outcome so the output schema stays complete.
pub async fn collect_with(
    registry: &ProbeRegistry,
    config: &CollectConfig,
    progress: Option<ProgressFn>,
    cancel: CancelToken,
) -> Result<OutputRecord> {
    config.validate()?;

    let run_id = payload::random_id(8);
    let started_at = wallclock_ms();
    let start = now_ms();
    let total = registry.total_probes();

    log::info!(
        "starting collection run {} ({} probes, {} tiers, concurrency {})",
        run_id,
        total,
        registry.tiers().len(),
        config.max_concurrency
    );

    let reporter = progress.map(|callback| ProgressReporter::new(callback, total));
    let ctx = Rc::new(ProbeContext::new());

    let mut results: Vec<UnitResult> = Vec::with_capacity(total);
    let mut tiers_executed = Vec::with_capacity(registry.tiers().len());

    for tier in registry.tiers() {
        let units = ExecutionUnit::for_tier(tier, config);
        log::debug!("tier {}: submitting {} units", tier.name(), units.len());

        let pool = ExecutionPool::new(config.max_concurrency)?;
        let mut stream = pool.run(
            units,
            ctx.clone(),
            config.skip_unavailable_probes,
            cancel.clone(),
            reporter.clone(),
        );
        // Tier barrier: drain this tier completely before the next one
        while let Some(result) = stream.next().await {
            results.push(result);
        }
        tiers_executed.push(tier.name().to_string());
    }

    let execution_time_ms = now_ms().saturating_sub(start);
    let run = CollectionRun::aggregate(
        run_id,
        started_at,
        wallclock_ms(),
        execution_time_ms,
        tiers_executed,
        results,
        total,
    )?;

    log::info!(
        "collection run {} complete: {} ok, {} failed in {}ms",
        run.run_id,
        run.success_count,
        run.failure_count,
        run.execution_time_ms
    );

    Ok(payload::build_record(&run))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::payload::{FAILURE_CODE, TIMEOUT_CODE};
    use crate::registry::{async_probe, sync_probe, ProbeReading};
    use futures::executor::block_on;
    use serde_json::json;
    use std::cell::{Cell, RefCell};

    fn sleepy(ms: u64, value: i64) -> crate::registry::ProbeFn {
        async_probe(move |_| async move {
            crate::runtime::sleep(ms).await;
            ProbeReading::value(json!(value))
        })
    }

    #[test]
    fn test_scenario_mixed_tier() {
        // Three units: two slow successes and one instant throw, two slots
        let mut registry = ProbeRegistry::new();
        registry.register("tier1", "fast", sleepy(10, 1)).unwrap();
        registry.register("tier1", "slow", sleepy(20, 2)).unwrap();
        registry
            .register(
                "tier1",
                "thrower",
                sync_probe(|_| Err(Error::Probe("exploded".into()))),
            )
            .unwrap();

        let config = CollectConfig {
            max_concurrency: 2,
            per_unit_timeout_ms: 1000,
            ..CollectConfig::default()
        };
        let record = block_on(collect(&registry, &config)).unwrap();

        assert_eq!(record.fingerprint.len(), 3);
        assert_eq!(record.fingerprint["fast"], json!(1));
        assert_eq!(record.fingerprint["slow"], json!(2));
        assert_eq!(
            record.fingerprint["thrower"]["error"]["code"],
            json!(FAILURE_CODE)
        );
        assert_eq!(record.collection.stage_breakdown["tier1"], 3);
        assert_eq!(record.collection.total_sources, 3);
    }

    #[test]
    fn test_scenario_hung_probe() {
        // A probe that never resolves still yields a completed record
        let mut registry = ProbeRegistry::new();
        registry
            .register(
                "tier1",
                "hung",
                async_probe(|_| async {
                    futures::future::pending::<()>().await;
                    unreachable!()
                }),
            )
            .unwrap();

        let config = CollectConfig {
            per_unit_timeout_ms: 50,
            ..CollectConfig::default()
        };
        let record = block_on(collect(&registry, &config)).unwrap();

        assert_eq!(
            record.fingerprint["hung"]["error"]["code"],
            json!(TIMEOUT_CODE)
        );
        assert!(record.collection.execution_time_ms >= 50);
    }

    #[test]
    fn test_scenario_invalid_config_runs_nothing() {
        let invoked = Rc::new(Cell::new(0usize));
        let spy = invoked.clone();
        let mut registry = ProbeRegistry::new();
        registry
            .register(
                "tier1",
                "spy",
                sync_probe(move |_| {
                    spy.set(spy.get() + 1);
                    ProbeReading::value(json!(null))
                }),
            )
            .unwrap();

        let config = CollectConfig {
            max_concurrency: 0,
            ..CollectConfig::default()
        };
        let err = block_on(collect(&registry, &config)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert_eq!(invoked.get(), 0);
    }

    #[test]
    fn test_tiers_are_sequential_barriers() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ProbeRegistry::new();

        for i in 0..2 {
            let log = log.clone();
            registry
                .register(
                    "tier1",
                    &format!("first{}", i),
                    async_probe(move |_| {
                        let log = log.clone();
                        async move {
                            crate::runtime::sleep(20).await;
                            log.borrow_mut().push("tier1-done");
                            ProbeReading::value(json!(null))
                        }
                    }),
                )
                .unwrap();
        }
        let log_t2 = log.clone();
        registry
            .register(
                "tier2",
                "second",
                sync_probe(move |_| {
                    log_t2.borrow_mut().push("tier2-start");
                    ProbeReading::value(json!(null))
                }),
            )
            .unwrap();

        let config = CollectConfig {
            max_concurrency: 8,
            ..CollectConfig::default()
        };
        block_on(collect(&registry, &config)).unwrap();

        let events = log.borrow();
        assert_eq!(*events, vec!["tier1-done", "tier1-done", "tier2-start"]);
    }

    #[test]
    fn test_cancellation_skips_later_tiers() {
        let cancel = CancelToken::new();
        let invoked = Rc::new(Cell::new(0usize));

        let mut registry = ProbeRegistry::new();
        let cancel_in_probe = cancel.clone();
        registry
            .register(
                "tier1",
                "canceller",
                sync_probe(move |_| {
                    cancel_in_probe.cancel();
                    ProbeReading::value(json!("ran"))
                }),
            )
            .unwrap();
        let spy = invoked.clone();
        registry
            .register(
                "tier2",
                "never",
                sync_probe(move |_| {
                    spy.set(spy.get() + 1);
                    ProbeReading::value(json!(null))
                }),
            )
            .unwrap();

        let config = CollectConfig::default();
        let record = block_on(collect_with(&registry, &config, None, cancel)).unwrap();

        // Schema stays complete: the unstarted unit has a failure marker
        assert_eq!(record.fingerprint.len(), 2);
        assert_eq!(record.fingerprint["canceller"], json!("ran"));
        assert!(record.fingerprint["never"]["error"]["message"]
            .as_str()
            .unwrap()
            .contains("cancelled"));
        assert_eq!(invoked.get(), 0);
    }

    #[test]
    fn test_progress_reaches_completion() {
        let fractions = Rc::new(RefCell::new(Vec::new()));
        let sink = fractions.clone();

        let mut registry = ProbeRegistry::new();
        for i in 0..3 {
            registry
                .register("tier1", &format!("p{}", i), sleepy(5, i))
                .unwrap();
        }

        let config = CollectConfig::default();
        let progress: ProgressFn = Rc::new(move |update| {
            sink.borrow_mut().push(update.progress_fraction);
        });
        block_on(collect_with(
            &registry,
            &config,
            Some(progress),
            CancelToken::new(),
        ))
        .unwrap();

        let fractions = fractions.borrow();
        assert_eq!(fractions.len(), 6); // start + terminal per unit
        assert!((fractions.last().unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_registry_produces_empty_record() {
        let registry = ProbeRegistry::new();
        let record = block_on(collect(&registry, &CollectConfig::default())).unwrap();
        assert!(record.fingerprint.is_empty());
        assert_eq!(record.collection.total_sources, 0);
        assert!(!record.integrity_hash.is_empty());
    }
}
