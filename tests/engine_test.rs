//! Engine WASM Integration Tests
//!
//! Timing-sensitive scheduler properties exercised on the real browser
//! event loop. Run with: wasm-pack test --headless --chrome
//! (or --firefox, --safari)

#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use serde_json::json;
use wasm_bindgen_test::*;

use fingerprint_wasm::{
    async_probe, collect, collect_with, runtime, sync_probe, CancelToken, CollectConfig, Error,
    ProbeReading, ProbeRegistry,
};

wasm_bindgen_test_configure!(run_in_browser);

fn sleepy_probe(ms: u64, value: i64) -> fingerprint_wasm::ProbeFn {
    async_probe(move |_| async move {
        runtime::sleep(ms).await;
        ProbeReading::value(json!(value))
    })
}

// ===== Outcome completeness =====

#[wasm_bindgen_test]
async fn every_unit_gets_exactly_one_outcome() {
    let mut registry = ProbeRegistry::new();
    registry.register("tier1", "fast", sleepy_probe(10, 1)).unwrap();
    registry.register("tier1", "slow", sleepy_probe(40, 2)).unwrap();
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
    let record = collect(&registry, &config).await.unwrap();

    assert_eq!(record.fingerprint.len(), 3);
    assert_eq!(record.collection.stage_breakdown["tier1"], 3);
    assert_eq!(record.fingerprint["fast"], json!(1));
    assert_eq!(record.fingerprint["slow"], json!(2));
    assert_eq!(record.fingerprint["thrower"]["error"]["code"], json!(-2));
}

// ===== Bounded concurrency on the event loop =====

#[wasm_bindgen_test]
async fn concurrency_never_exceeds_cap() {
    let active = Rc::new(Cell::new(0usize));
    let peak = Rc::new(Cell::new(0usize));

    let mut registry = ProbeRegistry::new();
    for i in 0..6 {
        let active = active.clone();
        let peak = peak.clone();
        registry
            .register(
                "tier1",
                &format!("p{}", i),
                async_probe(move |_| {
                    let active = active.clone();
                    let peak = peak.clone();
                    async move {
                        active.set(active.get() + 1);
                        peak.set(peak.get().max(active.get()));
                        runtime::sleep(15).await;
                        active.set(active.get() - 1);
                        ProbeReading::value(json!(null))
                    }
                }),
            )
            .unwrap();
    }

    let config = CollectConfig {
        max_concurrency: 2,
        ..CollectConfig::default()
    };
    collect(&registry, &config).await.unwrap();

    assert!(peak.get() <= 2, "peak concurrency was {}", peak.get());
    assert_eq!(active.get(), 0);
}

// ===== Timeout enforcement =====

#[wasm_bindgen_test]
async fn hung_probe_times_out_near_deadline() {
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
    let started = runtime::now_ms();
    let record = collect(&registry, &config).await.unwrap();
    let elapsed = runtime::now_ms() - started;

    assert_eq!(record.fingerprint["hung"]["error"]["code"], json!(-3));
    assert_eq!(record.fingerprint["hung"]["error"]["durationMs"], json!(50));
    assert!(record.collection.execution_time_ms >= 50);
    // Scheduler jitter allowance
    assert!(elapsed < 1000, "timeout took {}ms to enforce", elapsed);
}

// ===== At-most-once outcomes =====

#[wasm_bindgen_test]
async fn late_settlement_cannot_rewrite_a_timeout() {
    let settled = Rc::new(Cell::new(false));
    let settled_probe = settled.clone();

    let mut registry = ProbeRegistry::new();
    registry
        .register(
            "tier1",
            "late",
            async_probe(move |_| {
                let settled = settled_probe.clone();
                async move {
                    runtime::sleep(120).await;
                    settled.set(true);
                    ProbeReading::value(json!("too late"))
                }
            }),
        )
        .unwrap();

    let config = CollectConfig {
        per_unit_timeout_ms: 30,
        ..CollectConfig::default()
    };
    let record = collect(&registry, &config).await.unwrap();

    // Recorded as timed out, not as the late success
    assert_eq!(record.fingerprint["late"]["error"]["code"], json!(-3));

    // The abandoned probe keeps running on the event loop and settles on
    // its own without touching the already-built record
    runtime::sleep(200).await;
    assert!(settled.get(), "abandoned probe never settled");
    assert_eq!(record.fingerprint["late"]["error"]["code"], json!(-3));
}

// ===== Cancellation =====

#[wasm_bindgen_test]
async fn abort_skips_pending_units_but_keeps_schema() {
    let cancel = CancelToken::new();
    let cancel_in_probe = cancel.clone();

    let mut registry = ProbeRegistry::new();
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
    registry
        .register("tier2", "pending", sleepy_probe(5, 9))
        .unwrap();

    let record = collect_with(&registry, &CollectConfig::default(), None, cancel)
        .await
        .unwrap();

    assert_eq!(record.fingerprint.len(), 2);
    assert_eq!(record.fingerprint["canceller"], json!("ran"));
    assert!(record.fingerprint["pending"]["error"]["message"]
        .as_str()
        .unwrap()
        .contains("cancelled"));
}

// ===== Hash determinism across completion orders =====

#[wasm_bindgen_test]
async fn identical_content_hashes_identically() {
    // Same values, but the sleeps invert completion order between runs
    async fn run(first_ms: u64, second_ms: u64) -> String {
        let mut registry = ProbeRegistry::new();
        registry.register("tier1", "a", sleepy_probe(first_ms, 1)).unwrap();
        registry.register("tier1", "b", sleepy_probe(second_ms, 2)).unwrap();
        let config = CollectConfig {
            max_concurrency: 2,
            ..CollectConfig::default()
        };
        collect(&registry, &config).await.unwrap().integrity_hash
    }

    let hash_ab = run(5, 30).await;
    let hash_ba = run(30, 5).await;
    assert_eq!(hash_ab, hash_ba);
}
