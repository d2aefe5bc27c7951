//! End-to-end collection over the default probe registry
//!
//! Run with: wasm-pack test --headless --chrome
//! (or --firefox, --safari)

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use fingerprint_wasm::{collect, default_registry, CollectConfig};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
async fn default_registry_produces_complete_record() {
    let registry = default_registry().unwrap();
    let record = collect(&registry, &CollectConfig::default()).await.unwrap();

    // Stable schema: one field per registered probe, no omissions
    assert_eq!(record.fingerprint.len(), registry.total_probes());
    assert_eq!(record.collection.total_sources, registry.total_probes());
    assert_eq!(record.collection.stages_executed, 3);
    assert_eq!(
        record.collection.stage_breakdown["stage1"]
            + record.collection.stage_breakdown["stage2"]
            + record.collection.stage_breakdown["stage3"],
        registry.total_probes()
    );

    // Internal ids never leak into the payload for mapped probes
    assert!(record.fingerprint.contains_key("userAgentString"));
    assert!(record.fingerprint.contains_key("canvasFingerprint"));
    assert!(record.fingerprint.contains_key("timezoneFingerprint"));
    assert!(!record.fingerprint.contains_key("s131"));

    // Request metadata
    assert_eq!(record.request_id.len(), 32);
    assert!(record.timestamp > 1_577_836_800_000);
    assert_eq!(record.integrity_hash.len(), 64);
}

#[wasm_bindgen_test]
async fn stage1_signals_survive_in_a_real_browser() {
    let registry = default_registry().unwrap();
    let record = collect(&registry, &CollectConfig::default()).await.unwrap();

    // A real browser environment answers all stage-1 reads
    let user_agent = &record.fingerprint["userAgentString"];
    assert!(user_agent.as_str().map(|s| !s.is_empty()).unwrap_or(false));

    let resolution = &record.fingerprint["screenResolution"];
    assert!(resolution.is_array());

    let navigator = &record.fingerprint["navigatorPropertiesAnalysis"];
    assert!(navigator["hardwareConcurrency"].as_f64().unwrap_or(0.0) >= 1.0);
}

#[wasm_bindgen_test]
async fn fingerprint_is_stable_across_consecutive_runs() {
    let registry = default_registry().unwrap();
    let config = CollectConfig::default();

    let first = collect(&registry, &config).await.unwrap();
    let second = collect(&registry, &config).await.unwrap();

    // Field sets always match; requestId is fresh per run
    let first_keys: Vec<&String> = first.fingerprint.keys().collect();
    let second_keys: Vec<&String> = second.fingerprint.keys().collect();
    assert_eq!(first_keys, second_keys);
    assert_ne!(first.request_id, second.request_id);

    // The identity-bearing stage-1 values are deterministic between runs
    assert_eq!(
        first.fingerprint["userAgentString"],
        second.fingerprint["userAgentString"]
    );
    assert_eq!(
        first.fingerprint["screenResolution"],
        second.fingerprint["screenResolution"]
    );
    assert_eq!(
        first.fingerprint["timezoneFingerprint"],
        second.fingerprint["timezoneFingerprint"]
    );
}

#[wasm_bindgen_test]
async fn tight_timeout_still_yields_every_field() {
    let registry = default_registry().unwrap();
    let config = CollectConfig {
        per_unit_timeout_ms: 1,
        ..CollectConfig::default()
    };
    let record = collect(&registry, &config).await.unwrap();

    // Probes may succeed (sync snapshots) or time out, but the schema is
    // complete either way
    assert_eq!(record.fingerprint.len(), registry.total_probes());
}
