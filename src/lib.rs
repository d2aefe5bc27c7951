//! # Fingerprint WASM Collector
//!
//! A browser-fingerprinting collection engine compiled to WebAssembly.
//!
//! The engine drives a registry of independent, possibly-slow,
//! possibly-failing probes through a bounded-concurrency pool with per-unit
//! timeouts, then folds the outcomes into a stable payload with a
//! deterministic integrity hash — all client-side, no server round-trip.
//!
//! ## Architecture
//!
//! ```text
//! FingerprintCollector (WASM)
//!   ↓
//! Probe Registry (stage1 → stage2 → stage3)
//!   ↓
//! Execution Pool (bounded concurrency, per-unit timeout monitor)
//!   ↓
//! Result Aggregator → Payload Builder
//!   ↓
//! Output Record (fingerprint + integrity hash)
//! ```
//!
//! ## Guarantees
//!
//! - **One outcome per unit**: every submitted probe yields exactly one of
//!   success / failure / timed-out, even if it never settles
//! - **Partial-failure tolerance**: a record is always produced once
//!   pre-flight validation passes; failed probes become explicit markers
//! - **Deterministic hash**: identical fingerprint content hashes
//!   identically regardless of probe completion order

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

// Modules
pub mod aggregator;
pub mod collector;
pub mod config;
mod error;
pub mod monitor;
pub mod payload;
pub mod pool;
pub mod probes;
pub mod registry;
pub mod runtime;
pub mod unit;

pub use aggregator::{CollectionRun, RecordedOutcome};
pub use collector::{collect, collect_with};
pub use config::CollectConfig;
pub use error::{Error, ErrorCode, Result};
pub use payload::{build_record, external_field_name, integrity_hash, CollectionMeta, OutputRecord};
pub use pool::{
    CancelToken, ExecutionPool, ProgressEvent, ProgressFn, ProgressReporter, ProgressUpdate,
    UnitResult,
};
pub use probes::{default_registry, ProbeContext};
pub use registry::{async_probe, sync_probe, ProbeFn, ProbeReading, ProbeRegistry, Tier};
pub use unit::{ExecutionUnit, Outcome};

/// Initialize the collector module
///
/// Sets up logging; called automatically when the WASM module loads.
#[wasm_bindgen(start)]
pub fn init() {
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("fingerprint collector initialized");
}

/// Main collector handle exposed to JavaScript.
///
/// Wraps the built-in probe registry; each `collect` call is an isolated
/// run over it. The registry itself is read-only and shared across runs.
#[wasm_bindgen]
pub struct FingerprintCollector {
    registry: Rc<ProbeRegistry>,
    current_run: RefCell<Option<CancelToken>>,
}

#[wasm_bindgen]
impl FingerprintCollector {
    /// Create a collector over the default probe registry.
    #[wasm_bindgen(constructor)]
    pub fn new() -> std::result::Result<FingerprintCollector, JsValue> {
        let registry = probes::default_registry()?;
        log::info!(
            "collector ready: {} probes in {} stages",
            registry.total_probes(),
            registry.tiers().len()
        );
        Ok(Self {
            registry: Rc::new(registry),
            current_run: RefCell::new(None),
        })
    }

    /// Run a collection and return the output record.
    ///
    /// `options` is an object with any of `maxConcurrency`,
    /// `perUnitTimeoutMs`, `retryAttempts`, `retryDelayMs`,
    /// `skipUnavailableProbes`; missing fields use defaults. The optional
    /// `progress` function receives `{id, tier, event, progressFraction}`
    /// on every unit start and settlement.
    #[wasm_bindgen]
    pub async fn collect(
        &self,
        options: JsValue,
        progress: Option<js_sys::Function>,
    ) -> std::result::Result<JsValue, JsValue> {
        let config: CollectConfig = if options.is_undefined() || options.is_null() {
            CollectConfig::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|e| JsValue::from_str(&format!("invalid options: {}", e)))?
        };

        let progress_fn: Option<ProgressFn> = progress.map(|callback| {
            Rc::new(move |update: &ProgressUpdate| {
                if let Ok(payload) = serde_wasm_bindgen::to_value(update) {
                    let _ = callback.call1(&JsValue::NULL, &payload);
                }
            }) as ProgressFn
        });

        let cancel = CancelToken::new();
        *self.current_run.borrow_mut() = Some(cancel.clone());

        let result = collector::collect_with(&self.registry, &config, progress_fn, cancel).await;

        *self.current_run.borrow_mut() = None;

        let record = result?;
        serde_wasm_bindgen::to_value(&record)
            .map_err(|e| JsValue::from_str(&format!("serialization failed: {}", e)))
    }

    /// Abort the in-flight run, if any.
    ///
    /// Pending probes stop being started; active ones run to their own
    /// timeout. The aborted run still resolves with a complete record in
    /// which unstarted fields carry failure markers.
    #[wasm_bindgen]
    pub fn abort(&self) {
        if let Some(cancel) = self.current_run.borrow().as_ref() {
            log::info!("collection run aborted by caller");
            cancel.cancel();
        }
    }

    /// Number of probes in the registry.
    #[wasm_bindgen]
    pub fn probe_count(&self) -> usize {
        self.registry.total_probes()
    }
}
