//! Payload builder
//!
//! Transforms a completed collection run into the externally consumable
//! output record: internal probe ids become stable external field names,
//! failed units become explicit failure markers (the field set never depends
//! on which probes happened to fail), and the whole fingerprint is folded
//! into a deterministic, order-independent integrity hash.

use std::collections::BTreeMap;

use rand::RngCore;
use serde::Serialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::aggregator::CollectionRun;
use crate::unit::Outcome;

/// Marker code for a probe that threw or rejected
pub const FAILURE_CODE: i32 = -2;
/// Marker code for a probe that did not settle within its budget
pub const TIMEOUT_CODE: i32 = -3;

/// Stable external field name for a probe id.
///
/// Identity mapping when no entry exists — an unmapped id is not an error,
/// it simply appears in the payload under its own name.
pub fn external_field_name(id: &str) -> &str {
    match id {
        // Stage 1
        "s94" => "screenFrameDetection",
        "s164" => "webrtcFingerprint",
        // Stage 2
        "s106" => "virtualMachineDetection",
        "s154" => "automationToolsDetection",
        "s158" => "timezoneFingerprint",
        "s160" => "documentOriginAnalysis",
        "s97" => "paymentMethodsDetection",
        "s70" => "performanceTiming",
        "s152" => "displayCapabilities",
        // Stage 3 - advanced fingerprinting
        "s27" => "audioContextFingerprint",
        "s74" => "canvasFingerprint",
        "s75" => "webglFingerprint",
        // Storage and permissions
        "s24" => "storageFingerprint",
        "s44" => "serviceWorkerSupport",
        "s45" => "secureContextDetection",
        // Font and text analysis
        "s57" => "fontDetectionFingerprint",
        // Touch and sensor capabilities
        "s59" => "touchCapabilities",
        "s60" => "deviceSensors",
        "s61" => "speechAudioAPIs",
        "s62" => "geolocationCapabilities",
        // Display and hardware
        "s63" => "hardwareAcceleration",
        "s64" => "pluginAnalysis",
        "s65" => "cssFeatures",
        // Navigator and security
        "s68" => "navigatorPropertiesAnalysis",
        "s69" => "eventConstructorTrust",
        // Mathematical and precision testing
        "s72" => "mathematicalPrecision",
        // Enhanced browser detection
        "s82" => "modernBrowserFeatures",
        "s83" => "screenResolution",
        // Media feature queries
        "s101" => "invertedColorsTest",
        "s103" => "forcedColorsTest",
        "s104" => "prefersContrastTest",
        "s117" => "prefersReducedMotionTest",
        "s119" => "prefersReducedTransparencyTest",
        "s123" => "dynamicRangeTest",
        // System information
        "s131" => "userAgentString",
        "s133" => "appVersionString",
        "s136" => "connectionRTT",
        "s148" => "windowDimensions",
        "s149" => "pluginCount",
        "s150" => "errorStackTrace",
        "s157" => "productSubString",
        // Extended capabilities
        "s102" => "blockedSelectorsDetection",
        "s118" => "windowExternalString",
        "s120" => "mimeTypesIntegrity",
        "s130" => "notificationPermissions",
        "s132" => "documentElementAttributes",
        "s135" => "functionBindString",
        "s139" => "windowProcessDetection",
        "s142" => "evalFunctionAnalysis",
        "s144" => "webdriverPropertyAnalysis",
        "s145" => "notificationPermissionAnalysis",
        "s146" => "webglContextAnalysis",
        _ => id,
    }
}

/// Collection metadata carried alongside the fingerprint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMeta {
    pub execution_time_ms: u64,
    pub stages_executed: usize,
    pub total_sources: usize,
    pub stage_breakdown: BTreeMap<String, usize>,
}

/// The externally consumable result of one collection invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    pub version: String,
    pub request_id: String,
    /// Wall-clock epoch ms at build time
    pub timestamp: u64,
    pub fingerprint: BTreeMap<String, Value>,
    pub integrity_hash: String,
    pub collection: CollectionMeta,
}

/// Fresh random identifier (hex), used for request and run ids.
pub fn random_id(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Deterministic, order-independent hash of the fingerprint content.
///
/// Fields are keyed by external name in a sorted map, so two runs with the
/// same logical content hash identically regardless of probe completion
/// order. Not a cryptographic commitment — a content drift detector.
pub fn integrity_hash(fingerprint: &BTreeMap<String, Value>) -> String {
    let serialized = serde_json::to_string(fingerprint).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    hex::encode(hasher.finalize())
}

fn field_value(outcome: &Outcome) -> Value {
    match outcome {
        Outcome::Success { value, .. } => value.clone(),
        Outcome::Failure {
            reason,
            duration_ms,
        } => json!({
            "error": {
                "code": FAILURE_CODE,
                "message": reason,
                "durationMs": duration_ms,
            }
        }),
        Outcome::TimedOut { duration_ms } => json!({
            "error": {
                "code": TIMEOUT_CODE,
                "message": "probe timed out",
                "durationMs": duration_ms,
            }
        }),
    }
}

/// Build the output record from a completed run.
pub fn build_record(run: &CollectionRun) -> OutputRecord {
    let mut fingerprint = BTreeMap::new();
    for (id, recorded) in &run.outcomes {
        fingerprint.insert(
            external_field_name(id).to_string(),
            field_value(&recorded.outcome),
        );
    }

    let integrity_hash = integrity_hash(&fingerprint);

    OutputRecord {
        version: env!("CARGO_PKG_VERSION").to_string(),
        request_id: random_id(16),
        timestamp: crate::runtime::wallclock_ms(),
        fingerprint,
        integrity_hash,
        collection: CollectionMeta {
            execution_time_ms: run.execution_time_ms,
            stages_executed: run.tiers_executed.len(),
            total_sources: run.outcomes.len(),
            stage_breakdown: run.tier_breakdown(),
        },
    }
}
