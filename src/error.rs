//! Error types for the fingerprint collection engine
//!
//! This module provides the engine's error taxonomy with:
//! - Pre-flight errors that abort a collection run before any probe executes
//! - Per-probe errors that are contained and recorded as Outcome data
//! - Error codes for programmatic handling
//! - Fatal vs contained classification

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen::JsValue;

pub type Result<T> = std::result::Result<T, Error>;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Registry errors (1xx) - pre-flight, fatal
    DuplicateId = 100,

    // Configuration errors (2xx) - pre-flight, fatal
    InvalidConfig = 200,

    // Probe errors (3xx) - contained, recorded as Outcome data
    ProbeFailure = 300,
    ProbeTimeout = 301,

    // Aggregation errors (4xx) - internal defect, fatal
    AggregationInvariant = 400,

    // Environment errors (5xx)
    Environment = 500,
}

/// Main error type for the fingerprint collection engine
#[derive(Error, Debug, Clone)]
pub enum Error {
    // ===== Registry Errors =====
    #[error("duplicate probe id '{id}' (already registered in tier '{tier}')")]
    DuplicateId { id: String, tier: String },

    // ===== Configuration Errors =====
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ===== Probe Errors =====
    #[error("probe failed: {0}")]
    Probe(String),

    #[error("probe timed out after {0}ms")]
    ProbeTimeout(u64),

    // ===== Aggregation Errors =====
    #[error("aggregation invariant violated: {0}")]
    AggregationInvariant(String),

    // ===== Environment Errors =====
    #[error("environment error: {0}")]
    Environment(String),
}

impl Error {
    /// Get the error code for programmatic handling
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::DuplicateId { .. } => ErrorCode::DuplicateId,
            Error::InvalidConfig(_) => ErrorCode::InvalidConfig,
            Error::Probe(_) => ErrorCode::ProbeFailure,
            Error::ProbeTimeout(_) => ErrorCode::ProbeTimeout,
            Error::AggregationInvariant(_) => ErrorCode::AggregationInvariant,
            Error::Environment(_) => ErrorCode::Environment,
        }
    }

    /// Whether this error aborts the whole collection run
    ///
    /// Fatal errors are raised before any probe executes (registry or
    /// configuration defects) or indicate an internal engine defect.
    /// They propagate to the caller of `collect`.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::DuplicateId { .. }
                | Error::InvalidConfig(_)
                | Error::AggregationInvariant(_)
        )
    }

    /// Whether this error is contained to a single execution unit
    ///
    /// Contained errors are converted to per-unit Outcome data and never
    /// escape the execution pool.
    pub fn is_contained(&self) -> bool {
        matches!(self, Error::Probe(_) | Error::ProbeTimeout(_) | Error::Environment(_))
    }
}

impl From<Error> for JsValue {
    fn from(err: Error) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

impl From<JsValue> for Error {
    /// Convert a thrown JS value into a contained probe failure.
    ///
    /// Probes call browser APIs that return `Result<_, JsValue>`; this lets
    /// them use `?` and have the thrown value land in the Outcome record.
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(&value, &JsValue::from_str("message"))
                    .ok()
                    .and_then(|m| m.as_string())
            })
            .unwrap_or_else(|| "unknown JS error".to_string());
        Error::Probe(message)
    }
}
