//! Storage and execution context probes (stage 2: moderate cost)

use js_sys::Reflect;
use serde_json::json;
use wasm_bindgen::JsValue;
use web_sys::Storage;

use super::ProbeContext;
use crate::error::Result;
use crate::registry::ProbeReading;

const PROBE_KEY: &str = "__fp_probe__";

/// Availability check that distinguishes "API present" from "API writable".
/// Private browsing modes expose the object but throw on write.
fn storage_state(storage: std::result::Result<Option<Storage>, JsValue>) -> serde_json::Value {
    match storage {
        Ok(Some(storage)) => {
            let writable = storage.set_item(PROBE_KEY, "1").is_ok();
            if writable {
                let _ = storage.remove_item(PROBE_KEY);
            }
            json!({ "supported": true, "writable": writable })
        }
        Ok(None) => json!({ "supported": false }),
        Err(_) => json!({ "supported": false, "blocked": true }),
    }
}

pub fn storage_fingerprint(ctx: &ProbeContext) -> Result<ProbeReading> {
    let window = ctx.window()?;
    let window_js: &JsValue = window.as_ref();

    ProbeReading::value(json!({
        "localStorage": storage_state(window.local_storage()),
        "sessionStorage": storage_state(window.session_storage()),
        "indexedDB": Reflect::has(window_js, &JsValue::from_str("indexedDB")).unwrap_or(false),
        "openDatabase": Reflect::has(window_js, &JsValue::from_str("openDatabase")).unwrap_or(false),
        "cookiesEnabled": Reflect::get(ctx.navigator()?.as_ref(), &JsValue::from_str("cookieEnabled"))?
            .as_bool()
            .unwrap_or(false),
    }))
}

pub fn service_worker_support(ctx: &ProbeContext) -> Result<ProbeReading> {
    let navigator = ctx.navigator()?;
    let has_service_worker =
        Reflect::has(navigator.as_ref(), &JsValue::from_str("serviceWorker")).unwrap_or(false);
    ProbeReading::value(json!({ "supported": has_service_worker }))
}

pub fn secure_context(ctx: &ProbeContext) -> Result<ProbeReading> {
    ProbeReading::value(json!(ctx.window()?.is_secure_context()))
}
