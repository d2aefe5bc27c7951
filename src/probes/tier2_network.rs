//! Network capability probes (stage 2: moderate cost)
//!
//! Existence checks only — no peer connection is opened and no request is
//! sent; actual transport belongs to the hosting code.

use js_sys::Reflect;
use serde_json::json;
use wasm_bindgen::JsValue;

use super::{js_to_json, ProbeContext};
use crate::error::Result;
use crate::registry::ProbeReading;

/// Connection quality hints from the Network Information API.
pub fn connection_info(ctx: &ProbeContext) -> Result<ProbeReading> {
    let navigator = ctx.navigator()?;
    let connection = Reflect::get(navigator.as_ref(), &JsValue::from_str("connection"))?;
    if connection.is_undefined() || connection.is_null() {
        return Ok(ProbeReading::Unavailable);
    }

    let get = |key: &str| -> serde_json::Value {
        Reflect::get(&connection, &JsValue::from_str(key))
            .map(|v| js_to_json(&v))
            .unwrap_or(serde_json::Value::Null)
    };

    ProbeReading::value(json!({
        "effectiveType": get("effectiveType"),
        "downlink": get("downlink"),
        "rtt": get("rtt"),
        "saveData": get("saveData"),
    }))
}

pub fn webrtc_surface(ctx: &ProbeContext) -> Result<ProbeReading> {
    let window = ctx.window()?;
    let navigator = ctx.navigator()?;
    let window_js: &JsValue = window.as_ref();
    let has = |name: &str| Reflect::has(window_js, &JsValue::from_str(name)).unwrap_or(false);
    let media_devices =
        Reflect::has(navigator.as_ref(), &JsValue::from_str("mediaDevices")).unwrap_or(false);

    ProbeReading::value(json!({
        "peerConnection": has("RTCPeerConnection") || has("webkitRTCPeerConnection"),
        "dataChannel": has("RTCDataChannel"),
        "sessionDescription": has("RTCSessionDescription"),
        "mediaDevices": media_devices,
    }))
}
