//! Navigator identity probes (stage 1: fast, essential)
//!
//! Snapshot reads of navigator properties. These are the cheapest and most
//! discriminating signals, so they run in the first stage and survive even
//! if the exhaustive stages hang.

use js_sys::Reflect;
use serde_json::json;
use wasm_bindgen::JsValue;

use super::{js_to_json, ProbeContext};
use crate::error::Result;
use crate::registry::ProbeReading;

pub fn user_agent(ctx: &ProbeContext) -> Result<ProbeReading> {
    ProbeReading::value(ctx.navigator()?.user_agent()?)
}

pub fn app_version(ctx: &ProbeContext) -> Result<ProbeReading> {
    ProbeReading::value(ctx.navigator()?.app_version()?)
}

pub fn product_sub(ctx: &ProbeContext) -> Result<ProbeReading> {
    let navigator = ctx.navigator()?;
    let value = Reflect::get(navigator.as_ref(), &JsValue::from_str("productSub"))?;
    Ok(ProbeReading::Available(js_to_json(&value)))
}

/// Enhanced navigator property sweep: the identity-adjacent fields a site
/// can read without any permission prompt.
pub fn navigator_properties(ctx: &ProbeContext) -> Result<ProbeReading> {
    let navigator = ctx.navigator()?;
    let nav_js: &JsValue = navigator.as_ref();

    let languages: Vec<String> = navigator
        .languages()
        .iter()
        .filter_map(|v| v.as_string())
        .collect();

    ProbeReading::value(json!({
        "platform": navigator.platform().unwrap_or_default(),
        "vendor": js_to_json(&Reflect::get(nav_js, &JsValue::from_str("vendor"))?),
        "language": navigator.language(),
        "languages": languages,
        "hardwareConcurrency": navigator.hardware_concurrency(),
        "deviceMemory": js_to_json(&Reflect::get(nav_js, &JsValue::from_str("deviceMemory"))?),
        "cookieEnabled": Reflect::get(nav_js, &JsValue::from_str("cookieEnabled"))?
            .as_bool()
            .unwrap_or(false),
        "onLine": navigator.on_line(),
        "doNotTrack": js_to_json(&Reflect::get(nav_js, &JsValue::from_str("doNotTrack"))?),
        "pdfViewerEnabled": js_to_json(&Reflect::get(nav_js, &JsValue::from_str("pdfViewerEnabled"))?),
    }))
}

pub fn touch_capabilities(ctx: &ProbeContext) -> Result<ProbeReading> {
    let navigator = ctx.navigator()?;
    let window = ctx.window()?;
    let window_js: &JsValue = window.as_ref();

    ProbeReading::value(json!({
        "maxTouchPoints": navigator.max_touch_points(),
        "touchEvent": Reflect::has(window_js, &JsValue::from_str("TouchEvent")).unwrap_or(false),
        "touchStart": Reflect::has(window_js, &JsValue::from_str("ontouchstart")).unwrap_or(false),
    }))
}
