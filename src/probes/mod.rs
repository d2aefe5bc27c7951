//! Probe implementations and the default registry
//!
//! Each probe is an independent capability-or-metric query against the
//! browser environment, registered under a stable source id. Stage
//! assignment is by cost: stage 1 holds cheap synchronous reads whose
//! results must survive even if everything after them hangs, stage 2 holds
//! moderate queries, stage 3 holds the rendering and DSP probes.

use js_sys::Reflect;
use serde_json::Value;
use wasm_bindgen::JsValue;
use web_sys::Window;

pub mod context;
pub mod tier1_navigator;
pub mod tier1_screen;
pub mod tier2_automation;
pub mod tier2_css;
pub mod tier2_environment;
pub mod tier2_network;
pub mod tier2_storage;
pub mod tier3_audio;
pub mod tier3_canvas;
pub mod tier3_fonts;
pub mod tier3_media;
pub mod tier3_webgl;

pub use context::ProbeContext;

use crate::error::Result;
use crate::registry::{async_probe, sync_probe, ProbeRegistry};

/// Map a JS scalar onto JSON; anything non-scalar reads as null.
pub(crate) fn js_to_json(value: &JsValue) -> Value {
    if value.is_undefined() || value.is_null() {
        Value::Null
    } else if let Some(b) = value.as_bool() {
        Value::Bool(b)
    } else if let Some(n) = value.as_f64() {
        serde_json::Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    } else if let Some(s) = value.as_string() {
        Value::String(s)
    } else {
        Value::Null
    }
}

/// Evaluate a media query; None when the query cannot be constructed.
pub(crate) fn media_matches(window: &Window, query: &str) -> Option<bool> {
    window
        .match_media(query)
        .ok()
        .flatten()
        .map(|list| list.matches())
}

/// Whether a name exists on an object, swallowing proxy traps that throw.
pub(crate) fn reflect_has(target: &JsValue, key: &str) -> bool {
    Reflect::has(target, &JsValue::from_str(key)).unwrap_or(false)
}

/// The built-in probe registry.
///
/// Source ids are stable across releases; the payload builder maps them to
/// readable field names. New probes get the next free id, ids of removed
/// probes are never reused.
pub fn default_registry() -> Result<ProbeRegistry> {
    let mut registry = ProbeRegistry::new();

    // Stage 1: cheap synchronous identity reads
    registry.register("stage1", "s131", sync_probe(tier1_navigator::user_agent))?;
    registry.register("stage1", "s133", sync_probe(tier1_navigator::app_version))?;
    registry.register("stage1", "s157", sync_probe(tier1_navigator::product_sub))?;
    registry.register("stage1", "s68", sync_probe(tier1_navigator::navigator_properties))?;
    registry.register("stage1", "s59", sync_probe(tier1_navigator::touch_capabilities))?;
    registry.register("stage1", "s83", sync_probe(tier1_screen::screen_resolution))?;
    registry.register("stage1", "s148", sync_probe(tier1_screen::window_dimensions))?;
    registry.register("stage1", "s152", sync_probe(tier1_screen::display_capabilities))?;
    registry.register("stage1", "s94", sync_probe(tier1_screen::screen_frame))?;

    // Stage 2: moderate-cost environment queries
    registry.register("stage2", "s158", sync_probe(tier2_environment::timezone))?;
    registry.register("stage2", "s72", sync_probe(tier2_environment::math_precision))?;
    registry.register("stage2", "s150", sync_probe(tier2_environment::error_stack))?;
    registry.register("stage2", "s135", sync_probe(tier2_environment::function_bind))?;
    registry.register("stage2", "s65", sync_probe(tier2_css::css_features))?;
    registry.register("stage2", "s101", sync_probe(tier2_css::inverted_colors))?;
    registry.register("stage2", "s103", sync_probe(tier2_css::forced_colors))?;
    registry.register("stage2", "s104", sync_probe(tier2_css::prefers_contrast))?;
    registry.register("stage2", "s117", sync_probe(tier2_css::prefers_reduced_motion))?;
    registry.register("stage2", "s123", sync_probe(tier2_css::dynamic_range))?;
    registry.register("stage2", "s24", sync_probe(tier2_storage::storage_fingerprint))?;
    registry.register("stage2", "s44", sync_probe(tier2_storage::service_worker_support))?;
    registry.register("stage2", "s45", sync_probe(tier2_storage::secure_context))?;
    registry.register("stage2", "s144", sync_probe(tier2_automation::webdriver_property))?;
    registry.register("stage2", "s142", sync_probe(tier2_automation::eval_function))?;
    registry.register("stage2", "s154", sync_probe(tier2_automation::automation_artifacts))?;
    registry.register("stage2", "s139", sync_probe(tier2_automation::window_process))?;
    registry.register("stage2", "s136", sync_probe(tier2_network::connection_info))?;
    registry.register("stage2", "s164", sync_probe(tier2_network::webrtc_surface))?;

    // Stage 3: rendering and DSP probes
    registry.register("stage3", "s74", sync_probe(tier3_canvas::canvas_fingerprint))?;
    registry.register("stage3", "s75", sync_probe(tier3_webgl::webgl_fingerprint))?;
    registry.register("stage3", "s63", sync_probe(tier3_webgl::hardware_acceleration))?;
    registry.register("stage3", "s27", async_probe(tier3_audio::audio_fingerprint))?;
    registry.register("stage3", "s61", sync_probe(tier3_audio::speech_voices))?;
    registry.register("stage3", "s57", sync_probe(tier3_fonts::font_detection))?;
    registry.register("stage3", "s97", sync_probe(tier3_media::payment_methods))?;
    registry.register("stage3", "s130", sync_probe(tier3_media::notification_permission))?;
    registry.register("stage3", "s120", sync_probe(tier3_media::mime_types_integrity))?;

    Ok(registry)
}
