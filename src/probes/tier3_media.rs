//! Media, payment and permission surface probes (stage 3: exhaustive)

use js_sys::Reflect;
use serde_json::json;
use wasm_bindgen::JsValue;
use web_sys::{Notification, NotificationPermission};

use super::ProbeContext;
use crate::error::Result;
use crate::registry::ProbeReading;

pub fn payment_methods(ctx: &ProbeContext) -> Result<ProbeReading> {
    let window = ctx.window()?;
    let window_js: &JsValue = window.as_ref();
    let has = |name: &str| Reflect::has(window_js, &JsValue::from_str(name)).unwrap_or(false);

    ProbeReading::value(json!({
        "paymentRequest": has("PaymentRequest"),
        "applePay": has("ApplePaySession"),
    }))
}

pub fn notification_permission(ctx: &ProbeContext) -> Result<ProbeReading> {
    let window = ctx.window()?;
    let window_js: &JsValue = window.as_ref();
    if !Reflect::has(window_js, &JsValue::from_str("Notification")).unwrap_or(false) {
        return Ok(ProbeReading::Unavailable);
    }

    let permission = match Notification::permission() {
        NotificationPermission::Granted => "granted",
        NotificationPermission::Denied => "denied",
        _ => "default",
    };
    ProbeReading::value(json!({ "permission": permission }))
}

/// Plugin/MIME enumeration, plus a consistency check: mismatched counts are
/// a spoofing tell since real browsers keep the two views in sync.
pub fn mime_types_integrity(ctx: &ProbeContext) -> Result<ProbeReading> {
    let navigator = ctx.navigator()?;

    let mime_types = navigator.mime_types()?;
    let mut mime_names = Vec::with_capacity(mime_types.length() as usize);
    for i in 0..mime_types.length() {
        if let Some(mime) = mime_types.item(i) {
            mime_names.push(mime.type_());
        }
    }

    let plugins = navigator.plugins()?;
    let mut plugin_names = Vec::with_capacity(plugins.length() as usize);
    for i in 0..plugins.length() {
        if let Some(plugin) = plugins.item(i) {
            plugin_names.push(plugin.name());
        }
    }

    let consistent = (plugin_names.is_empty() && mime_names.is_empty())
        || (!plugin_names.is_empty() && !mime_names.is_empty());

    ProbeReading::value(json!({
        "mimeTypes": mime_names,
        "plugins": plugin_names,
        "consistent": consistent,
    }))
}
