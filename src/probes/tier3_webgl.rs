//! WebGL probes (stage 3: exhaustive)

use js_sys::{Object, Reflect};
use serde_json::json;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::WebGlRenderingContext;

use super::ProbeContext;
use crate::error::Result;
use crate::registry::ProbeReading;

// WEBGL_debug_renderer_info constants
const UNMASKED_VENDOR_WEBGL: u32 = 0x9245;
const UNMASKED_RENDERER_WEBGL: u32 = 0x9246;

/// A canvas only hands out one context kind, so the GL probes draw on their
/// own element instead of the run's shared 2D scratch canvas.
fn webgl_context(ctx: &ProbeContext) -> Result<Option<WebGlRenderingContext>> {
    let canvas: web_sys::HtmlCanvasElement = ctx
        .document()?
        .create_element("canvas")?
        .dyn_into()
        .map_err(|_| crate::error::Error::Probe("canvas element cast failed".to_string()))?;

    for kind in ["webgl", "experimental-webgl"] {
        if let Ok(Some(context)) = canvas.get_context(kind) {
            if let Ok(gl) = context.dyn_into::<WebGlRenderingContext>() {
                return Ok(Some(gl));
            }
        }
    }
    Ok(None)
}

fn parameter_string(gl: &WebGlRenderingContext, parameter: u32) -> Option<String> {
    gl.get_parameter(parameter).ok().and_then(|v| v.as_string())
}

pub fn webgl_fingerprint(ctx: &ProbeContext) -> Result<ProbeReading> {
    let gl = match webgl_context(ctx)? {
        Some(gl) => gl,
        None => return Ok(ProbeReading::Unavailable),
    };

    // The unmasked strings need the debug extension; enabling it is the
    // lookup, the constants are queried like any other parameter after.
    let debug_available = matches!(gl.get_extension("WEBGL_debug_renderer_info"), Ok(Some(_)));
    let (unmasked_vendor, unmasked_renderer) = if debug_available {
        (
            parameter_string(&gl, UNMASKED_VENDOR_WEBGL),
            parameter_string(&gl, UNMASKED_RENDERER_WEBGL),
        )
    } else {
        (None, None)
    };

    let extensions: Vec<String> = gl
        .get_supported_extensions()
        .map(|list| {
            list.iter()
                .filter_map(|v| v.as_string())
                .take(15)
                .collect()
        })
        .unwrap_or_default();

    let max_texture_size = gl
        .get_parameter(WebGlRenderingContext::MAX_TEXTURE_SIZE)
        .ok()
        .and_then(|v| v.as_f64());

    ProbeReading::value(json!({
        "vendor": parameter_string(&gl, WebGlRenderingContext::VENDOR),
        "renderer": parameter_string(&gl, WebGlRenderingContext::RENDERER),
        "unmaskedVendor": unmasked_vendor,
        "unmaskedRenderer": unmasked_renderer,
        "version": parameter_string(&gl, WebGlRenderingContext::VERSION),
        "shadingLanguageVersion": parameter_string(&gl, WebGlRenderingContext::SHADING_LANGUAGE_VERSION),
        "maxTextureSize": max_texture_size,
        "extensions": extensions,
    }))
}

/// GPU acceleration check: a context that materializes even when a major
/// performance caveat would forbid it indicates hardware rendering.
pub fn hardware_acceleration(ctx: &ProbeContext) -> Result<ProbeReading> {
    let canvas: web_sys::HtmlCanvasElement = ctx
        .document()?
        .create_element("canvas")?
        .dyn_into()
        .map_err(|_| crate::error::Error::Probe("canvas element cast failed".to_string()))?;

    let options = Object::new();
    Reflect::set(
        &options,
        &JsValue::from_str("failIfMajorPerformanceCaveat"),
        &JsValue::TRUE,
    )?;

    let strict = matches!(
        canvas.get_context_with_context_options("webgl", &options),
        Ok(Some(_))
    );
    let any = webgl_context(ctx)?.is_some();

    ProbeReading::value(json!({
        "webgl": any,
        "accelerated": strict,
    }))
}
