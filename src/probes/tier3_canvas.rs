//! Canvas 2D rendering probe (stage 3: exhaustive)
//!
//! Renders a text pattern (with an emoji glyph) and a composited geometry
//! pattern, then hashes the serialized pixels. Rasterization differences in
//! fonts, antialiasing and color blending make the hashes discriminating.
//! A render that serializes differently twice in a row is reported as
//! unstable rather than fingerprinted.

use js_sys::Function;
use serde_json::json;
use sha2::{Digest, Sha256};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::ProbeContext;
use crate::error::{Error, Result};
use crate::registry::ProbeReading;

fn sha256_hex(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<Option<CanvasRenderingContext2d>> {
    let context = canvas.get_context("2d")?;
    Ok(context.and_then(|obj| obj.dyn_into::<CanvasRenderingContext2d>().ok()))
}

/// Winding-rule support check. Routed through a JS shim because the probe
/// only cares about the host's own isPointInPath dispatch.
fn winding_supported(context: &CanvasRenderingContext2d) -> bool {
    Function::new_with_args(
        "ctx",
        "ctx.rect(0, 0, 10, 10); ctx.rect(2, 2, 6, 6); \
         return !ctx.isPointInPath(5, 5, 'evenodd');",
    )
    .call1(&JsValue::NULL, context.as_ref())
    .ok()
    .and_then(|v| v.as_bool())
    .unwrap_or(false)
}

fn render_text_pattern(
    canvas: &HtmlCanvasElement,
    context: &CanvasRenderingContext2d,
) -> Result<()> {
    canvas.set_width(240);
    canvas.set_height(60);
    context.set_text_baseline("alphabetic");
    context.set_fill_style_str("#f60");
    context.fill_rect(100.0, 1.0, 62.0, 20.0);
    context.set_fill_style_str("#069");
    context.set_font("11pt \"Times New Roman\"");
    let text = "Cwm fjordbank gly \u{1F603}";
    context.fill_text(text, 2.0, 15.0)?;
    context.set_fill_style_str("rgba(102, 204, 0, 0.2)");
    context.set_font("18pt Arial");
    context.fill_text(text, 4.0, 45.0)?;
    Ok(())
}

fn render_geometry_pattern(
    canvas: &HtmlCanvasElement,
    context: &CanvasRenderingContext2d,
) -> Result<()> {
    canvas.set_width(122);
    canvas.set_height(110);
    context.set_global_composite_operation("multiply")?;

    for (color, x, y) in [("#f2f", 40.0, 40.0), ("#2ff", 80.0, 40.0), ("#ff2", 60.0, 80.0)] {
        context.set_fill_style_str(color);
        context.begin_path();
        context.arc(x, y, 40.0, 0.0, 2.0 * std::f64::consts::PI)?;
        context.close_path();
        context.fill();
    }

    context.set_fill_style_str("#f9c");
    context.arc(60.0, 60.0, 60.0, 0.0, 2.0 * std::f64::consts::PI)?;
    context.arc(60.0, 60.0, 20.0, 0.0, 2.0 * std::f64::consts::PI)?;
    Function::new_with_args("ctx", "ctx.fill('evenodd');")
        .call1(&JsValue::NULL, context.as_ref())
        .map_err(Error::from)?;
    Ok(())
}

pub fn canvas_fingerprint(ctx: &ProbeContext) -> Result<ProbeReading> {
    let canvas = ctx.canvas()?;
    let context = match context_2d(&canvas)? {
        Some(context) => context,
        None => return Ok(ProbeReading::Unavailable),
    };

    let winding = winding_supported(&context);

    render_text_pattern(&canvas, &context)?;
    let text_url = canvas.to_data_url()?;
    let stability_check = canvas.to_data_url()?;
    if text_url != stability_check {
        return ProbeReading::value(json!({
            "winding": winding,
            "geometry": "unstable",
            "text": "unstable",
        }));
    }

    render_geometry_pattern(&canvas, &context)?;
    let geometry_url = canvas.to_data_url()?;

    ProbeReading::value(json!({
        "winding": winding,
        "geometry": sha256_hex(&geometry_url),
        "text": sha256_hex(&text_url),
    }))
}
