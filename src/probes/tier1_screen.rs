//! Screen and window geometry probes (stage 1: fast, essential)

use js_sys::Reflect;
use serde_json::json;
use wasm_bindgen::JsValue;

use super::{media_matches, ProbeContext};
use crate::error::Result;
use crate::registry::ProbeReading;

/// Screen resolution as [larger, smaller] so orientation flips do not
/// change the reading.
pub fn screen_resolution(ctx: &ProbeContext) -> Result<ProbeReading> {
    let screen = ctx.screen()?;
    let width = screen.width()?;
    let height = screen.height()?;
    let mut dimensions = [width, height];
    dimensions.sort_unstable();
    dimensions.reverse();
    ProbeReading::value(json!(dimensions))
}

pub fn window_dimensions(ctx: &ProbeContext) -> Result<ProbeReading> {
    let window = ctx.window()?;
    ProbeReading::value(json!({
        "innerWidth": window.inner_width()?.as_f64(),
        "innerHeight": window.inner_height()?.as_f64(),
        "outerWidth": window.outer_width()?.as_f64(),
        "outerHeight": window.outer_height()?.as_f64(),
        "devicePixelRatio": window.device_pixel_ratio(),
    }))
}

pub fn display_capabilities(ctx: &ProbeContext) -> Result<ProbeReading> {
    let screen = ctx.screen()?;
    let window = ctx.window()?;

    let color_gamut = ["rec2020", "p3", "srgb"]
        .iter()
        .find(|gamut| media_matches(&window, &format!("(color-gamut: {})", gamut)).unwrap_or(false))
        .copied();

    ProbeReading::value(json!({
        "colorDepth": screen.color_depth()?,
        "pixelDepth": screen.pixel_depth()?,
        "colorGamut": color_gamut,
        "monochrome": media_matches(&window, "(monochrome)"),
    }))
}

/// Distance between the screen edge and the available area on each side.
/// An all-zero frame on a desktop OS is a virtual machine tell.
pub fn screen_frame(ctx: &ProbeContext) -> Result<ProbeReading> {
    let screen = ctx.screen()?;
    let screen_js: &JsValue = screen.as_ref();

    let avail_left = Reflect::get(screen_js, &JsValue::from_str("availLeft"))?
        .as_f64()
        .unwrap_or(0.0);
    let avail_top = Reflect::get(screen_js, &JsValue::from_str("availTop"))?
        .as_f64()
        .unwrap_or(0.0);
    let width = screen.width()? as f64;
    let height = screen.height()? as f64;
    let avail_width = screen.avail_width()? as f64;
    let avail_height = screen.avail_height()? as f64;

    // [top, right, bottom, left]
    ProbeReading::value(json!([
        avail_top,
        width - avail_width - avail_left,
        height - avail_height - avail_top,
        avail_left,
    ]))
}
