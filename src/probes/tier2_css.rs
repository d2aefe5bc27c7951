//! CSS feature and media query probes (stage 2: moderate cost)
//!
//! Media feature states leak OS-level accessibility and display settings.
//! Each three-state query resolves to the matching keyword, or null when the
//! engine does not understand the feature at all.

use serde_json::{json, Value};
use web_sys::Window;

use super::{media_matches, ProbeContext};
use crate::error::Result;
use crate::registry::ProbeReading;

/// Resolve a media feature to the first matching keyword.
fn media_feature(window: &Window, feature: &str, keywords: &[&str]) -> Value {
    for keyword in keywords {
        if media_matches(window, &format!("({}: {})", feature, keyword)).unwrap_or(false) {
            return json!(keyword);
        }
    }
    Value::Null
}

pub fn css_features(_ctx: &ProbeContext) -> Result<ProbeReading> {
    let supports = |property: &str, value: &str| -> bool {
        js_sys::eval(&format!(
            "typeof CSS !== 'undefined' && CSS.supports('{}', '{}')",
            property, value
        ))
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
    };

    ProbeReading::value(json!({
        "grid": supports("display", "grid"),
        "backdropFilter": supports("backdrop-filter", "blur(2px)"),
        "containerType": supports("container-type", "inline-size"),
        "aspectRatio": supports("aspect-ratio", "1 / 1"),
        "textWrapBalance": supports("text-wrap", "balance"),
    }))
}

pub fn inverted_colors(ctx: &ProbeContext) -> Result<ProbeReading> {
    let window = ctx.window()?;
    ProbeReading::value(media_feature(&window, "inverted-colors", &["inverted", "none"]))
}

pub fn forced_colors(ctx: &ProbeContext) -> Result<ProbeReading> {
    let window = ctx.window()?;
    ProbeReading::value(media_feature(&window, "forced-colors", &["active", "none"]))
}

pub fn prefers_contrast(ctx: &ProbeContext) -> Result<ProbeReading> {
    let window = ctx.window()?;
    ProbeReading::value(media_feature(
        &window,
        "prefers-contrast",
        &["no-preference", "more", "less", "custom"],
    ))
}

pub fn prefers_reduced_motion(ctx: &ProbeContext) -> Result<ProbeReading> {
    let window = ctx.window()?;
    ProbeReading::value(media_feature(
        &window,
        "prefers-reduced-motion",
        &["reduce", "no-preference"],
    ))
}

pub fn dynamic_range(ctx: &ProbeContext) -> Result<ProbeReading> {
    let window = ctx.window()?;
    ProbeReading::value(media_feature(&window, "dynamic-range", &["high", "standard"]))
}
