//! Font detection probe (stage 3: exhaustive)
//!
//! Width-measurement detection: render a reference string at a large size in
//! each generic family, then again with a candidate font in front of the
//! fallback. A width change on any baseline means the candidate is
//! installed. No DOM mutation beyond the run's scratch canvas.

use serde_json::json;
use wasm_bindgen::JsCast;
use web_sys::CanvasRenderingContext2d;

use super::ProbeContext;
use crate::error::Result;
use crate::registry::ProbeReading;

/// String with wide/narrow/ambiguous glyphs so substitution moves the width.
const REFERENCE_TEXT: &str = "mmMwWLliI0O&1";
const FONT_SIZE_PX: u32 = 72;

const BASE_FAMILIES: &[&str] = &["monospace", "sans-serif", "serif"];

const CANDIDATE_FONTS: &[&str] = &[
    "Arial",
    "Arial Black",
    "Arial Narrow",
    "Bookman",
    "Calibri",
    "Comic Sans MS",
    "Consolas",
    "Courier",
    "Courier New",
    "Garamond",
    "Geneva",
    "Georgia",
    "Helvetica",
    "Helvetica Neue",
    "Impact",
    "Lucida Console",
    "Menlo",
    "Monaco",
    "Palatino",
    "Roboto",
    "Segoe UI",
    "Tahoma",
    "Times New Roman",
    "Trebuchet MS",
    "Ubuntu",
    "Verdana",
];

fn text_width(context: &CanvasRenderingContext2d, font: &str) -> Result<f64> {
    context.set_font(font);
    Ok(context.measure_text(REFERENCE_TEXT)?.width())
}

pub fn font_detection(ctx: &ProbeContext) -> Result<ProbeReading> {
    let canvas = ctx.canvas()?;
    canvas.set_width(600);
    canvas.set_height(100);
    let context = match canvas.get_context("2d")? {
        Some(obj) => match obj.dyn_into::<CanvasRenderingContext2d>() {
            Ok(context) => context,
            Err(_) => return Ok(ProbeReading::Unavailable),
        },
        None => return Ok(ProbeReading::Unavailable),
    };

    let mut baselines = Vec::with_capacity(BASE_FAMILIES.len());
    for family in BASE_FAMILIES {
        baselines.push(text_width(
            &context,
            &format!("{}px {}", FONT_SIZE_PX, family),
        )?);
    }

    let mut detected = Vec::new();
    for candidate in CANDIDATE_FONTS {
        for (family, baseline) in BASE_FAMILIES.iter().zip(&baselines) {
            let width = text_width(
                &context,
                &format!("{}px \"{}\", {}", FONT_SIZE_PX, candidate, family),
            )?;
            if (width - baseline).abs() > f64::EPSILON {
                detected.push(*candidate);
                break;
            }
        }
    }

    ProbeReading::value(json!({
        "detected": detected,
        "tested": CANDIDATE_FONTS.len(),
    }))
}
