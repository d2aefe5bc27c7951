//! Automation artifact probes (stage 2: moderate cost)
//!
//! Headless browsers and driver frameworks leave readable residue: the
//! webdriver flag, injected window properties, document attributes, and
//! a reformatted eval function.

use js_sys::Reflect;
use serde_json::json;
use wasm_bindgen::JsValue;

use super::ProbeContext;
use crate::error::Result;
use crate::registry::ProbeReading;

/// Window properties injected by common automation stacks.
const WINDOW_ARTIFACTS: &[&str] = &[
    "_phantom",
    "__nightmare",
    "_selenium",
    "callPhantom",
    "callSelenium",
    "_Selenium_IDE_Recorder",
    "__webdriver_evaluate",
    "__selenium_evaluate",
    "__webdriver_script_function",
    "__driver_unwrapped",
    "__fxdriver_unwrapped",
    "domAutomation",
    "domAutomationController",
];

/// Document attributes set by driver extensions.
const DOCUMENT_ARTIFACTS: &[&str] = &["selenium", "webdriver", "driver"];

pub fn webdriver_property(ctx: &ProbeContext) -> Result<ProbeReading> {
    let navigator = ctx.navigator()?;
    let value = Reflect::get(navigator.as_ref(), &JsValue::from_str("webdriver"))?;
    ProbeReading::value(json!({
        "present": !value.is_undefined(),
        "value": value.as_bool(),
    }))
}

/// eval.toString().length separates engine families (33 for V8, 37 for
/// JavaScriptCore, 39 for SpiderMonkey); a non-native form flags tampering.
pub fn eval_function(_ctx: &ProbeContext) -> Result<ProbeReading> {
    let serialized = js_sys::eval("eval.toString()")?.as_string().unwrap_or_default();
    ProbeReading::value(json!({
        "length": serialized.len(),
        "native": serialized.contains("[native code]"),
    }))
}

pub fn automation_artifacts(ctx: &ProbeContext) -> Result<ProbeReading> {
    let window = ctx.window()?;
    let window_js: &JsValue = window.as_ref();

    let window_flags: Vec<&str> = WINDOW_ARTIFACTS
        .iter()
        .filter(|name| Reflect::has(window_js, &JsValue::from_str(name)).unwrap_or(false))
        .copied()
        .collect();

    let document_flags: Vec<&str> = match ctx.document()?.document_element() {
        Some(root) => DOCUMENT_ARTIFACTS
            .iter()
            .filter(|name| root.get_attribute(name).is_some())
            .copied()
            .collect(),
        None => Vec::new(),
    };

    ProbeReading::value(json!({
        "windowFlags": window_flags,
        "documentFlags": document_flags,
        "clean": window_flags.is_empty() && document_flags.is_empty(),
    }))
}

pub fn window_process(ctx: &ProbeContext) -> Result<ProbeReading> {
    let window = ctx.window()?;
    let window_js: &JsValue = window.as_ref();
    // window.process is an Electron/Node bridge tell
    ProbeReading::value(json!({
        "hasProcess": Reflect::has(window_js, &JsValue::from_str("process")).unwrap_or(false),
    }))
}
