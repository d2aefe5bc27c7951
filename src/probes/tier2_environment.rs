//! Host environment probes (stage 2: moderate cost)
//!
//! Timezone, floating-point behavior of the host Math object, and engine
//! artifacts readable from error stacks and function serialization. The
//! math readings deliberately go through `js_sys::Math` so they measure the
//! embedding JS engine, not this module's own compiled arithmetic.

use js_sys::{Array, Object, Reflect};
use serde_json::json;
use wasm_bindgen::JsValue;

use super::ProbeContext;
use crate::error::Result;
use crate::registry::ProbeReading;

pub fn timezone(_ctx: &ProbeContext) -> Result<ProbeReading> {
    let offset_minutes = js_sys::Date::new_0().get_timezone_offset();

    let name = {
        let format = js_sys::Intl::DateTimeFormat::new(&Array::new(), &Object::new());
        let options = format.resolved_options();
        Reflect::get(&options, &JsValue::from_str("timeZone"))
            .ok()
            .and_then(|v| v.as_string())
    };

    ProbeReading::value(json!({
        "offsetMinutes": offset_minutes,
        "name": name,
    }))
}

/// Engine-distinguishing transcendental function values.
///
/// Implementations differ in the low bits for extreme arguments, which makes
/// the vector stable per engine/libm build and cheap to read.
pub fn math_precision(_ctx: &ProbeContext) -> Result<ProbeReading> {
    use js_sys::Math;

    ProbeReading::value(json!({
        "acos": Math::acos(0.123124234234234242),
        "acosh": Math::acosh(1e308),
        "asin": Math::asin(0.123124234234234242),
        "asinh": Math::asinh(1.0),
        "atan": Math::atan(0.5),
        "atanh": Math::atanh(0.5),
        "sin": Math::sin(-1e300),
        "sinh": Math::sinh(1.0),
        "cos": Math::cos(10.000000000123),
        "cosh": Math::cosh(1.0),
        "tan": Math::tan(-1e300),
        "tanh": Math::tanh(1.0),
        "exp": Math::exp(1.0),
        "expm1": Math::expm1(1.0),
        "log1p": Math::log1p(10.0),
        "powPI": Math::pow(std::f64::consts::PI, -100.0),
        "additionError": (0.1f64 + 0.2) - 0.3,
    }))
}

/// Shape of a freshly generated error stack: frame format is an engine tell.
pub fn error_stack(_ctx: &ProbeContext) -> Result<ProbeReading> {
    let error = js_sys::Error::new("probe");
    let stack = Reflect::get(error.as_ref(), &JsValue::from_str("stack"))?
        .as_string()
        .unwrap_or_default();
    let head: String = stack.lines().next().unwrap_or("").chars().take(96).collect();

    ProbeReading::value(json!({
        "present": !stack.is_empty(),
        "length": stack.len(),
        "head": head,
    }))
}

/// Serialized form of Function.prototype.bind — absent or reformatted under
/// some instrumentation frameworks.
pub fn function_bind(_ctx: &ProbeContext) -> Result<ProbeReading> {
    let serialized = js_sys::eval("Function.prototype.bind ? Function.prototype.bind.toString() : ''")?
        .as_string()
        .unwrap_or_default();
    ProbeReading::value(json!({
        "present": !serialized.is_empty(),
        "native": serialized.contains("[native code]"),
        "length": serialized.len(),
    }))
}
