//! Value plumbing between scene code and the host.
//!
//! Everything crossing the boundary goes through JSON so option structs can reuse their serde
//! derives and the renderer only ever sees plain data.

use rhai::{Dynamic, EvalAltResult, Position};
use serde::de::DeserializeOwned;

/// Error type of every native capability.
pub type ScriptResult<T> = Result<T, Box<EvalAltResult>>;

/// Runtime error raised inside scene code.
pub fn script_err(msg: impl Into<String>) -> Box<EvalAltResult> {
    Box::new(EvalAltResult::ErrorRuntime(
        Dynamic::from(msg.into()),
        Position::NONE,
    ))
}

/// Host JSON into a script value.
pub fn to_script(value: &serde_json::Value) -> ScriptResult<Dynamic> {
    rhai::serde::to_dynamic(value)
}

/// Any serializable host value into a script value.
pub fn to_script_value<T: serde::Serialize>(value: &T) -> ScriptResult<Dynamic> {
    rhai::serde::to_dynamic(value)
}

/// Script value into host JSON. Fails on function pointers and host objects.
pub fn to_json(value: &Dynamic) -> ScriptResult<serde_json::Value> {
    rhai::serde::from_dynamic::<serde_json::Value>(value)
}

/// Decode a script map into a host option struct.
///
/// Goes through JSON so integer literals are accepted where floats are expected.
pub fn parse<T: DeserializeOwned>(value: &Dynamic, what: &str) -> ScriptResult<T> {
    let json = to_json(value)?;
    serde_json::from_value(json).map_err(|e| script_err(format!("{what}: {e}")))
}

/// Number argument, accepting both integer and float literals.
pub fn num(value: &Dynamic, what: &str) -> ScriptResult<f64> {
    if let Ok(f) = value.as_float() {
        return Ok(f);
    }
    if let Ok(i) = value.as_int() {
        return Ok(i as f64);
    }
    Err(script_err(format!(
        "{what}: expected a number, got {}",
        value.type_name()
    )))
}

/// Non-negative integer argument (counts, indices).
pub fn count(value: &Dynamic, what: &str) -> ScriptResult<usize> {
    let n = num(value, what)?;
    if !(n.is_finite() && n >= 0.0) {
        return Err(script_err(format!("{what}: expected a count >= 0, got {n}")));
    }
    Ok(n as usize)
}

/// Count that sizes an allocation; rejected above `max` before anything is allocated.
pub fn bounded_count(value: &Dynamic, what: &str, max: usize) -> ScriptResult<usize> {
    let n = count(value, what)?;
    if n > max {
        return Err(script_err(format!("{what}: {n} exceeds the limit of {max}")));
    }
    Ok(n)
}

/// Array of numbers.
pub fn num_list(values: &rhai::Array, what: &str) -> ScriptResult<Vec<f64>> {
    values.iter().map(|v| num(v, what)).collect()
}
