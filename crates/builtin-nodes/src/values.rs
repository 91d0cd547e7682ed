//! Input and config accessors shared by every node
//!
//! Missing or mistyped inputs fall back to zero-values: `0` for numbers,
//! `""` for text, `false` for booleans.

use node_registry::{NodeConfig, PortValues};
use serde_json::Value;

/// Numeric input, `0.0` when absent or not a number
pub fn number(inputs: &PortValues, port: &str) -> f64 {
    inputs.get(port).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Text input, `""` when absent or not a string
pub fn text<'a>(inputs: &'a PortValues, port: &str) -> &'a str {
    inputs.get(port).and_then(Value::as_str).unwrap_or("")
}

/// Boolean input, `false` when absent or not a boolean
pub fn boolean(inputs: &PortValues, port: &str) -> bool {
    inputs.get(port).and_then(Value::as_bool).unwrap_or(false)
}

/// Any input, `null` when absent
pub fn any(inputs: &PortValues, port: &str) -> Value {
    inputs.get(port).cloned().unwrap_or(Value::Null)
}

/// String config option, or `default` when unset
pub fn option<'a>(config: &'a NodeConfig, key: &str, default: &'a str) -> &'a str {
    config.get(key).and_then(Value::as_str).unwrap_or(default)
}

/// A number as JSON: integral results stay integers, non-finite ones
/// become `null`
pub fn number_value(n: f64) -> Value {
    if !n.is_finite() {
        Value::Null
    } else if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

/// Single-port output map
pub fn output(port: &str, value: Value) -> PortValues {
    PortValues::from([(port.to_string(), value)])
}
