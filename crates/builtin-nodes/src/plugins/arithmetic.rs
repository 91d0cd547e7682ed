//! Arithmetic plugin handler (function style)
//!
//! # Inputs
//! - `a` - Left operand (number)
//! - `b` - Right operand (number)
//!
//! # Outputs
//! - `result` - `a <operator> b`, or `null` for division or modulo by zero
//!   and for an unrecognized operator
//!
//! # Config
//! - `operator` - One of [`OPERATORS`], default `+`

use node_registry::{BoxError, NodeConfig, PluginFn, PortValues};
use serde_json::Value;

use crate::values::{number, number_value, option, output};

/// Handler name referenced by manifests
pub const HANDLER: &str = "arithmetic";

/// Config key selecting the operation
pub const CONFIG_OPERATOR: &str = "operator";

/// Operators offered by the `operator` select field
pub const OPERATORS: [&str; 6] = ["+", "-", "*", "/", "%", "**"];

fn apply(operator: &str, a: f64, b: f64) -> Value {
    let result = match operator {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        "/" | "%" if b == 0.0 => return Value::Null,
        "/" => a / b,
        // Floored modulo: the result takes the sign of the divisor
        "%" => a - b * (a / b).floor(),
        "**" => a.powf(b),
        _ => return Value::Null,
    };
    number_value(result)
}

pub fn run(inputs: &PortValues, config: &NodeConfig) -> std::result::Result<PortValues, BoxError> {
    let operator = option(config, CONFIG_OPERATOR, "+");
    let result = apply(operator, number(inputs, "a"), number(inputs, "b"));
    if result.is_null() {
        log::debug!("{}: '{}' produced a null result", HANDLER, operator);
    }
    Ok(output("result", result))
}

pub fn generate_code(config: &NodeConfig) -> std::result::Result<String, BoxError> {
    let operator = option(config, CONFIG_OPERATOR, "+");
    let code = match operator {
        "/" | "%" => format!("result = a {} b if b != 0 else None", operator),
        op if OPERATORS.contains(&op) => format!("result = a {} b", op),
        _ => "result = None".to_string(),
    };
    Ok(code)
}

inventory::submit!(PluginFn {
    handler: HANDLER,
    run: Some(run),
    generate_code: Some(generate_code),
});

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run_with(operator: &str, a: Value, b: Value) -> Value {
        let inputs = PortValues::from([("a".to_string(), a), ("b".to_string(), b)]);
        let config = NodeConfig::from([(CONFIG_OPERATOR.to_string(), json!(operator))]);
        run(&inputs, &config).unwrap()["result"].clone()
    }

    #[test]
    fn test_operators() {
        assert_eq!(run_with("+", json!(4), json!(2)), json!(6));
        assert_eq!(run_with("-", json!(4), json!(2)), json!(2));
        assert_eq!(run_with("*", json!(4), json!(2.5)), json!(10));
        assert_eq!(run_with("/", json!(5), json!(2)), json!(2.5));
        assert_eq!(run_with("%", json!(7), json!(3)), json!(1));
        assert_eq!(run_with("%", json!(-7), json!(3)), json!(2));
        assert_eq!(run_with("**", json!(2), json!(10)), json!(1024));
    }

    #[test]
    fn test_zero_divisor_is_null() {
        assert_eq!(run_with("/", json!(4), json!(0)), Value::Null);
        assert_eq!(run_with("%", json!(4), json!(0)), Value::Null);
    }

    #[test]
    fn test_unknown_operator_is_null() {
        assert_eq!(run_with("^", json!(4), json!(2)), Value::Null);
    }

    #[test]
    fn test_defaults() {
        let outputs = run(&PortValues::new(), &NodeConfig::new()).unwrap();
        assert_eq!(outputs["result"], json!(0));
    }

    #[test]
    fn test_generate_code() {
        let code = |op: &str| {
            generate_code(&NodeConfig::from([(CONFIG_OPERATOR.to_string(), json!(op))])).unwrap()
        };
        assert_eq!(code("+"), "result = a + b");
        assert_eq!(code("**"), "result = a ** b");
        assert_eq!(code("/"), "result = a / b if b != 0 else None");
        assert_eq!(code("^"), "result = None");
    }
}
