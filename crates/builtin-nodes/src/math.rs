//! Math nodes
//!
//! Binary operations take `a` and `b` and produce `result`. Division by zero
//! produces a `null` result rather than an error.

use node_registry::{BoxError, BuiltinNode, NodeConfig, NodeDefinition, NodeTableFn, PortValues};

use crate::values::{number, number_value, output};

pub const ADD: &str = "core.math.add";
pub const SUBTRACT: &str = "core.math.subtract";
pub const MULTIPLY: &str = "core.math.multiply";
pub const DIVIDE: &str = "core.math.divide";
pub const CLAMP: &str = "core.math.clamp";

/// Port ID for the left operand
pub const PORT_A: &str = "a";
/// Port ID for the right operand
pub const PORT_B: &str = "b";
/// Port ID for the result
pub const PORT_RESULT: &str = "result";

type NodeResult = std::result::Result<PortValues, BoxError>;

fn binary(id: &str, name: &str, description: &str) -> NodeDefinition {
    NodeDefinition::new(id, name, "v0.1.0", "math")
        .description(description)
        .input(PORT_A, "number")
        .input(PORT_B, "number")
        .output(PORT_RESULT, "number")
}

fn add(inputs: &PortValues, _config: &NodeConfig) -> NodeResult {
    let sum = number(inputs, PORT_A) + number(inputs, PORT_B);
    Ok(output(PORT_RESULT, number_value(sum)))
}

fn add_code(_config: &NodeConfig) -> std::result::Result<String, BoxError> {
    Ok("result = a + b".to_string())
}

fn subtract(inputs: &PortValues, _config: &NodeConfig) -> NodeResult {
    let difference = number(inputs, PORT_A) - number(inputs, PORT_B);
    Ok(output(PORT_RESULT, number_value(difference)))
}

fn subtract_code(_config: &NodeConfig) -> std::result::Result<String, BoxError> {
    Ok("result = a - b".to_string())
}

fn multiply(inputs: &PortValues, _config: &NodeConfig) -> NodeResult {
    let product = number(inputs, PORT_A) * number(inputs, PORT_B);
    Ok(output(PORT_RESULT, number_value(product)))
}

fn multiply_code(_config: &NodeConfig) -> std::result::Result<String, BoxError> {
    Ok("result = a * b".to_string())
}

fn divide(inputs: &PortValues, _config: &NodeConfig) -> NodeResult {
    let divisor = number(inputs, PORT_B);
    if divisor == 0.0 {
        log::debug!("{}: division by zero, result is null", DIVIDE);
        return Ok(output(PORT_RESULT, serde_json::Value::Null));
    }
    Ok(output(PORT_RESULT, number_value(number(inputs, PORT_A) / divisor)))
}

fn divide_code(_config: &NodeConfig) -> std::result::Result<String, BoxError> {
    Ok("result = a / b if b != 0 else None".to_string())
}

/// Clamp `value` into `[min, max]`; a reversed range yields `null`
fn clamp(inputs: &PortValues, _config: &NodeConfig) -> NodeResult {
    let (min, max) = (number(inputs, "min"), number(inputs, "max"));
    if min > max {
        return Ok(output(PORT_RESULT, serde_json::Value::Null));
    }
    let value = number(inputs, "value").clamp(min, max);
    Ok(output(PORT_RESULT, number_value(value)))
}

fn clamp_code(_config: &NodeConfig) -> std::result::Result<String, BoxError> {
    Ok("result = min(max(value, min), max) if min <= max else None".to_string())
}

fn v0_1_0() -> Vec<BuiltinNode> {
    vec![
        BuiltinNode::new(binary(ADD, "Add", "Adds two numbers"), add, add_code),
        BuiltinNode::new(
            binary(SUBTRACT, "Subtract", "Subtracts b from a"),
            subtract,
            subtract_code,
        ),
        BuiltinNode::new(
            binary(MULTIPLY, "Multiply", "Multiplies two numbers"),
            multiply,
            multiply_code,
        ),
        BuiltinNode::new(
            binary(DIVIDE, "Divide", "Divides a by b; null when b is zero"),
            divide,
            divide_code,
        ),
    ]
}

fn v0_2_0() -> Vec<BuiltinNode> {
    vec![
        // Same ports, clearer description; behavior is inherited
        BuiltinNode::metadata_only(binary(
            ADD,
            "Add",
            "Adds two numbers; integral sums stay integers",
        )),
        BuiltinNode::new(
            NodeDefinition::new(CLAMP, "Clamp", "v0.2.0", "math")
                .description("Limits a value to the range [min, max]")
                .input("value", "number")
                .input("min", "number")
                .input("max", "number")
                .output(PORT_RESULT, "number"),
            clamp,
            clamp_code,
        ),
    ]
}

inventory::submit!(NodeTableFn {
    version: "v0.1.0",
    table: v0_1_0,
});

inventory::submit!(NodeTableFn {
    version: "v0.2.0",
    table: v0_2_0,
});
