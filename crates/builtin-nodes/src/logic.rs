//! Logic nodes

use node_registry::{BoxError, BuiltinNode, NodeConfig, NodeDefinition, NodeTableFn, PortValues};
use serde_json::json;

use crate::values::{any, boolean, output};

pub const AND: &str = "core.logic.and";
pub const NOT: &str = "core.logic.not";
pub const SELECT: &str = "core.logic.select";

type NodeResult = std::result::Result<PortValues, BoxError>;

fn and(inputs: &PortValues, _config: &NodeConfig) -> NodeResult {
    Ok(output("result", json!(boolean(inputs, "a") && boolean(inputs, "b"))))
}

fn and_code(_config: &NodeConfig) -> std::result::Result<String, BoxError> {
    Ok("result = a and b".to_string())
}

fn not(inputs: &PortValues, _config: &NodeConfig) -> NodeResult {
    Ok(output("result", json!(!boolean(inputs, "value"))))
}

fn not_code(_config: &NodeConfig) -> std::result::Result<String, BoxError> {
    Ok("result = not value".to_string())
}

/// Route `if_true` or `if_false` to `result`
fn select(inputs: &PortValues, _config: &NodeConfig) -> NodeResult {
    let chosen = if boolean(inputs, "condition") {
        "if_true"
    } else {
        "if_false"
    };
    Ok(output("result", any(inputs, chosen)))
}

fn select_code(_config: &NodeConfig) -> std::result::Result<String, BoxError> {
    Ok("result = if_true if condition else if_false".to_string())
}

fn v0_1_0() -> Vec<BuiltinNode> {
    vec![
        BuiltinNode::new(
            NodeDefinition::new(AND, "And", "v0.1.0", "logic")
                .description("True when both inputs are true")
                .input("a", "boolean")
                .input("b", "boolean")
                .output("result", "boolean"),
            and,
            and_code,
        ),
        BuiltinNode::new(
            NodeDefinition::new(NOT, "Not", "v0.1.0", "logic")
                .description("Negates a boolean")
                .input("value", "boolean")
                .output("result", "boolean"),
            not,
            not_code,
        ),
    ]
}

fn v0_2_0() -> Vec<BuiltinNode> {
    vec![BuiltinNode::new(
        NodeDefinition::new(SELECT, "Select", "v0.2.0", "logic")
            .description("Routes one of two values based on a condition")
            .input("condition", "boolean")
            .input("if_true", "any")
            .input("if_false", "any")
            .output("result", "any"),
        select,
        select_code,
    )]
}

inventory::submit!(NodeTableFn {
    version: "v0.1.0",
    table: v0_1_0,
});

inventory::submit!(NodeTableFn {
    version: "v0.2.0",
    table: v0_2_0,
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_not() {
        let config = NodeConfig::new();
        let both = PortValues::from([("a".to_string(), json!(true)), ("b".to_string(), json!(true))]);
        assert_eq!(and(&both, &config).unwrap()["result"], json!(true));
        assert_eq!(and(&PortValues::new(), &config).unwrap()["result"], json!(false));
        assert_eq!(not(&PortValues::new(), &config).unwrap()["result"], json!(true));
    }

    #[test]
    fn test_select_routes_value() {
        let mut inputs = PortValues::from([
            ("if_true".to_string(), json!({"data": 123})),
            ("if_false".to_string(), json!("fallback")),
        ]);
        let config = NodeConfig::new();
        assert_eq!(select(&inputs, &config).unwrap()["result"], json!("fallback"));

        inputs.insert("condition".to_string(), json!(true));
        assert_eq!(select(&inputs, &config).unwrap()["result"], json!({"data": 123}));
    }
}
