//! Input/output nodes
//!
//! `core.constant` has a two-segment id, so it gets no category from its
//! prefix; deployments place it through the category registry.

use node_registry::{
    BoxError, BuiltinNode, ConfigConstraint, NodeConfig, NodeDefinition, NodeTableFn, PortValues,
};
use serde_json::Value;

use crate::values::output;

pub const CONSTANT: &str = "core.constant";

/// Config key holding the constant
pub const CONFIG_VALUE: &str = "value";

fn constant(_inputs: &PortValues, config: &NodeConfig) -> std::result::Result<PortValues, BoxError> {
    let value = config.get(CONFIG_VALUE).cloned().unwrap_or(Value::Null);
    Ok(output("value", value))
}

fn constant_code(config: &NodeConfig) -> std::result::Result<String, BoxError> {
    let value = config.get(CONFIG_VALUE).unwrap_or(&Value::Null);
    Ok(format!("value = {}", serde_json::to_string(value)?))
}

fn v0_1_0() -> Vec<BuiltinNode> {
    vec![BuiltinNode::new(
        NodeDefinition::new(CONSTANT, "Constant", "v0.1.0", "io")
            .description("Emits a configured value")
            .output("value", "any")
            .config(CONFIG_VALUE, ConfigConstraint::Value { default: None }),
        constant,
        constant_code,
    )]
}

inventory::submit!(NodeTableFn {
    version: "v0.1.0",
    table: v0_1_0,
});
