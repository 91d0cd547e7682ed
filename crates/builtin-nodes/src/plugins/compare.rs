//! Comparison plugin (class style)

use node_registry::{
    BoxError, ConfigField, NodeConfig, PluginBase, PluginClass, PluginMetadata, PortMap,
    PortValues,
};
use serde_json::{json, Value};

use crate::values::{number, option, output};

/// Class name referenced by manifests
pub const CLASS: &str = "Compare";

pub const CONFIG_OPERATOR: &str = "operator";

pub const OPERATORS: [&str; 6] = ["==", "!=", "<", "<=", ">", ">="];

/// Compares two numbers; an unrecognized operator yields `null`
pub struct Compare;

impl PluginBase for Compare {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: Some("Compare".to_string()),
            category: Some("logic".to_string()),
            description: Some("Compares two numbers".to_string()),
            inputs: Some(PortMap::from([
                ("a".to_string(), "number".to_string()),
                ("b".to_string(), "number".to_string()),
            ])),
            outputs: Some(PortMap::from([("result".to_string(), "boolean".to_string())])),
            config_fields: Some(vec![ConfigField::select(
                CONFIG_OPERATOR,
                "Operator",
                &OPERATORS,
                "==",
            )]),
            ..Default::default()
        }
    }

    fn run(
        &self,
        inputs: &PortValues,
        config: &NodeConfig,
    ) -> std::result::Result<PortValues, BoxError> {
        let (a, b) = (number(inputs, "a"), number(inputs, "b"));
        let result = match option(config, CONFIG_OPERATOR, "==") {
            "==" => json!(a == b),
            "!=" => json!(a != b),
            "<" => json!(a < b),
            "<=" => json!(a <= b),
            ">" => json!(a > b),
            ">=" => json!(a >= b),
            _ => Value::Null,
        };
        Ok(output("result", result))
    }

    fn generate_code(&self, config: &NodeConfig) -> std::result::Result<String, BoxError> {
        let operator = option(config, CONFIG_OPERATOR, "==");
        if OPERATORS.contains(&operator) {
            Ok(format!("result = a {} b", operator))
        } else {
            Ok("result = None".to_string())
        }
    }
}

fn create() -> Box<dyn PluginBase> {
    Box::new(Compare)
}

inventory::submit!(PluginClass {
    class: CLASS,
    create,
});
