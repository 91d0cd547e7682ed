//! Text nodes

use node_registry::{
    BoxError, BuiltinNode, ConfigConstraint, NodeConfig, NodeDefinition, NodeTableFn, PortValues,
};
use serde_json::json;

use crate::values::{option, output, text};

pub const CONCAT: &str = "core.text.concat";
pub const LENGTH: &str = "core.text.length";
pub const REPLACE: &str = "core.text.replace";

type NodeResult = std::result::Result<PortValues, BoxError>;

/// Config key for the concat separator
pub const CONFIG_SEPARATOR: &str = "separator";

fn concat(inputs: &PortValues, config: &NodeConfig) -> NodeResult {
    let separator = option(config, CONFIG_SEPARATOR, "");
    let joined = [text(inputs, "a"), text(inputs, "b")].join(separator);
    Ok(output("result", json!(joined)))
}

fn concat_code(config: &NodeConfig) -> std::result::Result<String, BoxError> {
    let separator = option(config, CONFIG_SEPARATOR, "");
    Ok(format!("result = {}.join([a, b])", json!(separator)))
}

/// Length in characters, not bytes
fn length(inputs: &PortValues, _config: &NodeConfig) -> NodeResult {
    Ok(output("result", json!(text(inputs, "text").chars().count())))
}

fn length_code(_config: &NodeConfig) -> std::result::Result<String, BoxError> {
    Ok("result = len(text)".to_string())
}

/// Replace every occurrence; an empty pattern leaves the text unchanged
fn replace(inputs: &PortValues, _config: &NodeConfig) -> NodeResult {
    let source = text(inputs, "text");
    let pattern = text(inputs, "pattern");
    let replaced = if pattern.is_empty() {
        source.to_string()
    } else {
        source.replace(pattern, text(inputs, "replacement"))
    };
    Ok(output("result", json!(replaced)))
}

fn replace_code(_config: &NodeConfig) -> std::result::Result<String, BoxError> {
    Ok("result = text.replace(pattern, replacement) if pattern else text".to_string())
}

fn v0_1_0() -> Vec<BuiltinNode> {
    vec![
        BuiltinNode::new(
            NodeDefinition::new(CONCAT, "Concatenate", "v0.1.0", "text")
                .description("Joins two strings with an optional separator")
                .input("a", "string")
                .input("b", "string")
                .output("result", "string")
                .config(
                    CONFIG_SEPARATOR,
                    ConfigConstraint::Text {
                        default: Some(String::new()),
                    },
                ),
            concat,
            concat_code,
        ),
        BuiltinNode::new(
            NodeDefinition::new(LENGTH, "Length", "v0.1.0", "text")
                .description("Number of characters in a string")
                .input("text", "string")
                .output("result", "integer"),
            length,
            length_code,
        ),
    ]
}

fn v0_2_0() -> Vec<BuiltinNode> {
    vec![BuiltinNode::new(
        NodeDefinition::new(REPLACE, "Replace", "v0.2.0", "text")
            .description("Replaces every occurrence of a pattern")
            .input("text", "string")
            .input("pattern", "string")
            .input("replacement", "string")
            .output("result", "text"),
        replace,
        replace_code,
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

    fn inputs(pairs: &[(&str, &str)]) -> PortValues {
        pairs
            .iter()
            .map(|(port, value)| (port.to_string(), json!(value)))
            .collect()
    }

    #[test]
    fn test_concat_with_separator() {
        let config = NodeConfig::from([(CONFIG_SEPARATOR.to_string(), json!(", "))]);
        let outputs = concat(&inputs(&[("a", "left"), ("b", "right")]), &config).unwrap();
        assert_eq!(outputs["result"], json!("left, right"));
        assert_eq!(concat_code(&config).unwrap(), r#"result = ", ".join([a, b])"#);
    }

    #[test]
    fn test_length_counts_characters() {
        let outputs = length(&inputs(&[("text", "héllo")]), &NodeConfig::new()).unwrap();
        assert_eq!(outputs["result"], json!(5));
    }

    #[test]
    fn test_replace() {
        let config = NodeConfig::new();
        let outputs = replace(
            &inputs(&[("text", "a-b-c"), ("pattern", "-"), ("replacement", "+")]),
            &config,
        )
        .unwrap();
        assert_eq!(outputs["result"], json!("a+b+c"));

        let unchanged = replace(&inputs(&[("text", "abc")]), &config).unwrap();
        assert_eq!(unchanged["result"], json!("abc"));
    }
}
