//! Text case plugin (class style)

use node_registry::{
    BoxError, ConfigField, NodeConfig, PluginBase, PluginClass, PluginMetadata, PortMap,
    PortValues,
};
use serde_json::{json, Value};

use crate::values::{option, output, text};

/// Class name referenced by manifests
pub const CLASS: &str = "TextCase";

pub const CONFIG_MODE: &str = "mode";

pub const MODES: [&str; 3] = ["upper", "lower", "title"];

/// Upper-case the first letter of every word, lower-case the rest
fn title_case(source: &str) -> String {
    let mut titled = String::with_capacity(source.len());
    let mut previous_is_letter = false;
    for c in source.chars() {
        if previous_is_letter {
            titled.extend(c.to_lowercase());
        } else {
            titled.extend(c.to_uppercase());
        }
        previous_is_letter = c.is_alphabetic();
    }
    titled
}

/// Changes the case of a string; an unrecognized mode yields `null`
pub struct TextCase;

impl PluginBase for TextCase {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: Some("Text Case".to_string()),
            category: Some("text".to_string()),
            description: Some("Converts text to upper, lower or title case".to_string()),
            inputs: Some(PortMap::from([("text".to_string(), "string".to_string())])),
            outputs: Some(PortMap::from([("result".to_string(), "string".to_string())])),
            config_fields: Some(vec![ConfigField::select(CONFIG_MODE, "Mode", &MODES, "upper")]),
            ..Default::default()
        }
    }

    fn run(
        &self,
        inputs: &PortValues,
        config: &NodeConfig,
    ) -> std::result::Result<PortValues, BoxError> {
        let source = text(inputs, "text");
        let result = match option(config, CONFIG_MODE, "upper") {
            "upper" => json!(source.to_uppercase()),
            "lower" => json!(source.to_lowercase()),
            "title" => json!(title_case(source)),
            _ => Value::Null,
        };
        Ok(output("result", result))
    }

    fn generate_code(&self, config: &NodeConfig) -> std::result::Result<String, BoxError> {
        let mode = option(config, CONFIG_MODE, "upper");
        if MODES.contains(&mode) {
            Ok(format!("result = text.{}()", mode))
        } else {
            Ok("result = None".to_string())
        }
    }
}

fn create() -> Box<dyn PluginBase> {
    Box::new(TextCase)
}

inventory::submit!(PluginClass {
    class: CLASS,
    create,
});
