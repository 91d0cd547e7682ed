//! Plugin manifests and their normalization

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{
    plugin_id, ClassPlugin, FunctionPlugin, PluginCapability, PluginDefinition, PluginHandlers,
    PluginMetadata,
};

/// On-disk form of a plugin unit
///
/// Exactly one of `handler` (function style) or `class` (class style) must
/// be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    #[serde(flatten)]
    pub metadata: PluginMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl PluginManifest {
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Resolve the manifest against the registered handlers
    ///
    /// Returns the reason as a plain string on failure; the caller attaches
    /// the unit it came from.
    pub fn normalize(
        self,
        key: &str,
        handlers: &PluginHandlers,
    ) -> std::result::Result<(PluginDefinition, Arc<dyn PluginCapability>), String> {
        let (metadata, capability): (PluginMetadata, Arc<dyn PluginCapability>) =
            match (self.handler, self.class) {
                (Some(_), Some(_)) => {
                    return Err("manifest names both a handler and a class".to_string())
                }
                (None, None) => {
                    return Err("manifest names neither a handler nor a class".to_string())
                }
                (Some(handler), None) => {
                    let registered = handlers
                        .function(&handler)
                        .ok_or_else(|| format!("unknown handler '{}'", handler))?;
                    let run = registered
                        .run
                        .ok_or_else(|| format!("handler '{}' has no run capability", handler))?;
                    let capability = FunctionPlugin {
                        run,
                        generate_code: registered.generate_code,
                    };
                    (self.metadata, Arc::new(capability))
                }
                (None, Some(class)) => {
                    let instance = handlers
                        .class(&class)
                        .ok_or_else(|| format!("unknown class '{}'", class))?;
                    let defaults = instance.metadata();
                    (self.metadata.or(defaults), Arc::new(ClassPlugin { instance }))
                }
            };

        let name = metadata.name.ok_or("missing 'name'")?;
        let inputs = metadata.inputs.ok_or("missing 'inputs'")?;
        let outputs = metadata.outputs.ok_or("missing 'outputs'")?;
        let category = metadata.category.unwrap_or_default();

        let definition = PluginDefinition {
            id: plugin_id(&category, key),
            key: key.to_string(),
            name,
            category,
            description: metadata.description.unwrap_or_default(),
            editable: metadata.editable.unwrap_or(true),
            generated: metadata.generated.unwrap_or(false),
            inputs,
            outputs,
            config_fields: metadata.config_fields.unwrap_or_default(),
        };
        Ok((definition, capability))
    }
}
