//! Execution and code generation through the unified catalog

use std::sync::Arc;

use crate::catalog::{CatalogEntry, NodeCatalog};
use crate::descriptor::{NodeConfig, NodeImplementation, PortValues};
use crate::error::{BoxError, RegistryError, Result};
use crate::nodes::NodeDefinitionSource;
use crate::plugin::{PluginCapability, PluginSource};
use crate::version::SchemaVersion;

/// Behavior resolved for one catalog entry
enum Target {
    Builtin(Arc<dyn NodeImplementation>),
    Plugin(Arc<dyn PluginCapability>),
}

impl Target {
    fn run(
        &self,
        inputs: &PortValues,
        config: &NodeConfig,
    ) -> std::result::Result<PortValues, BoxError> {
        match self {
            Target::Builtin(implementation) => implementation.run(inputs, config),
            Target::Plugin(capability) => capability.run(inputs, config),
        }
    }

    fn generate_code(&self, config: &NodeConfig) -> std::result::Result<String, BoxError> {
        match self {
            Target::Builtin(implementation) => implementation.generate_code(config),
            Target::Plugin(capability) => capability.generate_code(config),
        }
    }
}

/// Routes `execute` / `generate_code` to whichever source owns an id
///
/// Stateless; safe to share across threads and call concurrently.
#[derive(Clone)]
pub struct ExecutionDispatcher {
    catalog: Arc<NodeCatalog>,
    nodes: Arc<NodeDefinitionSource>,
    plugins: Arc<PluginSource>,
    schema_version: Option<SchemaVersion>,
}

impl ExecutionDispatcher {
    /// Dispatch against the newest node implementations
    pub fn new(
        catalog: Arc<NodeCatalog>,
        nodes: Arc<NodeDefinitionSource>,
        plugins: Arc<PluginSource>,
    ) -> Self {
        Self {
            catalog,
            nodes,
            plugins,
            schema_version: None,
        }
    }

    /// Pin built-in implementations to a schema version
    pub fn with_schema_version(mut self, version: SchemaVersion) -> Self {
        self.schema_version = Some(version);
        self
    }

    pub fn catalog(&self) -> &NodeCatalog {
        &self.catalog
    }

    fn resolve(&self, node_id: &str) -> Result<Target> {
        match self.catalog.require(node_id)? {
            CatalogEntry::Node(_) => {
                let implementation = match &self.schema_version {
                    Some(version) => self.nodes.implementation_at(node_id, version)?,
                    None => self.nodes.get_implementation(node_id)?,
                };
                Ok(Target::Builtin(implementation))
            }
            CatalogEntry::Plugin(_) => Ok(Target::Plugin(self.plugins.capability(node_id)?)),
        }
    }

    /// Run a node with concrete inputs and config
    ///
    /// A failure inside the node surfaces as
    /// [`RegistryError::Implementation`] carrying the original error.
    pub fn execute(
        &self,
        node_id: &str,
        inputs: &PortValues,
        config: &NodeConfig,
    ) -> Result<PortValues> {
        log::debug!("Executing node '{}' with {} inputs", node_id, inputs.len());
        self.resolve(node_id)?
            .run(inputs, config)
            .map_err(|source| RegistryError::Implementation {
                node_id: node_id.to_string(),
                source,
            })
    }

    /// Emit the source fragment for a node under `config`
    pub fn generate_code(&self, node_id: &str, config: &NodeConfig) -> Result<String> {
        log::debug!("Generating code for node '{}'", node_id);
        self.resolve(node_id)?
            .generate_code(config)
            .map_err(|source| RegistryError::Implementation {
                node_id: node_id.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategoryRegistry;
    use crate::descriptor::{BuiltinNode, NodeDefinition, NodeTable};
    use crate::plugin::test_support;
    use serde_json::json;
    use std::error::Error;
    use tempfile::TempDir;

    fn double(inputs: &PortValues, _config: &NodeConfig) -> std::result::Result<PortValues, BoxError> {
        let value = inputs.get("value").and_then(|v| v.as_i64()).unwrap_or(0);
        Ok(PortValues::from([("result".to_string(), json!(value * 2))]))
    }

    fn double_code(_config: &NodeConfig) -> std::result::Result<String, BoxError> {
        Ok("result = value * 2".to_string())
    }

    fn dispatcher(plugins_dir: &std::path::Path) -> ExecutionDispatcher {
        let def = NodeDefinition::new("core.math.double", "Double", "v0.1.0", "math")
            .input("value", "integer")
            .output("result", "integer");
        let nodes = NodeDefinitionSource::from_tables(vec![
            NodeTable::new("v0.1.0", vec![BuiltinNode::new(def, double, double_code)]),
            NodeTable::new(
                "v0.2.0",
                vec![BuiltinNode::metadata_only(
                    NodeDefinition::new("core.math.halve", "Halve", "v0.2.0", "math")
                        .input("value", "integer")
                        .output("result", "float"),
                )],
            ),
        ])
        .unwrap();
        let plugins = PluginSource::discover(plugins_dir, &test_support::handlers());
        let catalog = NodeCatalog::build(
            nodes.load_version("v0.2.0").into_values(),
            plugins.definitions().values(),
            &CategoryRegistry::default(),
            &[],
        );
        ExecutionDispatcher::new(Arc::new(catalog), Arc::new(nodes), Arc::new(plugins))
    }

    fn plugins_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("shout.json"),
            json!({"class": "Shout"}).to_string(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("broken.json"),
            json!({
                "name": "Broken",
                "category": "text",
                "inputs": {"text": "string"},
                "outputs": {"result": "string"},
                "handler": "broken"
            })
            .to_string(),
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_execute_builtin_and_plugin() {
        let dir = plugins_dir();
        let dispatcher = dispatcher(dir.path());

        let outputs = dispatcher
            .execute(
                "core.math.double",
                &PortValues::from([("value".to_string(), json!(21))]),
                &NodeConfig::new(),
            )
            .unwrap();
        assert_eq!(outputs["result"], json!(42));

        let outputs = dispatcher
            .execute(
                "plugins.text.shout",
                &PortValues::from([("text".to_string(), json!("quiet"))]),
                &NodeConfig::new(),
            )
            .unwrap();
        assert_eq!(outputs["result"], json!("QUIET"));

        assert_eq!(
            dispatcher.generate_code("plugins.text.shout", &NodeConfig::new()).unwrap(),
            "result = text.upper()"
        );
        assert_eq!(
            dispatcher.generate_code("core.math.double", &NodeConfig::new()).unwrap(),
            "result = value * 2"
        );
    }

    #[test]
    fn test_unknown_node() {
        let dir = plugins_dir();
        let dispatcher = dispatcher(dir.path());
        let result = dispatcher.execute("unknown.node.id", &PortValues::new(), &NodeConfig::new());
        assert!(matches!(result, Err(RegistryError::UnknownNode(id)) if id == "unknown.node.id"));
        assert!(matches!(
            dispatcher.generate_code("unknown.node.id", &NodeConfig::new()),
            Err(RegistryError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_implementation_error_preserved() {
        let dir = plugins_dir();
        let dispatcher = dispatcher(dir.path());
        let error = dispatcher
            .execute("plugins.text.broken", &PortValues::new(), &NodeConfig::new())
            .unwrap_err();

        match &error {
            RegistryError::Implementation { node_id, .. } => assert_eq!(node_id, "plugins.text.broken"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            error.source().unwrap().to_string(),
            "input 'text' must be a string"
        );
    }

    #[test]
    fn test_schema_version_pinning() {
        let dir = plugins_dir();
        let dispatcher = dispatcher(dir.path());
        assert!(matches!(
            dispatcher.execute("core.math.halve", &PortValues::new(), &NodeConfig::new()),
            Err(RegistryError::NoImplementation(_))
        ));

        let pinned = dispatcher.with_schema_version(SchemaVersion::new(0, 1, 0));
        assert!(matches!(
            pinned.execute("core.math.halve", &PortValues::new(), &NodeConfig::new()),
            Err(RegistryError::UnknownNode(_))
        ));
        assert!(pinned
            .execute("core.math.double", &PortValues::new(), &NodeConfig::new())
            .is_ok());
    }
}
