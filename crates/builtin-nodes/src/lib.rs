//! Built-in Nodes
//!
//! Version tables and plugin handlers for the node registry. Nothing here
//! is called directly: every table and handler is submitted through
//! `inventory` and picked up by `node_registry::CatalogRuntime`.
//!
//! # Categories
//!
//! - **Math**: add, subtract, multiply, divide, clamp
//! - **Text**: concat, length, replace
//! - **Logic**: and, not, select
//! - **IO**: constant
//!
//! # Plugin handlers
//!
//! - `arithmetic` (function style)
//! - `Compare`, `TextCase` (class style)

pub mod io;
pub mod logic;
pub mod math;
pub mod plugins;
pub mod text;
mod values;

use node_registry::{CatalogRuntime, RegistryConfig, Result};

/// Build the runtime with every table and handler in this crate linked in
pub fn initialize(config: &RegistryConfig) -> Result<CatalogRuntime> {
    CatalogRuntime::initialize(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use node_registry::{
        EntryOrigin, NodeConfig, NodeDefinitionSource, PluginHandlers, PortValues, RegistryError,
        UNCATEGORIZED,
    };
    use serde_json::json;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_inventory_collects_all_builtins() {
        let source = NodeDefinitionSource::with_builtins().unwrap();
        assert_eq!(source.len(), 12, "Expected 12 built-in nodes");
        assert_eq!(source.versions(), vec!["v0.1.0", "v0.2.0"]);
        assert_eq!(source.load_version("v0.1.0").len(), 9);
        assert_eq!(source.load_version("v0.2.0").len(), 12);

        // Spot-check known ids
        for id in [math::ADD, math::DIVIDE, text::CONCAT, logic::SELECT, io::CONSTANT] {
            assert!(source.get(id).is_some(), "missing {}", id);
        }
    }

    #[test]
    fn test_inventory_collects_plugin_handlers() {
        let handlers = PluginHandlers::collect();
        assert!(handlers.has_function(plugins::arithmetic::HANDLER));
        assert!(handlers.has_class(plugins::compare::CLASS));
        assert!(handlers.has_class(plugins::text_case::CLASS));
    }

    fn write(dir: &Path, relative: &str, value: serde_json::Value) {
        let path = dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }

    fn workspace() -> (TempDir, RegistryConfig) {
        let dir = TempDir::new().unwrap();
        for category in ["math", "text", "logic", "io", "vision"] {
            std::fs::create_dir_all(dir.path().join("nodes").join(category)).unwrap();
        }
        write(
            dir.path(),
            "nodes/registry.json",
            json!({"nodes": [{"id": "core.constant", "category": "io"}]}),
        );
        write(
            dir.path(),
            "plugins/calculator.json",
            json!({
                "name": "Calculator",
                "category": "math",
                "description": "Applies an arithmetic operator",
                "editable": false,
                "generated": false,
                "inputs": {"a": "number", "b": "number"},
                "outputs": {"result": "number"},
                "configFields": [{
                    "name": "operator",
                    "kind": "select",
                    "label": "Operator",
                    "options": ["+", "-", "*", "/", "%", "**"],
                    "default": "+"
                }],
                "handler": "arithmetic"
            }),
        );
        write(dir.path(), "plugins/compare.json", json!({"class": "Compare"}));
        write(
            dir.path(),
            "plugins/text/text_case.json",
            json!({"description": "Change the case of text", "class": "TextCase"}),
        );
        write(
            dir.path(),
            "plugins/orphan.json",
            json!({"name": "Orphan", "inputs": {}, "outputs": {}, "handler": "missing"}),
        );
        write(dir.path(), "plugins/_draft.json", json!({"class": "Compare"}));

        let config = RegistryConfig::default().resolve_paths(dir.path());
        (dir, config)
    }

    #[test]
    fn test_runtime_over_a_workspace() {
        let (_dir, config) = workspace();
        let runtime = initialize(&config).unwrap();

        let plugins = runtime.plugins();
        assert_eq!(plugins.len(), 3);
        assert_eq!(plugins.rejected().len(), 1);
        assert!(runtime.catalog().get("plugins.orphan").is_none());

        let categories = runtime.catalog().by_category();
        assert!(categories["vision"].is_empty());
        assert!(!categories.contains_key(UNCATEGORIZED));
        assert!(categories["io"].iter().any(|e| e.id() == io::CONSTANT));
        assert!(categories["math"]
            .iter()
            .any(|e| e.id() == "plugins.math.calculator" && e.origin() == EntryOrigin::Plugin));
        assert!(categories["logic"].iter().any(|e| e.id() == "plugins.logic.compare"));
        assert!(categories["text"].iter().any(|e| e.id() == "plugins.text.text_case"));
    }

    #[test]
    fn test_divide_by_zero_through_plugin() {
        let (_dir, config) = workspace();
        let runtime = initialize(&config).unwrap();

        let inputs = PortValues::from([("a".to_string(), json!(4)), ("b".to_string(), json!(0))]);
        let config = NodeConfig::from([("operator".to_string(), json!("/"))]);
        let outputs = runtime
            .dispatcher()
            .execute("plugins.math.calculator", &inputs, &config)
            .unwrap();
        assert_eq!(outputs, PortValues::from([("result".to_string(), json!(null))]));

        let code = runtime
            .dispatcher()
            .generate_code("plugins.math.calculator", &config)
            .unwrap();
        assert_eq!(code, "result = a / b if b != 0 else None");
    }

    #[test]
    fn test_builtin_dispatch_and_compatibility() {
        let (_dir, config) = workspace();
        let runtime = initialize(&config).unwrap();
        let dispatcher = runtime.dispatcher();

        let inputs = PortValues::from([("a".to_string(), json!(2)), ("b".to_string(), json!(3))]);
        let outputs = dispatcher.execute(math::ADD, &inputs, &NodeConfig::new()).unwrap();
        assert_eq!(outputs["result"], json!(5));

        assert!(matches!(
            dispatcher.execute("unknown.node.id", &inputs, &NodeConfig::new()),
            Err(RegistryError::UnknownNode(_))
        ));

        let catalog = runtime.catalog();
        let types = runtime.types();
        assert!(catalog
            .can_connect(types, text::LENGTH, "result", math::ADD, "a")
            .unwrap());
        assert!(!catalog
            .can_connect(types, math::ADD, "result", text::LENGTH, "text")
            .unwrap());
        assert!(catalog
            .can_connect(types, "plugins.text.text_case", "result", logic::SELECT, "if_true")
            .unwrap());
    }

    #[test]
    fn test_older_schema_version_hides_newer_nodes() {
        let (dir, _) = workspace();
        let config = RegistryConfig {
            schema_version: "v0.1.0".to_string(),
            ..Default::default()
        }
        .resolve_paths(dir.path());
        let runtime = initialize(&config).unwrap();

        assert!(runtime.catalog().get(math::CLAMP).is_none());
        assert!(runtime.catalog().get(math::ADD).is_some());
        assert!(!runtime.types().contains("percentage"));
    }

    #[test]
    fn test_bundled_demo_layout() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
        let config = RegistryConfig::load(&root.join("registry.json")).unwrap();
        let runtime = initialize(&config).unwrap();

        assert_eq!(runtime.plugins().len(), 3);
        assert!(runtime.catalog().get("plugins.math.calculator").is_some());
        assert!(runtime.catalog().by_category().contains_key("io"));
    }
}
