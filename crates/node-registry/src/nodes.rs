//! Built-in node definitions, resolved per schema version

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::descriptor::{BuiltinNode, NodeDefinition, NodeImplementation, NodeTable, NodeTableFn};
use crate::error::{RegistryError, Result};
use crate::version::{SchemaVersion, VersionedStore};

/// Source of built-in nodes
///
/// Holds every version table in one append-only store. A later table may
/// re-declare a node (new description, config, implementation) but never
/// change its ports.
pub struct NodeDefinitionSource {
    store: VersionedStore<BuiltinNode>,
    versions: Vec<SchemaVersion>,
}

impl NodeDefinitionSource {
    /// Build from explicit tables
    pub fn from_tables(tables: Vec<NodeTable>) -> Result<Self> {
        let mut ordered = Vec::with_capacity(tables.len());
        for table in tables {
            ordered.push((SchemaVersion::parse(&table.version)?, table));
        }
        // Stable sort keeps submissions of the same version in order
        ordered.sort_by(|a, b| a.0.cmp(&b.0));

        let mut store: VersionedStore<BuiltinNode> = VersionedStore::new();
        let mut versions: Vec<SchemaVersion> = Vec::new();

        for (version, table) in ordered {
            for node in table.nodes {
                let id = node.definition.id.clone();
                // Tables are walked oldest first, so `latest` is the
                // previous revision of this node.
                if let Some(previous) = store.latest(&id) {
                    if !previous.definition.same_shape(&node.definition) {
                        return Err(RegistryError::NodeShapeConflict {
                            node_id: id,
                            version: version.to_string(),
                        });
                    }
                }
                if !store.insert(id.clone(), version.clone(), node) {
                    return Err(RegistryError::DuplicateDefinition {
                        id,
                        version: version.to_string(),
                    });
                }
            }
            if versions.last() != Some(&version) {
                versions.push(version);
            }
        }

        log::info!(
            "Loaded {} built-in nodes across {} versions",
            store.len(),
            versions.len()
        );
        Ok(Self { store, versions })
    }

    /// Build from every table submitted via `inventory`
    pub fn with_builtins() -> Result<Self> {
        let tables = inventory::iter::<NodeTableFn>
            .into_iter()
            .map(|submission| NodeTable::new(submission.version, (submission.table)()))
            .collect();
        Self::from_tables(tables)
    }

    /// Known version tags, oldest first
    pub fn versions(&self) -> Vec<String> {
        self.versions.iter().map(|v| v.to_string()).collect()
    }

    /// Newest known version
    pub fn latest_version(&self) -> Option<&SchemaVersion> {
        self.versions.last()
    }

    /// All nodes visible at a version tag, each at its newest revision
    /// at or below that tag
    ///
    /// An unparseable tag, or a tag older than every table, yields an
    /// empty map.
    pub fn load_version(&self, tag: &str) -> BTreeMap<String, NodeDefinition> {
        let version = match SchemaVersion::parse(tag) {
            Ok(version) => version,
            Err(e) => {
                log::warn!("Cannot load node definitions: {}", e);
                return BTreeMap::new();
            }
        };

        if self.versions.first().map_or(true, |oldest| version < *oldest) {
            log::warn!("No node table at or below {}", version);
            return BTreeMap::new();
        }

        self.store
            .resolve_all(&version)
            .map(|(id, node)| (id.to_string(), node.definition.clone()))
            .collect()
    }

    /// Definition at the newest version
    pub fn get(&self, node_id: &str) -> Option<&NodeDefinition> {
        self.store.latest(node_id).map(|node| &node.definition)
    }

    /// Implementation at the newest version
    pub fn get_implementation(&self, node_id: &str) -> Result<Arc<dyn NodeImplementation>> {
        match self.latest_version() {
            Some(latest) => self.implementation_at(node_id, latest),
            None => Err(RegistryError::UnknownNode(node_id.to_string())),
        }
    }

    /// Implementation visible at `version`
    ///
    /// Rows without an implementation inherit the one from the nearest
    /// earlier revision of the same node.
    pub fn implementation_at(
        &self,
        node_id: &str,
        version: &SchemaVersion,
    ) -> Result<Arc<dyn NodeImplementation>> {
        let mut history = self.store.history_at(node_id, version).peekable();
        if history.peek().is_none() {
            return Err(RegistryError::UnknownNode(node_id.to_string()));
        }
        history
            .find_map(|(_, node)| node.implementation.clone())
            .ok_or_else(|| RegistryError::NoImplementation(node_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{NodeConfig, PortValues};
    use crate::error::BoxError;
    use serde_json::json;

    fn add(inputs: &PortValues, _config: &NodeConfig) -> std::result::Result<PortValues, BoxError> {
        let a = inputs.get("a").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let b = inputs.get("b").and_then(|v| v.as_f64()).unwrap_or(0.0);
        Ok(PortValues::from([("result".to_string(), json!(a + b))]))
    }

    fn add_code(_config: &NodeConfig) -> std::result::Result<String, BoxError> {
        Ok("result = a + b".to_string())
    }

    fn add_def(version: &str) -> NodeDefinition {
        NodeDefinition::new("core.math.add", "Add", version, "math")
            .input("a", "number")
            .input("b", "number")
            .output("result", "number")
    }

    fn tables() -> Vec<NodeTable> {
        vec![
            NodeTable::new("v0.2.0", vec![
                BuiltinNode::metadata_only(add_def("v0.1.0").description("Sum of two numbers")),
                BuiltinNode::metadata_only(
                    NodeDefinition::new("core.math.negate", "Negate", "v0.2.0", "math")
                        .input("value", "number")
                        .output("result", "number"),
                ),
            ]),
            NodeTable::new("v0.1.0", vec![BuiltinNode::new(add_def("v0.1.0"), add, add_code)]),
        ]
    }

    #[test]
    fn test_load_version_resolves_highest_at_or_below() {
        let source = NodeDefinitionSource::from_tables(tables()).unwrap();
        assert_eq!(source.versions(), vec!["v0.1.0", "v0.2.0"]);

        let v1 = source.load_version("v0.1.0");
        assert_eq!(v1.len(), 1);
        assert_eq!(v1["core.math.add"].description, "");

        let v2 = source.load_version("v0.2.0");
        assert_eq!(v2.len(), 2);
        assert_eq!(v2["core.math.add"].description, "Sum of two numbers");

        let future = source.load_version("v9.0.0");
        assert_eq!(future.len(), 2);
    }

    #[test]
    fn test_load_version_degrades_to_empty() {
        let source = NodeDefinitionSource::from_tables(tables()).unwrap();
        assert!(source.load_version("v0.0.1").is_empty());
        assert!(source.load_version("not-a-version").is_empty());
    }

    #[test]
    fn test_implementation_inherited_from_earlier_version() {
        let source = NodeDefinitionSource::from_tables(tables()).unwrap();
        let implementation = source.get_implementation("core.math.add").unwrap();

        let inputs = PortValues::from([("a".to_string(), json!(2)), ("b".to_string(), json!(3))]);
        let outputs = implementation.run(&inputs, &NodeConfig::new()).unwrap();
        assert_eq!(outputs["result"], json!(5.0));
    }

    #[test]
    fn test_unknown_and_unimplemented_nodes() {
        let source = NodeDefinitionSource::from_tables(tables()).unwrap();
        assert!(matches!(
            source.get_implementation("unknown.node.id"),
            Err(RegistryError::UnknownNode(_))
        ));
        assert!(matches!(
            source.get_implementation("core.math.negate"),
            Err(RegistryError::NoImplementation(_))
        ));
        // Not introduced yet at v0.1.0
        assert!(matches!(
            source.implementation_at("core.math.negate", &SchemaVersion::new(0, 1, 0)),
            Err(RegistryError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_port_shape_conflict_rejected() {
        let mut tables = tables();
        tables.push(NodeTable::new(
            "v0.3.0",
            vec![BuiltinNode::metadata_only(add_def("v0.1.0").input("c", "number"))],
        ));
        assert!(matches!(
            NodeDefinitionSource::from_tables(tables),
            Err(RegistryError::NodeShapeConflict { .. })
        ));
    }

    #[test]
    fn test_duplicate_within_version_rejected() {
        let tables = vec![NodeTable::new(
            "v0.1.0",
            vec![
                BuiltinNode::metadata_only(add_def("v0.1.0")),
                BuiltinNode::metadata_only(add_def("v0.1.0")),
            ],
        )];
        assert!(matches!(
            NodeDefinitionSource::from_tables(tables),
            Err(RegistryError::DuplicateDefinition { .. })
        ));
    }
}
