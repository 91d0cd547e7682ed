//! Unified catalog of built-in nodes and plugins
//!
//! The catalog is what the editor's palette shows: every entry from both
//! sources, grouped by category. Categories come from three places, in
//! order:
//!
//! 1. an override in the category registry document;
//! 2. the second segment of a dotted identifier with more than two segments
//!    (`core.math.add` → `math`);
//! 3. [`UNCATEGORIZED`].
//!
//! Two-segment identifiers such as `core.constant` never take rule 2.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::descriptor::{NodeDefinition, PortMap};
use crate::error::{RegistryError, Result};
use crate::plugin::PluginDefinition;
use crate::types::TypeCatalog;

/// Fallback category
pub const UNCATEGORIZED: &str = "uncategorized";

/// Which source an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrigin {
    Builtin,
    Plugin,
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CatalogEntry {
    Node(NodeDefinition),
    Plugin(PluginDefinition),
}

impl CatalogEntry {
    pub fn id(&self) -> &str {
        match self {
            CatalogEntry::Node(def) => &def.id,
            CatalogEntry::Plugin(def) => &def.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CatalogEntry::Node(def) => &def.name,
            CatalogEntry::Plugin(def) => &def.name,
        }
    }

    pub fn origin(&self) -> EntryOrigin {
        match self {
            CatalogEntry::Node(_) => EntryOrigin::Builtin,
            CatalogEntry::Plugin(_) => EntryOrigin::Plugin,
        }
    }

    pub fn inputs(&self) -> &PortMap {
        match self {
            CatalogEntry::Node(def) => &def.inputs,
            CatalogEntry::Plugin(def) => &def.inputs,
        }
    }

    pub fn outputs(&self) -> &PortMap {
        match self {
            CatalogEntry::Node(def) => &def.outputs,
            CatalogEntry::Plugin(def) => &def.outputs,
        }
    }
}

/// A single category override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryOverride {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Optional document of per-identifier category overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryRegistry {
    #[serde(default)]
    pub nodes: Vec<CategoryOverride>,
}

impl CategoryRegistry {
    /// Load strictly; any failure is a `ConfigurationLoad` error
    pub fn try_load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| RegistryError::load(path, e))?;
        serde_json::from_str(&content).map_err(|e| RegistryError::load(path, e))
    }

    /// Load, degrading to an empty registry on any failure
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(registry) => {
                log::info!(
                    "Loaded {} category overrides from {}",
                    registry.nodes.len(),
                    path.display()
                );
                registry
            }
            Err(e) => {
                log::warn!("Using empty category registry: {}", e);
                Self::default()
            }
        }
    }

    /// Non-empty override for `id`, if any
    pub fn category_for(&self, id: &str) -> Option<&str> {
        self.nodes
            .iter()
            .find(|entry| entry.id == id)
            .and_then(|entry| entry.category.as_deref())
            .filter(|category| !category.is_empty())
    }
}

/// Second segment of an identifier with more than two dotted segments
pub fn prefix_category(id: &str) -> Option<&str> {
    let segments: Vec<&str> = id.split('.').collect();
    if segments.len() > 2 && !segments[1].is_empty() {
        Some(segments[1])
    } else {
        None
    }
}

/// Category for an identifier: registry, then prefix, then fallback
pub fn resolve_category(id: &str, registry: &CategoryRegistry) -> String {
    registry
        .category_for(id)
        .or_else(|| prefix_category(id))
        .unwrap_or(UNCATEGORIZED)
        .to_string()
}

/// Sorted names of the visible subdirectories of `path`
///
/// Names starting with `_` or `.` are skipped. An unreadable directory
/// yields an empty listing.
pub fn list_directories(path: &Path) -> Vec<String> {
    let read_dir = match std::fs::read_dir(path) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            log::warn!("Cannot list node directories in {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let mut names: Vec<String> = read_dir
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map_or(false, |t| t.is_dir()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| !name.starts_with('_') && !name.starts_with('.'))
        .collect();
    names.sort();
    names
}

/// Built-in nodes and plugins, indexed by id and by category
#[derive(Debug, Clone, Default)]
pub struct NodeCatalog {
    entries: HashMap<String, CatalogEntry>,
    categories: BTreeMap<String, Vec<CatalogEntry>>,
}

impl NodeCatalog {
    /// Compose the catalog
    ///
    /// A plugin whose id collides with a built-in node is skipped; the
    /// built-in wins. Every name in `directories` becomes a category, even
    /// when nothing resolves to it.
    pub fn build<'a>(
        nodes: impl IntoIterator<Item = NodeDefinition>,
        plugins: impl IntoIterator<Item = &'a PluginDefinition>,
        registry: &CategoryRegistry,
        directories: &[String],
    ) -> Self {
        let mut entries: HashMap<String, CatalogEntry> = HashMap::new();

        for node in nodes {
            entries.insert(node.id.clone(), CatalogEntry::Node(node));
        }
        for plugin in plugins {
            if entries.contains_key(&plugin.id) {
                log::warn!(
                    "Plugin '{}' collides with a built-in node and was skipped",
                    plugin.id
                );
                continue;
            }
            entries.insert(plugin.id.clone(), CatalogEntry::Plugin(plugin.clone()));
        }

        let mut categories: BTreeMap<String, Vec<CatalogEntry>> = directories
            .iter()
            .map(|name| (name.clone(), Vec::new()))
            .collect();
        for entry in entries.values() {
            categories
                .entry(resolve_category(entry.id(), registry))
                .or_default()
                .push(entry.clone());
        }
        for bucket in categories.values_mut() {
            bucket.sort_by(|a, b| a.id().cmp(b.id()));
        }

        log::info!(
            "Node catalog: {} entries in {} categories",
            entries.len(),
            categories.len()
        );
        Self {
            entries,
            categories,
        }
    }

    /// Category → entries ordered by id
    pub fn by_category(&self) -> &BTreeMap<String, Vec<CatalogEntry>> {
        &self.categories
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    pub fn require(&self, id: &str) -> Result<&CatalogEntry> {
        self.get(id)
            .ok_or_else(|| RegistryError::UnknownNode(id.to_string()))
    }

    /// Whether an output port may feed an input port
    pub fn can_connect(
        &self,
        types: &TypeCatalog,
        source_id: &str,
        source_port: &str,
        target_id: &str,
        target_port: &str,
    ) -> Result<bool> {
        let source = self.require(source_id)?;
        let target = self.require(target_id)?;

        let out_type = source
            .outputs()
            .get(source_port)
            .ok_or_else(|| RegistryError::UnknownPort {
                node_id: source_id.to_string(),
                port: source_port.to_string(),
            })?;
        let in_type = target
            .inputs()
            .get(target_port)
            .ok_or_else(|| RegistryError::UnknownPort {
                node_id: target_id.to_string(),
                port: target_port.to_string(),
            })?;

        Ok(types.is_compatible(out_type, in_type))
    }

    /// All ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
