//! Filesystem discovery of plugin units

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

use super::{PluginCapability, PluginDefinition, PluginHandlers, PluginManifest};
use crate::error::{RegistryError, Result};

/// Shared base unit; never a plugin itself
pub const BASE_UNIT: &str = "base.json";

/// A unit that failed validation
#[derive(Debug, Clone, Serialize)]
pub struct PluginRejection {
    pub unit: PathBuf,
    pub reason: String,
}

impl PluginRejection {
    pub fn into_error(self) -> RegistryError {
        RegistryError::plugin(self.unit.display().to_string(), self.reason)
    }
}

/// Plugins discovered under one root directory
#[derive(Default)]
pub struct PluginSource {
    /// Key → definition
    definitions: BTreeMap<String, PluginDefinition>,
    /// Plugin id → key
    ids: HashMap<String, String>,
    capabilities: HashMap<String, Arc<dyn PluginCapability>>,
    rejected: Vec<PluginRejection>,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map_or(false, |name| name.starts_with('_') || name.starts_with('.'))
}

fn is_unit(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry.file_name() != BASE_UNIT
        && entry.path().extension().map_or(false, |ext| ext == "json")
}

impl PluginSource {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scan `root` recursively and load every valid unit
    ///
    /// Invalid units are logged and listed in [`rejected`](Self::rejected);
    /// they never abort discovery. A missing root yields an empty source.
    pub fn discover(root: &Path, handlers: &PluginHandlers) -> Self {
        let mut source = Self::empty();

        if !root.is_dir() {
            log::warn!("Plugins directory {} not found", root.display());
            return source;
        }

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable plugin entry: {}", e);
                    continue;
                }
            };
            if !is_unit(&entry) {
                continue;
            }
            if let Err(reason) = source.load_unit(entry.path(), handlers) {
                let rejection = PluginRejection {
                    unit: entry.path().to_path_buf(),
                    reason,
                };
                log::warn!(
                    "Rejected plugin {}: {}",
                    rejection.unit.display(),
                    rejection.reason
                );
                source.rejected.push(rejection);
            }
        }

        log::info!(
            "Discovered {} plugins ({} rejected) in {}",
            source.definitions.len(),
            source.rejected.len(),
            root.display()
        );
        source
    }

    fn load_unit(&mut self, path: &Path, handlers: &PluginHandlers) -> std::result::Result<(), String> {
        let key = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .ok_or("unit has no file name")?;
        if self.definitions.contains_key(&key) {
            return Err(format!("duplicate plugin key '{}'", key));
        }

        let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        let manifest = PluginManifest::from_json(&content).map_err(|e| e.to_string())?;
        let (definition, capability) = manifest.normalize(&key, handlers)?;

        log::debug!("Loaded plugin {} from {}", definition.id, path.display());
        self.ids.insert(definition.id.clone(), key.clone());
        self.capabilities.insert(definition.id.clone(), capability);
        self.definitions.insert(key, definition);
        Ok(())
    }

    /// Valid definitions keyed by plugin key
    pub fn definitions(&self) -> &BTreeMap<String, PluginDefinition> {
        &self.definitions
    }

    /// Units that failed validation, in discovery order
    pub fn rejected(&self) -> &[PluginRejection] {
        &self.rejected
    }

    /// Definition by plugin id
    pub fn get(&self, plugin_id: &str) -> Option<&PluginDefinition> {
        self.ids
            .get(plugin_id)
            .and_then(|key| self.definitions.get(key))
    }

    /// Capability by plugin id
    pub fn capability(&self, plugin_id: &str) -> Result<Arc<dyn PluginCapability>> {
        self.capabilities
            .get(plugin_id)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownNode(plugin_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl fmt::Debug for PluginSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginSource")
            .field("plugins", &self.definitions.keys().collect::<Vec<_>>())
            .field("rejected", &self.rejected.len())
            .finish()
    }
}
