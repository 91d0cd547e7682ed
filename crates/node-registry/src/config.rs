//! Registry configuration
//!
//! A small JSON document naming the schema version to load and where the
//! node directories, plugins and category overrides live.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// Default values for registry configuration
pub mod defaults {
    /// Schema version loaded when none is configured
    pub const SCHEMA_VERSION: &str = "v0.2.0";
    /// Directory whose subdirectories name the node categories
    pub const NODES_DIR: &str = "nodes";
    /// Root of the plugin scan
    pub const PLUGINS_DIR: &str = "plugins";
    /// Category override document
    pub const CATEGORY_REGISTRY: &str = "nodes/registry.json";
    /// Environment variable naming the configuration file
    pub const CONFIG_ENV: &str = "NODE_REGISTRY_CONFIG";
    /// Configuration file name looked up in the working directory
    pub const CONFIG_FILE: &str = "registry.json";
}

/// Full registry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Version tag of the type and node tables to load
    pub schema_version: String,
    /// Node category directories
    pub nodes_dir: PathBuf,
    /// Plugin units
    pub plugins_dir: PathBuf,
    /// Category override document
    pub category_registry: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            schema_version: defaults::SCHEMA_VERSION.to_string(),
            nodes_dir: PathBuf::from(defaults::NODES_DIR),
            plugins_dir: PathBuf::from(defaults::PLUGINS_DIR),
            category_registry: PathBuf::from(defaults::CATEGORY_REGISTRY),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from disk
    ///
    /// A missing file yields the defaults. Relative paths in the document
    /// are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| RegistryError::load(path, e))?;
        let config: Self =
            serde_json::from_str(&contents).map_err(|e| RegistryError::load(path, e))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolve_paths(base))
    }

    /// Make every relative path absolute with respect to `base`
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        for path in [
            &mut self.nodes_dir,
            &mut self.plugins_dir,
            &mut self.category_registry,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    /// Save configuration to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = RegistryConfig::load(&dir.path().join("registry.json")).unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(config.schema_version, "v0.2.0");
    }

    #[test]
    fn test_partial_document_and_relative_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, r#"{"schema_version": "v0.1.0", "plugins_dir": "extra"}"#).unwrap();

        let config = RegistryConfig::load(&path).unwrap();
        assert_eq!(config.schema_version, "v0.1.0");
        assert_eq!(config.plugins_dir, dir.path().join("extra"));
        assert_eq!(config.nodes_dir, dir.path().join("nodes"));
        assert_eq!(config.category_registry, dir.path().join("nodes/registry.json"));
    }

    #[test]
    fn test_absolute_paths_untouched() {
        let dir = TempDir::new().unwrap();
        let config = RegistryConfig {
            plugins_dir: dir.path().join("plugins"),
            ..Default::default()
        }
        .resolve_paths(Path::new("/elsewhere"));
        assert_eq!(config.plugins_dir, dir.path().join("plugins"));
        assert_eq!(config.nodes_dir, Path::new("/elsewhere/nodes"));
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            RegistryConfig::load(&path),
            Err(RegistryError::ConfigurationLoad { .. })
        ));
    }

    #[test]
    fn test_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/registry.json");
        let config = RegistryConfig::default();
        config.save(&path).unwrap();
        assert!(path.exists());
        let loaded = RegistryConfig::load(&path).unwrap();
        assert_eq!(loaded.schema_version, config.schema_version);
    }
}
