//! Node Registry - type and node catalogs for the workflow editor
//!
//! This crate decides which node types the editor offers, which ports may
//! be wired together, and where a node's behavior comes from. It covers:
//!
//! - A versioned type catalog with single inheritance and a universal `any`
//! - Built-in node tables, one per schema version, collected at link time
//! - Plugins discovered from a directory of JSON manifests
//! - A unified catalog grouped by category
//! - Dispatch of `execute` / `generate_code` to the owning source
//!
//! # Architecture
//!
//! Everything is built once by [`CatalogRuntime::initialize`] and is
//! read-only afterwards:
//!
//! - `TypeCatalog`: merged type tables, compatibility and value checks
//! - `NodeDefinitionSource`: append-only node tables keyed by version
//! - `PluginSource`: discovered plugin units, normalized to one capability
//! - `NodeCatalog`: both sources, indexed by id and by category
//! - `ExecutionDispatcher`: routes calls through the catalog
//!
//! # Example
//!
//! ```ignore
//! use node_registry::{CatalogRuntime, NodeConfig, PortValues, RegistryConfig};
//!
//! let config = RegistryConfig::load("registry.json".as_ref())?;
//! let runtime = CatalogRuntime::initialize(&config)?;
//!
//! let ok = runtime.types().is_compatible("integer", "number");
//! let outputs = runtime
//!     .dispatcher()
//!     .execute("core.math.add", &PortValues::new(), &NodeConfig::new())?;
//! ```

pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod nodes;
pub mod plugin;
pub mod runtime;
pub mod types;
pub mod version;

// Re-export key types
pub use catalog::{
    list_directories, resolve_category, CatalogEntry, CategoryOverride, CategoryRegistry,
    EntryOrigin, NodeCatalog, UNCATEGORIZED,
};
pub use config::RegistryConfig;
pub use descriptor::{
    BuiltinNode, CodegenFn, ConfigConstraint, FnImplementation, NodeConfig, NodeDefinition,
    NodeImplementation, NodeTable, NodeTableFn, PortMap, PortValues, RunFn,
};
pub use dispatch::ExecutionDispatcher;
pub use error::{BoxError, RegistryError, Result};
pub use nodes::NodeDefinitionSource;
pub use plugin::{
    plugin_id, ConfigField, ConfigFieldKind, PluginBase, PluginCapability, PluginClass,
    PluginDefinition, PluginFn, PluginHandlers, PluginManifest, PluginMetadata, PluginRejection,
    PluginSource,
};
pub use runtime::CatalogRuntime;
pub use types::{TypeCatalog, TypeDefinition, TypeTable, ValidatorSpec, ANY_TYPE};
pub use version::{SchemaVersion, VersionedStore};
