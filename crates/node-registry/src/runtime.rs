//! Build-once composition of every catalog
//!
//! All startup I/O happens here. The result is immutable and cheap to
//! clone; every part is shared behind an `Arc`.

use std::sync::Arc;

use crate::catalog::{list_directories, CategoryRegistry, NodeCatalog};
use crate::config::RegistryConfig;
use crate::dispatch::ExecutionDispatcher;
use crate::error::Result;
use crate::nodes::NodeDefinitionSource;
use crate::plugin::{PluginHandlers, PluginSource};
use crate::types::{builtin, TypeCatalog, TypeTable};
use crate::version::SchemaVersion;

/// Catalogs and dispatcher for one schema version
#[derive(Clone)]
pub struct CatalogRuntime {
    schema_version: SchemaVersion,
    types: Arc<TypeCatalog>,
    nodes: Arc<NodeDefinitionSource>,
    plugins: Arc<PluginSource>,
    catalog: Arc<NodeCatalog>,
    dispatcher: ExecutionDispatcher,
}

impl CatalogRuntime {
    /// Build from the built-in tables and every linked plugin handler
    pub fn initialize(config: &RegistryConfig) -> Result<Self> {
        Self::from_sources(
            config,
            &builtin::type_tables(),
            NodeDefinitionSource::with_builtins()?,
            &PluginHandlers::collect(),
        )
    }

    /// Build from explicit sources
    pub fn from_sources(
        config: &RegistryConfig,
        type_tables: &[TypeTable],
        nodes: NodeDefinitionSource,
        handlers: &PluginHandlers,
    ) -> Result<Self> {
        let schema_version = SchemaVersion::parse(&config.schema_version)?;
        log::info!("Initializing node registry at {}", schema_version);

        let types = TypeCatalog::build_for_version(type_tables, &config.schema_version)?;
        let plugins = PluginSource::discover(&config.plugins_dir, handlers);
        let registry = CategoryRegistry::load(&config.category_registry);
        let directories = list_directories(&config.nodes_dir);

        let catalog = NodeCatalog::build(
            nodes.load_version(&config.schema_version).into_values(),
            plugins.definitions().values(),
            &registry,
            &directories,
        );

        let catalog = Arc::new(catalog);
        let nodes = Arc::new(nodes);
        let plugins = Arc::new(plugins);
        let dispatcher =
            ExecutionDispatcher::new(Arc::clone(&catalog), Arc::clone(&nodes), Arc::clone(&plugins))
                .with_schema_version(schema_version.clone());

        Ok(Self {
            schema_version,
            types: Arc::new(types),
            nodes,
            plugins,
            catalog,
            dispatcher,
        })
    }

    pub fn schema_version(&self) -> &SchemaVersion {
        &self.schema_version
    }

    pub fn types(&self) -> &TypeCatalog {
        &self.types
    }

    pub fn nodes(&self) -> &NodeDefinitionSource {
        &self.nodes
    }

    pub fn plugins(&self) -> &PluginSource {
        &self.plugins
    }

    pub fn catalog(&self) -> &NodeCatalog {
        &self.catalog
    }

    pub fn dispatcher(&self) -> &ExecutionDispatcher {
        &self.dispatcher
    }
}
