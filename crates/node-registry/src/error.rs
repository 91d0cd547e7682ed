//! Error types for the node registry

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using RegistryError
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Opaque error produced by a node or plugin implementation.
///
/// The registry never inspects these; they are handed back to the caller
/// tagged with the node identifier that produced them.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while building or querying the registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A configuration, registry or table document could not be loaded
    #[error("Failed to load '{path}': {reason}")]
    ConfigurationLoad { path: PathBuf, reason: String },

    /// Node identifier not present in any source
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// Node exists but its version table supplies no implementation
    #[error("Node '{0}' has no implementation")]
    NoImplementation(String),

    /// Type identifier not present in the type catalog
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// Port name not declared on a node
    #[error("Node '{node_id}' has no port '{port}'")]
    UnknownPort { node_id: String, port: String },

    /// A discovered plugin unit failed validation
    #[error("Plugin '{unit}' rejected: {reason}")]
    PluginValidation { unit: String, reason: String },

    /// A later version table re-declared a type with a different base
    #[error("Type '{type_id}' redefined with a different shape in {version}")]
    TypeShapeConflict { type_id: String, version: String },

    /// A type referenced a base that was not defined before it
    #[error("Type '{type_id}' references undefined base type '{base_type}'")]
    MissingBaseType { type_id: String, base_type: String },

    /// A later version table re-declared a node with different ports
    #[error("Node '{node_id}' redefined with a different port shape in {version}")]
    NodeShapeConflict { node_id: String, version: String },

    /// The same identifier appears twice within one version
    #[error("'{id}' is defined more than once in {version}")]
    DuplicateDefinition { id: String, version: String },

    /// A version tag could not be parsed
    #[error("Invalid version tag '{tag}': {reason}")]
    InvalidVersion { tag: String, reason: String },

    /// A value failed one of its type's validators
    #[error("Value rejected by type '{type_id}': {reason}")]
    ValueRejected { type_id: String, reason: String },

    /// A node or plugin implementation failed
    #[error("Node '{node_id}' failed: {source}")]
    Implementation {
        node_id: String,
        #[source]
        source: BoxError,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Create a configuration load error for a path
    pub fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ConfigurationLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a plugin validation error
    pub fn plugin(unit: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PluginValidation {
            unit: unit.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means the identifier simply isn't registered
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownNode(_) | Self::UnknownType(_))
    }
}
