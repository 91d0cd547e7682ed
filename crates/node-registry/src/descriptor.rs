//! Node definitions and their implementations
//!
//! A [`NodeDefinition`] is pure metadata: ports, category, config schema.
//! Behavior lives next to it in a [`NodeImplementation`], which the version
//! tables supply out of band. Tables are collected at link time:
//!
//! ```ignore
//! inventory::submit!(node_registry::NodeTableFn {
//!     version: "v0.1.0",
//!     table: math_nodes_v0_1_0,
//! });
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::BoxError;

/// Port name → type identifier
pub type PortMap = BTreeMap<String, String>;

/// Concrete values keyed by port name
pub type PortValues = HashMap<String, serde_json::Value>;

/// Concrete configuration keyed by config field name
pub type NodeConfig = HashMap<String, serde_json::Value>;

/// Signature of a run function: `(inputs, config) → outputs`
pub type RunFn = fn(&PortValues, &NodeConfig) -> std::result::Result<PortValues, BoxError>;

/// Signature of a code generator: `config → source fragment`
pub type CodegenFn = fn(&NodeConfig) -> std::result::Result<String, BoxError>;

/// Constraint on a single config key of a built-in node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigConstraint {
    /// One of a fixed list of options
    Choice {
        options: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
    /// A number, optionally bounded
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<f64>,
    },
    /// Free text
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
    /// On/off switch
    Boolean {
        #[serde(default)]
        default: bool,
    },
    /// Any JSON value
    Value {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<serde_json::Value>,
    },
}

/// Definition of a built-in node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Unique identifier (e.g., "core.math.add")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Version tag in which this node first appeared
    pub introduced_in: String,
    /// Category label for UI grouping
    pub category: String,
    /// Description of what the node does
    pub description: String,
    /// Input ports
    pub inputs: PortMap,
    /// Output ports
    pub outputs: PortMap,
    /// Config key → constraint
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config_schema: BTreeMap<String, ConfigConstraint>,
}

impl NodeDefinition {
    /// Create a definition with no ports
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        introduced_in: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            introduced_in: introduced_in.into(),
            category: category.into(),
            description: String::new(),
            inputs: PortMap::new(),
            outputs: PortMap::new(),
            config_schema: BTreeMap::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add an input port
    pub fn input(mut self, port: impl Into<String>, type_id: impl Into<String>) -> Self {
        self.inputs.insert(port.into(), type_id.into());
        self
    }

    /// Add an output port
    pub fn output(mut self, port: impl Into<String>, type_id: impl Into<String>) -> Self {
        self.outputs.insert(port.into(), type_id.into());
        self
    }

    /// Add a config key
    pub fn config(mut self, key: impl Into<String>, constraint: ConfigConstraint) -> Self {
        self.config_schema.insert(key.into(), constraint);
        self
    }

    /// Port shape is what connections depend on; it must stay stable
    /// across versions.
    pub fn same_shape(&self, other: &NodeDefinition) -> bool {
        self.inputs == other.inputs && self.outputs == other.outputs
    }
}

/// Behavior of a node: execute and emit code
///
/// Implementations must not hold shared mutable state across calls; the
/// dispatcher invokes them concurrently without any isolation.
pub trait NodeImplementation: Send + Sync {
    /// Execute with concrete inputs and config
    fn run(
        &self,
        inputs: &PortValues,
        config: &NodeConfig,
    ) -> std::result::Result<PortValues, BoxError>;

    /// Emit a source fragment equivalent to `run` for this config
    fn generate_code(&self, config: &NodeConfig) -> std::result::Result<String, BoxError>;
}

/// Implementation backed by plain function pointers
#[derive(Clone, Copy)]
pub struct FnImplementation {
    run: RunFn,
    codegen: Option<CodegenFn>,
}

impl FnImplementation {
    pub fn new(run: RunFn) -> Self {
        Self { run, codegen: None }
    }

    pub fn with_codegen(mut self, codegen: CodegenFn) -> Self {
        self.codegen = Some(codegen);
        self
    }
}

impl fmt::Debug for FnImplementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnImplementation")
            .field("codegen", &self.codegen.is_some())
            .finish()
    }
}

impl NodeImplementation for FnImplementation {
    fn run(
        &self,
        inputs: &PortValues,
        config: &NodeConfig,
    ) -> std::result::Result<PortValues, BoxError> {
        (self.run)(inputs, config)
    }

    fn generate_code(&self, config: &NodeConfig) -> std::result::Result<String, BoxError> {
        match self.codegen {
            Some(codegen) => codegen(config),
            None => Err("code generation is not supported".into()),
        }
    }
}

/// One row of a version table: the definition plus optional behavior
#[derive(Clone)]
pub struct BuiltinNode {
    pub definition: NodeDefinition,
    pub implementation: Option<Arc<dyn NodeImplementation>>,
}

impl BuiltinNode {
    /// A node with run and codegen functions
    pub fn new(definition: NodeDefinition, run: RunFn, codegen: CodegenFn) -> Self {
        Self {
            definition,
            implementation: Some(Arc::new(FnImplementation::new(run).with_codegen(codegen))),
        }
    }

    /// A node with metadata only; behavior is inherited from an earlier
    /// version of the same id, if one exists
    pub fn metadata_only(definition: NodeDefinition) -> Self {
        Self {
            definition,
            implementation: None,
        }
    }

    /// A node with a custom implementation
    pub fn with_implementation(
        definition: NodeDefinition,
        implementation: Arc<dyn NodeImplementation>,
    ) -> Self {
        Self {
            definition,
            implementation: Some(implementation),
        }
    }
}

impl fmt::Debug for BuiltinNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinNode")
            .field("id", &self.definition.id)
            .field("implemented", &self.implementation.is_some())
            .finish()
    }
}

/// All nodes contributed to one schema version
#[derive(Debug, Clone)]
pub struct NodeTable {
    pub version: String,
    pub nodes: Vec<BuiltinNode>,
}

impl NodeTable {
    pub fn new(version: impl Into<String>, nodes: Vec<BuiltinNode>) -> Self {
        Self {
            version: version.into(),
            nodes,
        }
    }
}

/// Link-time registration of a node table
///
/// Several submissions may share a version (e.g., one per category
/// module); they are merged when the source is built.
pub struct NodeTableFn {
    /// Version tag the table belongs to
    pub version: &'static str,
    /// Builds the rows of the table
    pub table: fn() -> Vec<BuiltinNode>,
}

inventory::collect!(NodeTableFn);
