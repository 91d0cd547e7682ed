//! Plugins: user-supplied nodes discovered from the filesystem
//!
//! A plugin unit is a JSON manifest describing the node's metadata. Its
//! behavior comes from one of two authoring styles, both registered at
//! link time:
//!
//! - **Function style**: a [`PluginFn`] provides free `run` and
//!   `generate_code` functions; the manifest names it with `"handler"` and
//!   carries the full metadata block.
//! - **Class style**: a [`PluginClass`] builds a type implementing
//!   [`PluginBase`], which carries metadata defaults alongside its `run` and
//!   `generate_code` members; the manifest names it with `"class"` and may
//!   override any metadata field.
//!
//! Both styles normalize into a [`PluginDefinition`] plus an
//! `Arc<dyn PluginCapability>`; nothing downstream knows which was used.
//!
//! ```ignore
//! inventory::submit!(node_registry::PluginFn {
//!     handler: "arithmetic",
//!     run: Some(arithmetic_run),
//!     generate_code: Some(arithmetic_code),
//! });
//! ```

mod discovery;
mod manifest;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::descriptor::{CodegenFn, NodeConfig, PortMap, PortValues, RunFn};
use crate::error::BoxError;

pub use discovery::{PluginRejection, PluginSource, BASE_UNIT};
pub use manifest::PluginManifest;

/// Namespace prefix of plugin catalog identifiers
pub const PLUGIN_NAMESPACE: &str = "plugins";

/// Catalog identifier for a plugin: `plugins.<category>.<key>`, or
/// `plugins.<key>` when the category is empty
pub fn plugin_id(category: &str, key: &str) -> String {
    if category.is_empty() {
        format!("{}.{}", PLUGIN_NAMESPACE, key)
    } else {
        format!("{}.{}.{}", PLUGIN_NAMESPACE, category, key)
    }
}

/// Kind-specific constraints of a plugin config field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigFieldKind {
    /// Pick one of `options`
    Select {
        options: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<f64>,
    },
    Boolean {
        #[serde(default)]
        default: bool,
    },
}

/// One configurable field of a plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigField {
    /// Config key passed to `run` / `generate_code`
    pub name: String,
    /// Kind and kind-specific constraints
    #[serde(flatten)]
    pub kind: ConfigFieldKind,
    /// Label shown in the editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ConfigField {
    /// A select field with a default
    pub fn select(name: impl Into<String>, label: impl Into<String>, options: &[&str], default: &str) -> Self {
        Self {
            name: name.into(),
            kind: ConfigFieldKind::Select {
                options: options.iter().map(|o| o.to_string()).collect(),
                default: Some(default.to_string()),
            },
            label: Some(label.into()),
        }
    }
}

/// Normalized description of a discovered plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDefinition {
    /// Catalog identifier (see [`plugin_id`])
    pub id: String,
    /// Discovery key (the unit's file stem)
    pub key: String,
    pub name: String,
    pub category: String,
    pub description: String,
    /// Whether the editor may modify the unit
    pub editable: bool,
    /// Whether the unit was produced by a generator rather than hand-written
    pub generated: bool,
    pub inputs: PortMap,
    pub outputs: PortMap,
    pub config_fields: Vec<ConfigField>,
}

/// The metadata block of a plugin, every field optional
///
/// Manifests and class defaults both use this shape so one can be layered
/// over the other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<PortMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<PortMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_fields: Option<Vec<ConfigField>>,
}

impl PluginMetadata {
    /// Fill every unset field of `self` from `defaults`
    pub fn or(self, defaults: PluginMetadata) -> PluginMetadata {
        PluginMetadata {
            name: self.name.or(defaults.name),
            category: self.category.or(defaults.category),
            description: self.description.or(defaults.description),
            editable: self.editable.or(defaults.editable),
            generated: self.generated.or(defaults.generated),
            inputs: self.inputs.or(defaults.inputs),
            outputs: self.outputs.or(defaults.outputs),
            config_fields: self.config_fields.or(defaults.config_fields),
        }
    }
}

/// Normalized plugin behavior, whichever style authored it
pub trait PluginCapability: Send + Sync {
    fn run(
        &self,
        inputs: &PortValues,
        config: &NodeConfig,
    ) -> std::result::Result<PortValues, BoxError>;

    fn generate_code(&self, config: &NodeConfig) -> std::result::Result<String, BoxError>;
}

/// Common base of class-style plugins
pub trait PluginBase: Send + Sync {
    /// Metadata defaults; manifest fields take precedence
    fn metadata(&self) -> PluginMetadata;

    fn run(
        &self,
        inputs: &PortValues,
        config: &NodeConfig,
    ) -> std::result::Result<PortValues, BoxError>;

    fn generate_code(&self, _config: &NodeConfig) -> std::result::Result<String, BoxError> {
        Err("code generation is not supported".into())
    }
}

/// Link-time registration of a function-style plugin handler
///
/// `run` is optional so that a handler without a run capability can be
/// registered and then rejected at discovery time.
pub struct PluginFn {
    pub handler: &'static str,
    pub run: Option<RunFn>,
    pub generate_code: Option<CodegenFn>,
}

inventory::collect!(PluginFn);

/// Link-time registration of a class-style plugin
pub struct PluginClass {
    pub class: &'static str,
    pub create: fn() -> Box<dyn PluginBase>,
}

inventory::collect!(PluginClass);

#[derive(Clone, Copy)]
struct FunctionHandler {
    run: Option<RunFn>,
    generate_code: Option<CodegenFn>,
}

/// Lookup table of registered handlers and classes
#[derive(Default, Clone)]
pub struct PluginHandlers {
    functions: HashMap<String, FunctionHandler>,
    classes: HashMap<String, fn() -> Box<dyn PluginBase>>,
}

impl PluginHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every handler and class submitted via `inventory`
    pub fn collect() -> Self {
        let mut handlers = Self::new();
        for f in inventory::iter::<PluginFn> {
            handlers.register_function(f.handler, f.run, f.generate_code);
        }
        for c in inventory::iter::<PluginClass> {
            handlers.register_class(c.class, c.create);
        }
        handlers
    }

    pub fn register_function(
        &mut self,
        handler: impl Into<String>,
        run: Option<RunFn>,
        generate_code: Option<CodegenFn>,
    ) {
        self.functions
            .insert(handler.into(), FunctionHandler { run, generate_code });
    }

    pub fn register_class(&mut self, class: impl Into<String>, create: fn() -> Box<dyn PluginBase>) {
        self.classes.insert(class.into(), create);
    }

    pub fn has_function(&self, handler: &str) -> bool {
        self.functions.contains_key(handler)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    fn function(&self, handler: &str) -> Option<FunctionHandler> {
        self.functions.get(handler).copied()
    }

    fn class(&self, class: &str) -> Option<Box<dyn PluginBase>> {
        self.classes.get(class).map(|create| create())
    }
}

impl fmt::Debug for PluginHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut functions: Vec<_> = self.functions.keys().collect();
        functions.sort();
        let mut classes: Vec<_> = self.classes.keys().collect();
        classes.sort();
        f.debug_struct("PluginHandlers")
            .field("functions", &functions)
            .field("classes", &classes)
            .finish()
    }
}

/// Adapter for function-style plugins
struct FunctionPlugin {
    run: RunFn,
    generate_code: Option<CodegenFn>,
}

impl PluginCapability for FunctionPlugin {
    fn run(
        &self,
        inputs: &PortValues,
        config: &NodeConfig,
    ) -> std::result::Result<PortValues, BoxError> {
        (self.run)(inputs, config)
    }

    fn generate_code(&self, config: &NodeConfig) -> std::result::Result<String, BoxError> {
        match self.generate_code {
            Some(codegen) => codegen(config),
            None => Err("code generation is not supported".into()),
        }
    }
}

/// Adapter for class-style plugins
struct ClassPlugin {
    instance: Box<dyn PluginBase>,
}

impl PluginCapability for ClassPlugin {
    fn run(
        &self,
        inputs: &PortValues,
        config: &NodeConfig,
    ) -> std::result::Result<PortValues, BoxError> {
        self.instance.run(inputs, config)
    }

    fn generate_code(&self, config: &NodeConfig) -> std::result::Result<String, BoxError> {
        self.instance.generate_code(config)
    }
}
