//! Port data types
//!
//! Types are plain string identifiers (`"number"`, `"integer"`, ...) with an
//! optional `base_type` forming an inheritance chain. The universal type
//! `"any"` sits implicitly above every registered type.

pub mod builtin;
mod catalog;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use catalog::TypeCatalog;

/// Identifier of the universal type
pub const ANY_TYPE: &str = "any";

/// Definition of a port data type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Unique type identifier (e.g., "integer")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Version tag in which this type first appeared
    pub introduced_in: String,
    /// Immediate supertype, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    /// Validators applied to values of this type, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<ValidatorSpec>,
    /// Named conversions to other types
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub converters: BTreeMap<String, ConverterSpec>,
}

impl TypeDefinition {
    /// Create a type with no base, validators or converters
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        introduced_in: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            introduced_in: introduced_in.into(),
            base_type: None,
            validators: Vec::new(),
            converters: BTreeMap::new(),
        }
    }

    /// Set the base type
    pub fn extends(mut self, base_type: impl Into<String>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }

    /// Append a validator
    pub fn validator(mut self, validator: ValidatorSpec) -> Self {
        self.validators.push(validator);
        self
    }

    /// Add a named converter
    pub fn converter(mut self, name: impl Into<String>, converter: ConverterSpec) -> Self {
        self.converters.insert(name.into(), converter);
        self
    }

    /// Two declarations share a shape when they sit at the same place in
    /// the inheritance lattice.
    pub fn same_shape(&self, other: &TypeDefinition) -> bool {
        self.base_type == other.base_type
    }
}

/// JSON value kinds checked by [`ValidatorSpec::JsonKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonKind {
    Number,
    Integer,
    String,
    Boolean,
    Array,
    Object,
    Null,
}

impl JsonKind {
    fn matches(&self, value: &serde_json::Value) -> bool {
        match self {
            JsonKind::Number => value.is_number(),
            JsonKind::Integer => value.is_i64() || value.is_u64(),
            JsonKind::String => value.is_string(),
            JsonKind::Boolean => value.is_boolean(),
            JsonKind::Array => value.is_array(),
            JsonKind::Object => value.is_object(),
            JsonKind::Null => value.is_null(),
        }
    }
}

/// Validator descriptor attached to a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidatorSpec {
    /// Value must be of the given JSON kind
    JsonKind { expected: JsonKind },
    /// Numeric value must fall within the bounds (inclusive)
    Range {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    /// String or array length must fall within the bounds (inclusive)
    Length {
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
    },
    /// Value must equal one of the listed values
    OneOf { values: Vec<serde_json::Value> },
}

impl ValidatorSpec {
    /// Check a value, returning a human-readable reason on failure
    pub fn check(&self, value: &serde_json::Value) -> std::result::Result<(), String> {
        match self {
            ValidatorSpec::JsonKind { expected } => {
                if expected.matches(value) {
                    Ok(())
                } else {
                    Err(format!("expected {:?} value, got {}", expected, value))
                }
            }
            ValidatorSpec::Range { min, max } => {
                let number = value
                    .as_f64()
                    .ok_or_else(|| format!("expected a number, got {}", value))?;
                if min.is_some_and(|m| number < m) || max.is_some_and(|m| number > m) {
                    return Err(format!(
                        "{} is outside the range [{}, {}]",
                        number,
                        min.map_or("-inf".to_string(), |m| m.to_string()),
                        max.map_or("inf".to_string(), |m| m.to_string()),
                    ));
                }
                Ok(())
            }
            ValidatorSpec::Length { min, max } => {
                let len = match value {
                    serde_json::Value::String(s) => s.chars().count(),
                    serde_json::Value::Array(items) => items.len(),
                    other => return Err(format!("{} has no length", other)),
                };
                if min.is_some_and(|m| len < m) || max.is_some_and(|m| len > m) {
                    return Err(format!("length {} is out of bounds", len));
                }
                Ok(())
            }
            ValidatorSpec::OneOf { values } => {
                if values.contains(value) {
                    Ok(())
                } else {
                    Err(format!("{} is not an allowed value", value))
                }
            }
        }
    }
}

/// Converter descriptor: how a value of this type maps onto another type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterSpec {
    /// Target type identifier
    pub target: String,
    /// Whether information can be lost
    #[serde(default)]
    pub lossy: bool,
}

impl ConverterSpec {
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            lossy: false,
        }
    }

    pub fn lossy(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            lossy: true,
        }
    }
}

/// All types introduced by one schema version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeTable {
    /// Version tag (e.g., "v0.1.0")
    pub version: String,
    /// Definitions, in declaration order (bases before subtypes)
    pub types: Vec<TypeDefinition>,
}

impl TypeTable {
    pub fn new(version: impl Into<String>, types: Vec<TypeDefinition>) -> Self {
        Self {
            version: version.into(),
            types,
        }
    }
}
