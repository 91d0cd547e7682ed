//! Built-in type tables, one per schema version
//!
//! Tables are append-only: a new version adds types and never changes the
//! base of an existing one.

use super::{ConverterSpec, JsonKind, TypeDefinition, TypeTable, ValidatorSpec, ANY_TYPE};

pub const V0_1_0: &str = "v0.1.0";
pub const V0_2_0: &str = "v0.2.0";

/// Every built-in type table, oldest first
pub fn type_tables() -> Vec<TypeTable> {
    vec![v0_1_0(), v0_2_0()]
}

fn kind(expected: JsonKind) -> ValidatorSpec {
    ValidatorSpec::JsonKind { expected }
}

fn v0_1_0() -> TypeTable {
    TypeTable::new(
        V0_1_0,
        vec![
            TypeDefinition::new(ANY_TYPE, "Any", V0_1_0),
            TypeDefinition::new("number", "Number", V0_1_0)
                .validator(kind(JsonKind::Number))
                .converter("to_string", ConverterSpec::to("string")),
            TypeDefinition::new("integer", "Integer", V0_1_0)
                .extends("number")
                .validator(kind(JsonKind::Integer))
                .converter("to_float", ConverterSpec::to("float")),
            TypeDefinition::new("float", "Float", V0_1_0)
                .extends("number")
                .converter("to_integer", ConverterSpec::lossy("integer")),
            TypeDefinition::new("string", "String", V0_1_0)
                .validator(kind(JsonKind::String))
                .converter("to_number", ConverterSpec::lossy("number")),
            TypeDefinition::new("boolean", "Boolean", V0_1_0)
                .validator(kind(JsonKind::Boolean))
                .converter("to_string", ConverterSpec::to("string")),
            TypeDefinition::new("list", "List", V0_1_0).validator(kind(JsonKind::Array)),
            TypeDefinition::new("object", "Object", V0_1_0).validator(kind(JsonKind::Object)),
        ],
    )
}

fn v0_2_0() -> TypeTable {
    TypeTable::new(
        V0_2_0,
        vec![
            TypeDefinition::new("text", "Text", V0_2_0).extends("string"),
            TypeDefinition::new("path", "File Path", V0_2_0)
                .extends("string")
                .validator(ValidatorSpec::Length {
                    min: Some(1),
                    max: None,
                }),
            TypeDefinition::new("json", "JSON", V0_2_0)
                .converter("to_string", ConverterSpec::to("string")),
            TypeDefinition::new("percentage", "Percentage", V0_2_0)
                .extends("float")
                .validator(ValidatorSpec::Range {
                    min: Some(0.0),
                    max: Some(100.0),
                }),
        ],
    )
}
