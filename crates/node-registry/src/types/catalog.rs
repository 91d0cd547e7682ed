//! Type catalog: merged, versioned type definitions with compatibility queries

use std::collections::BTreeMap;

use crate::error::{RegistryError, Result};
use crate::version::{SchemaVersion, VersionedStore};

use super::{TypeDefinition, TypeTable, ANY_TYPE};

/// Read-only catalog of port data types
///
/// Built once from one or more version tables. Every later table may add
/// types or re-declare an existing one with the same base (extending its
/// validators and converters); re-declaring with a different base is a
/// build error.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: BTreeMap<String, TypeDefinition>,
}

impl TypeCatalog {
    /// Merge every table into one namespace
    pub fn build(tables: &[TypeTable]) -> Result<Self> {
        Self::build_inner(tables, None)
    }

    /// Merge the tables whose version is at or below `version`
    pub fn build_for_version(tables: &[TypeTable], version: &str) -> Result<Self> {
        let limit = SchemaVersion::parse(version)?;
        Self::build_inner(tables, Some(&limit))
    }

    fn build_inner(tables: &[TypeTable], limit: Option<&SchemaVersion>) -> Result<Self> {
        let mut ordered = Vec::with_capacity(tables.len());
        for table in tables {
            ordered.push((SchemaVersion::parse(&table.version)?, table));
        }
        ordered.sort_by(|a, b| a.0.cmp(&b.0));

        let mut store: VersionedStore<TypeDefinition> = VersionedStore::new();
        for (version, table) in ordered {
            if limit.is_some_and(|limit| version > *limit) {
                continue;
            }
            for def in &table.types {
                let merged = Self::merge_declaration(&store, &version, def)?;
                if !store.insert(def.id.clone(), version.clone(), merged) {
                    return Err(RegistryError::DuplicateDefinition {
                        id: def.id.clone(),
                        version: version.to_string(),
                    });
                }
            }
        }

        let types: BTreeMap<String, TypeDefinition> = store
            .latest_all()
            .map(|(id, def)| (id.to_string(), def.clone()))
            .collect();

        log::debug!("Type catalog built with {} types", types.len());
        Ok(Self { types })
    }

    /// Validate one declaration against what is already stored and fold it
    /// into the previous declaration of the same id, if any.
    fn merge_declaration(
        store: &VersionedStore<TypeDefinition>,
        version: &SchemaVersion,
        def: &TypeDefinition,
    ) -> Result<TypeDefinition> {
        if let Some(base) = &def.base_type {
            // Bases must already exist, which rules out forward references
            // and therefore cycles.
            if base == &def.id || !store.contains(base) {
                return Err(RegistryError::MissingBaseType {
                    type_id: def.id.clone(),
                    base_type: base.clone(),
                });
            }
        }

        let Some(previous) = store.latest(&def.id) else {
            return Ok(def.clone());
        };

        if !previous.same_shape(def) {
            return Err(RegistryError::TypeShapeConflict {
                type_id: def.id.clone(),
                version: version.to_string(),
            });
        }

        let mut merged = previous.clone();
        merged.name = def.name.clone();
        for validator in &def.validators {
            if !merged.validators.contains(validator) {
                merged.validators.push(validator.clone());
            }
        }
        merged
            .converters
            .extend(def.converters.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(merged)
    }

    /// Look up a type definition
    pub fn get(&self, type_id: &str) -> Option<&TypeDefinition> {
        self.types.get(type_id)
    }

    /// Look up a type definition, failing with `UnknownType`
    pub fn require(&self, type_id: &str) -> Result<&TypeDefinition> {
        self.get(type_id)
            .ok_or_else(|| RegistryError::UnknownType(type_id.to_string()))
    }

    /// Whether a type is registered
    pub fn contains(&self, type_id: &str) -> bool {
        self.types.contains_key(type_id)
    }

    /// All registered type identifiers, sorted
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|s| s.as_str())
    }

    /// All registered definitions, sorted by id
    pub fn definitions(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The base chain of a type, nearest first
    ///
    /// Bounded by the catalog size so a cycle that slipped past the build
    /// checks cannot loop forever. Unknown types have an empty chain.
    pub fn ancestors(&self, type_id: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self
            .types
            .get(type_id)
            .and_then(|t| t.base_type.as_deref());

        while let Some(base) = current {
            if chain.len() >= self.types.len() {
                log::warn!("Base chain of type '{}' does not terminate", type_id);
                break;
            }
            chain.push(base);
            current = self.types.get(base).and_then(|t| t.base_type.as_deref());
        }
        chain
    }

    /// Check whether a value of `source` can flow into a port of `target`
    ///
    /// - identical identifiers are always compatible
    /// - an unregistered source is compatible with nothing else
    /// - every registered type is compatible with `any`
    /// - otherwise `target` must appear in the base chain of `source`
    pub fn is_compatible(&self, source: &str, target: &str) -> bool {
        if source == target {
            return true;
        }
        if !self.types.contains_key(source) {
            return false;
        }
        if target == ANY_TYPE {
            return true;
        }
        self.ancestors(source)
            .iter()
            .any(|ancestor| *ancestor == target)
    }

    /// Run the validators of a type and all of its ancestors against a value
    pub fn validate_value(&self, type_id: &str, value: &serde_json::Value) -> Result<()> {
        let def = self.require(type_id)?;
        let chain = std::iter::once(def)
            .chain(self.ancestors(type_id).into_iter().filter_map(|id| self.get(id)));

        for def in chain {
            for validator in &def.validators {
                validator
                    .check(value)
                    .map_err(|reason| RegistryError::ValueRejected {
                        type_id: type_id.to_string(),
                        reason,
                    })?;
            }
        }
        Ok(())
    }
}
