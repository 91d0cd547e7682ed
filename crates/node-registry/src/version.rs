//! Schema versions and the append-only versioned store
//!
//! Type and node tables are authored per schema version (`v0.1.0`,
//! `v0.2.0`, ...). Rather than keeping one full snapshot per version, every
//! definition is stored once under `(identifier, version)` and lookups
//! resolve the highest version at or below the requested one.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{RegistryError, Result};

/// A parsed schema version tag such as `v0.2.0`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion(semver::Version);

impl SchemaVersion {
    /// Parse a version tag, with or without the leading `v`
    pub fn parse(tag: &str) -> Result<Self> {
        let trimmed = tag.trim();
        let raw = trimmed.strip_prefix('v').unwrap_or(trimmed);
        semver::Version::parse(raw)
            .map(Self)
            .map_err(|e| RegistryError::InvalidVersion {
                tag: tag.to_string(),
                reason: e.to_string(),
            })
    }

    /// Create a version from its numeric parts
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }
}

impl FromStr for SchemaVersion {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Append-only store of definitions keyed by `(identifier, version)`
///
/// Entries are never replaced or removed. A definition introduced in one
/// version stays visible to every later version until a newer entry for the
/// same identifier shadows it.
#[derive(Debug, Clone)]
pub struct VersionedStore<T> {
    entries: BTreeMap<String, BTreeMap<SchemaVersion, T>>,
}

impl<T> VersionedStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Append an entry
    ///
    /// Returns `false` (and leaves the store untouched) if the identifier
    /// already has an entry for this exact version.
    pub fn insert(&mut self, id: impl Into<String>, version: SchemaVersion, value: T) -> bool {
        let history = self.entries.entry(id.into()).or_default();
        if history.contains_key(&version) {
            return false;
        }
        history.insert(version, value);
        true
    }

    /// Newest entry for an identifier, regardless of version
    pub fn latest(&self, id: &str) -> Option<&T> {
        self.entries
            .get(id)
            .and_then(|history| history.values().next_back())
    }

    /// Highest entry at or below `at`
    pub fn resolve(&self, id: &str, at: &SchemaVersion) -> Option<&T> {
        self.entries
            .get(id)
            .and_then(|history| history.range::<SchemaVersion, _>(..=at).next_back())
            .map(|(_, value)| value)
    }

    /// All entries for an identifier at or below `at`, newest first
    pub fn history_at<'a>(
        &'a self,
        id: &str,
        at: &'a SchemaVersion,
    ) -> impl Iterator<Item = (&'a SchemaVersion, &'a T)> + 'a {
        self.entries
            .get(id)
            .into_iter()
            .flat_map(move |history| history.range::<SchemaVersion, _>(..=at).rev())
    }

    /// Resolve every identifier visible at `at`
    pub fn resolve_all<'a>(
        &'a self,
        at: &'a SchemaVersion,
    ) -> impl Iterator<Item = (&'a str, &'a T)> + 'a {
        self.entries.iter().filter_map(move |(id, history)| {
            history
                .range::<SchemaVersion, _>(..=at)
                .next_back()
                .map(|(_, value)| (id.as_str(), value))
        })
    }

    /// Resolve every identifier to its newest entry
    pub fn latest_all(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().filter_map(|(id, history)| {
            history
                .values()
                .next_back()
                .map(|value| (id.as_str(), value))
        })
    }

    /// Whether any entry exists for the identifier
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of distinct identifiers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for VersionedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(tag: &str) -> SchemaVersion {
        SchemaVersion::parse(tag).unwrap()
    }

    #[test]
    fn test_parse_with_and_without_prefix() {
        assert_eq!(v("v0.2.0"), v("0.2.0"));
        assert_eq!(v("v0.2.0").to_string(), "v0.2.0");
        assert!(v("v0.10.0") > v("v0.2.0"));
    }

    #[test]
    fn test_parse_invalid_tag() {
        let err = SchemaVersion::parse("latest").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidVersion { .. }));
    }

    #[test]
    fn test_resolve_picks_highest_at_or_below() {
        let mut store = VersionedStore::new();
        assert!(store.insert("add", v("v0.1.0"), "first"));
        assert!(store.insert("add", v("v0.3.0"), "third"));

        assert_eq!(store.resolve("add", &v("v0.1.0")), Some(&"first"));
        assert_eq!(store.resolve("add", &v("v0.2.0")), Some(&"first"));
        assert_eq!(store.resolve("add", &v("v0.3.0")), Some(&"third"));
        assert_eq!(store.resolve("add", &v("v0.0.1")), None);
        assert_eq!(store.latest("add"), Some(&"third"));
    }

    #[test]
    fn test_insert_is_append_only() {
        let mut store = VersionedStore::new();
        assert!(store.insert("add", v("v0.1.0"), 1));
        assert!(!store.insert("add", v("v0.1.0"), 2));
        assert_eq!(store.latest("add"), Some(&1));
    }

    #[test]
    fn test_resolve_all_hides_future_entries() {
        let mut store = VersionedStore::new();
        store.insert("a", v("v0.1.0"), 1);
        store.insert("b", v("v0.2.0"), 2);

        let at_v1 = v("v0.1.0");
        let visible: Vec<_> = store.resolve_all(&at_v1).collect();
        assert_eq!(visible, vec![("a", &1)]);
        assert_eq!(store.latest_all().count(), 2);
    }

    #[test]
    fn test_history_newest_first() {
        let mut store = VersionedStore::new();
        store.insert("a", v("v0.1.0"), 1);
        store.insert("a", v("v0.2.0"), 2);
        store.insert("a", v("v0.3.0"), 3);

        let at = v("v0.2.5");
        let values: Vec<_> = store.history_at("a", &at).map(|(_, x)| *x).collect();
        assert_eq!(values, vec![2, 1]);
    }
}
