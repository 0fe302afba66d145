//! Explicit mapping from external model ids to artifact keys.
//!
//! Loaded once at startup from a JSON object such as
//! `{"101": "v1", "102": "v2"}` and never recomputed.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::common::error::{PenguinError, PenguinResult};

use super::domain::{ArtifactKey, ModelId};

#[derive(Clone, Debug, Default)]
pub struct VersionTable {
    entries: BTreeMap<ModelId, ArtifactKey>,
}

impl VersionTable {
    pub fn from_entries<I, K>(entries: I) -> PenguinResult<Self>
    where
        I: IntoIterator<Item = (i64, K)>,
        K: Into<String>,
    {
        let mut table = BTreeMap::new();
        for (id, key) in entries {
            if table.insert(ModelId(id), ArtifactKey::new(key)?).is_some() {
                return Err(PenguinError::invalid(format!(
                    "model id {id} is mapped twice"
                )));
            }
        }
        Ok(Self { entries: table })
    }

    /// Parse a JSON object of id to key. A repeated id is rejected.
    pub fn from_json(raw: &str) -> PenguinResult<Self> {
        let RawEntries(parsed) = serde_json::from_str(raw)
            .map_err(|err| PenguinError::invalid(format!("versioning table: {err}")))?;

        let mut pairs = Vec::with_capacity(parsed.len());
        for (id, key) in parsed {
            let id: i64 = id.trim().parse().map_err(|_| {
                PenguinError::invalid(format!("versioning table: `{id}` is not an integer id"))
            })?;
            let key = key.as_str().map(str::to_owned).ok_or_else(|| {
                PenguinError::invalid(format!("versioning table: key for {id} must be a string"))
            })?;
            pairs.push((id, key));
        }
        Self::from_entries(pairs)
    }

    pub fn load(path: &Path) -> PenguinResult<Self> {
        let raw = fs::read_to_string(path).map_err(|err| {
            PenguinError::storage(
                "models.versions",
                format!("cannot read {}: {err}", path.display()),
            )
        })?;
        Self::from_json(&raw)
    }

    pub fn lookup(&self, id: ModelId) -> Option<&ArtifactKey> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Object members in document order, repeats included.
struct RawEntries(Vec<(String, serde_json::Value)>);

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping model ids to artifact keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawEntries, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_id_to_key_map() {
        let table = VersionTable::from_json(r#"{"101": "v1", "102": "v2"}"#).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(ModelId(101)).unwrap().as_str(), "v1");
        assert_eq!(table.lookup(ModelId(102)).unwrap().as_str(), "v2");
        assert!(table.lookup(ModelId(1)).is_none());
        assert!(table.lookup(ModelId(999)).is_none());
    }

    #[test]
    fn rejects_malformed_tables() {
        assert!(VersionTable::from_json(r#"{"abc": "v1"}"#).is_err());
        assert!(VersionTable::from_json(r#"{"101": 1}"#).is_err());
        assert!(VersionTable::from_json(r#"{"101": "../v1"}"#).is_err());
        assert!(VersionTable::from_json(r#"["v1"]"#).is_err());
        assert!(VersionTable::from_entries([(101, "v1"), (101, "v2")]).is_err());
    }

    #[test]
    fn repeated_ids_in_json_are_rejected() {
        let err = VersionTable::from_json(r#"{"101": "v1", "101": "v2"}"#).unwrap_err();
        assert_eq!(err.code(), crate::common::error::PenguinCode::InvalidInput);
        assert!(err.to_string().contains("mapped twice"));

        // " 101" and "101" name the same id once trimmed.
        assert!(VersionTable::from_json(r#"{"101": "v1", " 101": "v1"}"#).is_err());
    }

    #[test]
    fn missing_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = VersionTable::load(&dir.path().join("versions.json")).unwrap_err();
        assert_eq!(err.code(), crate::common::error::PenguinCode::Storage);
    }

    #[test]
    fn shipped_table_parses() {
        let table = VersionTable::from_json(include_str!("../../models/versions.json")).unwrap();
        assert_eq!(table.lookup(ModelId(101)).unwrap().as_str(), "v1");
    }
}
