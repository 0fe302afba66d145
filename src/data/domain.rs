//! Core dataset definitions and contracts.
//!
//! Records are read-only from this crate's point of view and are handed back
//! to callers as loosely typed column → value maps.

use serde_json::{Map, Value};

use crate::common::error::{PenguinError, PenguinResult};

use super::query::SelectQuery;

/// One materialised row, keyed by column name in column order.
pub type Record = Map<String, Value>;

/// Tables exposed by the store. Table names never come from callers.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Table {
    Penguins,
    Model,
    Status,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Penguins => "PENGUINS",
            Table::Model => "MODEL",
            Table::Status => "STATUS",
        }
    }

    /// Columns that may appear in a `FilterSpec` for this table.
    pub fn filter_columns(&self) -> &'static [&'static str] {
        match self {
            Table::Penguins => &["island_id", "status_id", "species", "model_id"],
            Table::Model => &["model_id"],
            Table::Status => &["status_id"],
        }
    }

    /// Resolve a caller-supplied column name to the static identifier.
    pub fn column(&self, name: &str) -> PenguinResult<&'static str> {
        self.filter_columns()
            .iter()
            .copied()
            .find(|column| *column == name)
            .ok_or_else(|| {
                PenguinError::invalid(format!(
                    "`{name}` is not a filterable column of {}",
                    self.name()
                ))
            })
    }
}

/// Scalar value a filter compares against.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    Int(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Real(value)
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

/// Optional equality constraints, kept in insertion order.
///
/// Entries whose value is `None` are carried but do not constrain the query,
/// so an all-`None` spec selects the full table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterSpec {
    entries: Vec<(String, Option<FilterValue>)>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of an optional constraint.
    pub fn with<V>(mut self, column: &str, value: Option<V>) -> Self
    where
        V: Into<FilterValue>,
    {
        self.entries.push((column.to_string(), value.map(Into::into)));
        self
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&FilterValue>)> {
        self.entries
            .iter()
            .map(|(column, value)| (column.as_str(), value.as_ref()))
    }

    /// Entries that actually constrain the query.
    pub fn present(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries
            .iter()
            .filter_map(|(column, value)| value.as_ref().map(|v| (column.as_str(), v)))
    }

    pub fn is_unconstrained(&self) -> bool {
        self.present().next().is_none()
    }
}

/// Repository contract for read access to the relational store.
pub trait DataRepo: Send + Sync {
    /// Execute a prepared select and materialise every row in store order.
    fn select(&self, query: &SelectQuery) -> PenguinResult<Vec<Record>>;
}
