//! Translation of a `FilterSpec` into parameterised SQL.
//!
//! Only static identifiers from `Table` reach the statement text; every
//! caller value travels as a positional parameter.

use crate::common::error::PenguinResult;

use super::domain::{FilterSpec, FilterValue, Table};

/// A ready-to-execute select: statement text plus its bound values.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectQuery {
    pub table: Table,
    pub sql: String,
    pub params: Vec<FilterValue>,
}

impl SelectQuery {
    /// Build `SELECT * FROM <table>` with one `column = ?N` per present filter.
    pub fn build(table: Table, filters: &FilterSpec) -> PenguinResult<Self> {
        // Absent entries are validated too: a typo should fail loudly even
        // when the caller passed no value for it.
        for (column, _) in filters.entries() {
            table.column(column)?;
        }

        let mut sql = format!("SELECT * FROM {}", table.name());
        let mut params = Vec::new();
        let mut predicates = Vec::new();

        for (column, value) in filters.present() {
            let column = table.column(column)?;
            params.push(value.clone());
            predicates.push(format!("{column} = ?{}", params.len()));
        }

        if !predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicates.join(" AND "));
        }

        Ok(Self { table, sql, params })
    }
}
