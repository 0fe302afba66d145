//! SQLite-backed repository for the penguin dataset.
//!
//! Each call opens its own read-only connection and drops it when the call
//! returns, whichever path it returns through.
//!
//! TODO: Keep a small pool of read-only connections if per-call opens show up in latency.

use std::path::PathBuf;
use std::time::Duration;

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags};
use serde_json::{Number, Value};

use crate::common::error::{PenguinError, PenguinResult};

use super::domain::{DataRepo, FilterValue, Record};
use super::query::SelectQuery;

const COMPONENT: &str = "data.sqlite";

/// Read-only repository over a SQLite file.
pub struct SqliteDataRepo {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteDataRepo {
    pub fn new(path: impl Into<PathBuf>, busy_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            busy_timeout,
        }
    }

    fn open(&self) -> PenguinResult<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection = Connection::open_with_flags(&self.path, flags).map_err(|err| {
            PenguinError::storage(
                COMPONENT,
                format!("cannot open {}: {err}", self.path.display()),
            )
        })?;
        connection
            .busy_timeout(self.busy_timeout)
            .map_err(db_error)?;
        Ok(connection)
    }
}

impl DataRepo for SqliteDataRepo {
    fn select(&self, query: &SelectQuery) -> PenguinResult<Vec<Record>> {
        let connection = self.open()?;
        let mut stmt = connection.prepare(&query.sql).map_err(db_error)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_owned)
            .collect();

        let mut rows = stmt
            .query(params_from_iter(query.params.iter()))
            .map_err(db_error)?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().map_err(db_error)? {
            let mut record = Record::new();
            for (idx, column) in columns.iter().enumerate() {
                let value = row.get_ref(idx).map_err(db_error)?;
                record.insert(column.clone(), to_json(value));
            }
            records.push(record);
        }

        tracing::debug!(
            table = query.table.name(),
            rows = records.len(),
            "select finished"
        );
        Ok(records)
    }
}

impl ToSql for FilterValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            FilterValue::Int(value) => ToSqlOutput::from(*value),
            FilterValue::Real(value) => ToSqlOutput::from(*value),
            FilterValue::Text(value) => ToSqlOutput::from(value.as_str()),
        })
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::from(v),
        ValueRef::Real(v) => Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    }
}

fn db_error(err: rusqlite::Error) -> PenguinError {
    PenguinError::storage(COMPONENT, err.to_string())
}
