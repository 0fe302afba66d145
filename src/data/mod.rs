//! Data domain: filtered, parameterised reads of the penguin dataset.

pub mod domain;
pub mod query;
pub mod repo_sqlite;
pub mod service;

pub use domain::{DataRepo, FilterSpec, FilterValue, Record, Table};
pub use query::SelectQuery;
pub use repo_sqlite::SqliteDataRepo;
pub use service::DataService;
