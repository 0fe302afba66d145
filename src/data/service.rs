//! Service layer answering filtered reads against the store.

use std::sync::Arc;
use std::time::Duration;

use crate::common::blocking;
use crate::common::error::PenguinResult;

use super::domain::{DataRepo, FilterSpec, Record, Table};
use super::query::SelectQuery;

/// Filtered, time-bounded reads over a `DataRepo`.
#[derive(Clone)]
pub struct DataService {
    repo: Arc<dyn DataRepo>,
    timeout: Duration,
}

impl DataService {
    pub fn new(repo: Arc<dyn DataRepo>, timeout: Duration) -> Self {
        Self { repo, timeout }
    }

    /// Rows of `table` matching every present filter, in store order.
    #[tracing::instrument(skip(self, table, filters), fields(table = table.name()))]
    pub async fn query(&self, table: Table, filters: &FilterSpec) -> PenguinResult<Vec<Record>> {
        let query = SelectQuery::build(table, filters)?;
        tracing::debug!(sql = %query.sql, params = query.params.len(), "built select");

        let repo = Arc::clone(&self.repo);
        blocking::run_bounded("data.query", self.timeout, move || repo.select(&query)).await
    }
}
