//! Bounded execution of blocking work (SQLite reads, artifact file loads).
//!
//! The work runs on tokio's blocking pool so async request handlers never
//! stall; the caller stops waiting once `limit` elapses. The blocking thread
//! itself is not interrupted and releases its resources when it finishes.

use std::time::Duration;

use tokio::task;
use tokio::time;

use crate::common::error::{PenguinError, PenguinResult};

/// Run `job` off the async executor, failing with `Timeout` after `limit`.
pub async fn run_bounded<T, F>(
    operation: &'static str,
    limit: Duration,
    job: F,
) -> PenguinResult<T>
where
    F: FnOnce() -> PenguinResult<T> + Send + 'static,
    T: Send + 'static,
{
    match time::timeout(limit, task::spawn_blocking(job)).await {
        Ok(Ok(result)) => result,
        Ok(Err(join)) => Err(PenguinError::storage(
            operation,
            format!("blocking task aborted: {join}"),
        )),
        Err(_) => {
            let limit_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(operation, limit_ms, "blocking call timed out");
            Err(PenguinError::timeout(operation, limit))
        }
    }
}
