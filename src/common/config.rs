//! Runtime configuration loaded from the process environment.
//!
//! Every knob has a default so a bare `penguins-server` starts against the
//! conventional `db/` and `models/` layout.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::common::error::{PenguinError, PenguinResult};

/// Output format for log lines.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogFormat {
    Json,
    Text,
}

/// Snapshot of configuration values consumed by the core.
#[derive(Clone, Debug)]
pub struct AppCfg {
    pub db_path: PathBuf,
    pub model_dir: PathBuf,
    pub versions_path: PathBuf,
    pub bind_addr: String,
    pub query_timeout: Duration,
    pub load_timeout: Duration,
    pub cache_artifacts: bool,
    pub log_filter: String,
    pub log_format: LogFormat,
}

impl AppCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> PenguinResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> PenguinResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let log_format = match env_or("PENGUINS_LOG_FORMAT", "json").as_str() {
            "json" => LogFormat::Json,
            "text" => LogFormat::Text,
            other => {
                return Err(PenguinError::invalid(format!(
                    "PENGUINS_LOG_FORMAT must be `json` or `text`, got `{other}`"
                )))
            }
        };

        Ok(Self {
            db_path: PathBuf::from(env_or("PENGUINS_DB_PATH", "db/db_penguins.db")),
            model_dir: PathBuf::from(env_or("PENGUINS_MODEL_DIR", "models")),
            versions_path: PathBuf::from(env_or("PENGUINS_VERSIONS_PATH", "models/versions.json")),
            bind_addr: env_or("PENGUINS_BIND_ADDR", "127.0.0.1:8000"),
            query_timeout: parse_timeout(
                "PENGUINS_QUERY_TIMEOUT_MS",
                &env_or("PENGUINS_QUERY_TIMEOUT_MS", "5000"),
            )?,
            load_timeout: parse_timeout(
                "PENGUINS_LOAD_TIMEOUT_MS",
                &env_or("PENGUINS_LOAD_TIMEOUT_MS", "5000"),
            )?,
            cache_artifacts: parse_bool(
                "PENGUINS_CACHE_ARTIFACTS",
                &env_or("PENGUINS_CACHE_ARTIFACTS", "true"),
            )?,
            log_filter: env_or("PENGUINS_LOG", "info"),
            log_format,
        })
    }
}

fn parse_timeout(key: &str, raw: &str) -> PenguinResult<Duration> {
    let millis: u64 = raw
        .trim()
        .parse()
        .map_err(|_| PenguinError::invalid(format!("{key} must be an integer, got `{raw}`")))?;
    if millis == 0 {
        return Err(PenguinError::invalid(format!("{key} must be positive")));
    }
    Ok(Duration::from_millis(millis))
}

fn parse_bool(key: &str, raw: &str) -> PenguinResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(PenguinError::invalid(format!(
            "{key} must be a boolean, got `{raw}`"
        ))),
    }
}
