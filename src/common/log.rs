//! Logging setup: JSON lines on stderr by default, plain text on request.

use tracing_subscriber::EnvFilter;

use crate::common::config::{AppCfg, LogFormat};
use crate::common::error::{PenguinError, PenguinResult};

/// Install the global tracing subscriber described by `cfg`.
///
/// Fails if the filter directive does not parse or a subscriber is already set.
pub fn init(cfg: &AppCfg) -> PenguinResult<()> {
    let filter = EnvFilter::try_new(&cfg.log_filter)
        .map_err(|err| PenguinError::invalid(format!("PENGUINS_LOG: {err}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match cfg.log_format {
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
        LogFormat::Text => builder.with_target(false).try_init(),
    };
    installed.map_err(|err| PenguinError::invalid(format!("logging already initialised: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::PenguinCode;

    #[test]
    fn bad_filter_is_rejected_before_install() {
        let cfg = AppCfg::from_lookup(|key| match key {
            "PENGUINS_LOG" => Some("penguins=loud".to_string()),
            _ => None,
        })
        .unwrap();
        let err = init(&cfg).unwrap_err();
        assert_eq!(err.code(), PenguinCode::InvalidInput);
        assert!(err.to_string().contains("PENGUINS_LOG"));
    }
}
