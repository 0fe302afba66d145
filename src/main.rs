//! `penguins-server`: serves the read and predict endpoints over HTTP.

use std::sync::Arc;

use anyhow::{Context, Result};
use penguins::common::config::AppCfg;
use penguins::common::log;
use penguins::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = AppCfg::load().context("invalid configuration")?;
    log::init(&cfg).context("cannot initialise logging")?;

    let state = AppState::from_config(&cfg).context("cannot build application state")?;
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("cannot bind {}", cfg.bind_addr))?;
    tracing::info!(
        addr = %listener.local_addr()?,
        db = %cfg.db_path.display(),
        models = %cfg.model_dir.display(),
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for shutdown signal");
    }
}
