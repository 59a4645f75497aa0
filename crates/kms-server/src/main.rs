//! `kms-server` — HTTP facade over the master-key KMS.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Build the master-key backend from `MASTER_KEY`.
//! 4. Build the Axum router and serve until Ctrl-C.

mod config;
mod server;
mod telemetry;

use std::sync::Arc;

use anyhow::Result;
use kms::Kms;
use tracing::info;

use config::Config;
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(&cfg.log_level)?;

    // -----------------------------------------------------------------------
    // 3. KMS backend
    // -----------------------------------------------------------------------
    let kms = cfg.build_kms()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        default_key_id = kms.default_key_id(),
        auth_type = %kms.info().auth_type,
        "kms-server starting"
    );

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let router = server::router::build(AppState::new(Arc::new(kms)));

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    // TODO: terminate TLS in-process once certificate provisioning is settled.
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("kms-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
