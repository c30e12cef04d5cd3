//! PR Reviewer Service - reviewer assignment for pull requests.
//!
//! Assigns reviewers from the author's team when a pull request is created,
//! swaps reviewers on request and freezes the reviewer set on merge. The
//! engine lives in [`services::assignment`]; [`commands`] exposes it and the
//! team, user and statistics services over HTTP.

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

use config::Config;
use db::Database;
use error::AppError;
use services::http_server;

/// Run the service until Ctrl-C or SIGTERM.
///
/// Opens the database, serves HTTP, then on a shutdown signal stops
/// accepting connections and waits up to the configured grace period for
/// in-flight requests before closing the pool.
pub async fn run(config: Config) -> Result<(), AppError> {
    log::info!("[app] Opening database at {}", config.database_path.display());
    let pool = db::initialize_with(&config.database_path, &config.pool_settings()).await?;
    let database = Database::new(pool);

    let server = http_server::start_server(
        config.socket_addr()?,
        database.clone(),
        config.request_timeout(),
    )
    .await?;

    shutdown_signal().await;
    server.shutdown();

    match tokio::time::timeout(config.shutdown_timeout(), server.wait()).await {
        Ok(result) => result?,
        Err(_) => log::warn!(
            "[app] In-flight requests did not finish within {}s",
            config.shutdown_timeout_secs
        ),
    }

    database.close().await;
    log::info!("[app] Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("[app] Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("[app] Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => log::info!("[app] Received Ctrl-C"),
        _ = terminate => log::info!("[app] Received SIGTERM"),
    }
}
