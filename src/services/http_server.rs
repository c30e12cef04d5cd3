//! HTTP server for the reviewer API.
//!
//! Wraps the API routes in the panic, timeout and tracing layers, binds the
//! listener and runs axum in a background task that stops when the handle's
//! cancellation token fires.

use crate::commands::{api_routes, ApiState};
use crate::db::Database;
use crate::error::AppError;
use axum::http::StatusCode;
use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the complete application router.
///
/// Requests running longer than `request_timeout` get a 408 and their
/// handler future is dropped, which rolls back any open transaction.
pub fn router(db: Database, request_timeout: Duration) -> Router {
    api_routes().with_state(ApiState { db }).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::new())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                request_timeout,
            )),
    )
}

/// Handle to a running server.
pub struct ServerHandle {
    cancel_token: CancellationToken,
    local_addr: SocketAddr,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listener is bound to (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and let in-flight requests finish.
    pub fn shutdown(&self) {
        log::info!("[http] Stopping server on {}", self.local_addr);
        self.cancel_token.cancel();
    }

    /// Wait for the server task to exit.
    pub async fn wait(self) -> Result<(), AppError> {
        self.task
            .await
            .map_err(|e| AppError::internal(format!("Server task failed: {}", e)))
    }
}

/// Bind `addr` and start serving in the background.
///
/// Returns an error if the address is unavailable.
pub async fn start_server(
    addr: SocketAddr,
    db: Database,
    request_timeout: Duration,
) -> Result<ServerHandle, AppError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| AppError::internal(format!("Failed to read local address: {}", e)))?;

    let app = router(db, request_timeout);

    let cancel_token = CancellationToken::new();
    let cancel_clone = cancel_token.clone();

    log::info!("[http] Server starting on http://{}", local_addr);

    let task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            cancel_clone.cancelled().await;
        });

        if let Err(e) = server.await {
            log::error!("[http] Server error: {}", e);
        }

        log::info!("[http] Server stopped");
    });

    Ok(ServerHandle {
        cancel_token,
        local_addr,
        task,
    })
}
