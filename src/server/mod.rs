//! HTTP control surface
//!
//! A thin axum layer over the use cases: handlers parse input, call one use
//! case operation and map the result onto a status code.

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

use std::future::Future;
use std::io;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

pub use error::{ApiError, OutcomeResponse};
pub use state::AppState;

/// Build the `/api` router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/devices", get(routes::list_devices))
        .route("/api/active", get(routes::active_device))
        .route("/api/volume", post(routes::set_volume))
        .route("/api/device/select", post(routes::select_device))
        .route("/api/bluetooth/connect", post(routes::connect))
        .route("/api/bluetooth/pair", post(routes::pair))
        .route("/api/bluetooth/reconnect", post(routes::reconnect))
        .route("/api/bluetooth/scan", get(routes::scan))
        .route("/api/health", get(routes::health))
        .with_state(state)
}

/// Serve on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("server stopped");
    Ok(())
}
