//! REST API over the tariff catalog and the billing engine.
//!
//! Provides three endpoints:
//! - `GET /tariffs`: id, name and notes of every tariff
//! - `GET /tariffs/{id}`: one full tariff definition
//! - `POST /bill`: computes a bill for `{ tariff_id, readings }`

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::tariff::TariffCatalog;

pub use types::{BillRequest, ErrorResponse};

/// Immutable application state shared across all request handlers.
///
/// Built once at startup and wrapped in `Arc`; the catalog is read-only so
/// no locks are needed.
pub struct AppState {
    pub catalog: TariffCatalog,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/tariffs", get(handlers::list_tariffs))
        .route("/tariffs/{id}", get(handlers::get_tariff))
        .route("/bill", post(handlers::compute))
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind to `addr` or the
/// server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
