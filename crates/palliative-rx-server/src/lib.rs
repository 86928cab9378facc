//! HTTP surface for palliative-rx.
//!
//! Wraps a [`palliative_rx_core::Database`] in an axum router: JSON REST
//! endpoints under `/api`, a health check, the static frontend, and a
//! background [`worker`] that runs the inventory monitor on an interval.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod worker;

use std::path::Path;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use error::{ApiError, ApiJson};
pub use state::AppState;

/// API routes plus health check, without the static frontend.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        .nest("/api", routes::api_router())
        // Middleware (applied in reverse order)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Full application: [`create_router`] with `static_dir` served for every
/// other path.
pub fn app(state: AppState, static_dir: &Path) -> Router {
    create_router(state).fallback_service(ServeDir::new(static_dir))
}
