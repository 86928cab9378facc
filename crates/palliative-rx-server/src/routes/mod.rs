//! REST endpoints, mounted under `/api`.

mod adherence;
mod inventory;
mod medicines;
mod notifications;
mod prescriptions;
mod profiles;
mod restock;
mod users;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use palliative_rx_core::ScanReport;

use crate::error::ApiError;
use crate::state::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .merge(profiles::router())
        .merge(medicines::router())
        .merge(inventory::router())
        .merge(prescriptions::router())
        .merge(restock::router())
        .merge(notifications::router())
        .merge(adherence::router())
        .route("/inventory-scan", post(run_inventory_scan))
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Run one monitor pass on demand.
async fn run_inventory_scan(State(state): State<AppState>) -> Result<Json<ScanReport>, ApiError> {
    let monitor = state.monitor().clone();
    let report = state.with_db(move |db| monitor.run(db)).await?;
    Ok(Json(report))
}

/// 204 when a delete removed something, 404 otherwise.
pub(crate) fn deleted(removed: bool, what: &str) -> Result<StatusCode, ApiError> {
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(what))
    }
}

pub(crate) fn found<T>(value: Option<T>, what: &str) -> Result<Json<T>, ApiError> {
    value.map(Json).ok_or_else(|| ApiError::not_found(what))
}

pub(crate) fn created<T>(value: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(value))
}
