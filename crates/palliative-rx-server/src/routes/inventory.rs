//! Pharmacy stock and demand forecasts.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use palliative_rx_core::models::{InventoryItem, InventoryUpdate, NewInventoryItem};
use palliative_rx_core::DemandForecast;
use serde::Deserialize;

use super::{created, deleted};
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/pharmacies/:id/inventory",
            get(list_inventory).post(add_inventory),
        )
        .route(
            "/pharmacies/:id/inventory/:medicine_id",
            put(update_inventory).delete(delete_inventory),
        )
        .route("/pharmacies/:id/demand-alerts", get(demand_alerts))
}

/// Narrows a medicine-level change to one batch.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchParams {
    batch_number: Option<String>,
}

async fn list_inventory(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<String>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    Ok(Json(
        state
            .with_db(move |db| db.list_inventory(&pharmacy_id))
            .await?,
    ))
}

async fn add_inventory(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<String>,
    ApiJson(input): ApiJson<NewInventoryItem>,
) -> Result<(StatusCode, Json<InventoryItem>), ApiError> {
    let item = state
        .with_db(move |db| db.add_inventory(&pharmacy_id, &input))
        .await?;
    Ok(created(item))
}

async fn update_inventory(
    State(state): State<AppState>,
    Path((pharmacy_id, medicine_id)): Path<(String, String)>,
    Query(params): Query<BatchParams>,
    ApiJson(update): ApiJson<InventoryUpdate>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    let updated = state
        .with_db(move |db| {
            db.update_inventory(
                &pharmacy_id,
                &medicine_id,
                params.batch_number.as_deref(),
                &update,
            )
        })
        .await?;
    if updated.is_empty() {
        return Err(ApiError::not_found("Inventory item"));
    }
    Ok(Json(updated))
}

async fn delete_inventory(
    State(state): State<AppState>,
    Path((pharmacy_id, medicine_id)): Path<(String, String)>,
    Query(params): Query<BatchParams>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .with_db(move |db| {
            db.delete_inventory(&pharmacy_id, &medicine_id, params.batch_number.as_deref())
        })
        .await?;
    deleted(removed > 0, "Inventory item")
}

async fn demand_alerts(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<String>,
) -> Result<Json<Vec<DemandForecast>>, ApiError> {
    Ok(Json(
        state
            .with_db(move |db| db.demand_alerts(&pharmacy_id))
            .await?,
    ))
}
