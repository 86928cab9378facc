//! Restock orders and their status lifecycle.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use palliative_rx_core::models::{NewRestockOrder, RestockOrder, RestockOrderUpdate};

use super::{created, deleted, found};
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/restock-orders",
            get(list_orders).post(create_order),
        )
        .route(
            "/restock-orders/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
}

async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<RestockOrder>>, ApiError> {
    Ok(Json(state.with_db(|db| db.list_restock_orders()).await?))
}

async fn create_order(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewRestockOrder>,
) -> Result<(StatusCode, Json<RestockOrder>), ApiError> {
    Ok(created(
        state
            .with_db(move |db| db.create_restock_order(&input))
            .await?,
    ))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RestockOrder>, ApiError> {
    found(
        state.with_db(move |db| db.get_restock_order(&id)).await?,
        "Restock order",
    )
}

/// Status changes may credit inventory and notify the pharmacy.
async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<RestockOrderUpdate>,
) -> Result<Json<RestockOrder>, ApiError> {
    found(
        state
            .with_db(move |db| db.update_restock_order(&id, update))
            .await?,
        "Restock order",
    )
}

async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(
        state.with_db(move |db| db.delete_restock_order(&id)).await?,
        "Restock order",
    )
}
