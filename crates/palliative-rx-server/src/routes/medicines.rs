//! Medicine catalogue.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use palliative_rx_core::models::{Medicine, MedicineUpdate, NewMedicine};
use serde::Deserialize;

use super::{created, deleted, found};
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/medicines", get(list_medicines).post(create_medicine))
        .route(
            "/medicines/:id",
            get(get_medicine).put(update_medicine).delete(delete_medicine),
        )
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

/// Full catalog, or fuzzy name matches with scores when `q` is given.
async fn list_medicines(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    match params.q.filter(|q| !q.trim().is_empty()) {
        Some(query) => {
            let matches = state.with_db(move |db| db.search_medicines(&query)).await?;
            Ok(Json(matches).into_response())
        }
        None => {
            let medicines = state.with_db(|db| db.list_medicines()).await?;
            Ok(Json(medicines).into_response())
        }
    }
}

async fn create_medicine(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewMedicine>,
) -> Result<(StatusCode, Json<Medicine>), ApiError> {
    Ok(created(state.with_db(move |db| db.create_medicine(&input)).await?))
}

async fn get_medicine(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Medicine>, ApiError> {
    found(state.with_db(move |db| db.get_medicine(&id)).await?, "Medicine")
}

async fn update_medicine(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<MedicineUpdate>,
) -> Result<Json<Medicine>, ApiError> {
    found(state.with_db(move |db| db.update_medicine(&id, update)).await?, "Medicine")
}

async fn delete_medicine(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(state.with_db(move |db| db.delete_medicine(&id)).await?, "Medicine")
}
