//! Dose adherence logs.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use palliative_rx_core::models::{AdherenceLog, AdherenceLogDetail, NewAdherenceLog};

use super::created;
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/adherence-logs", get(list_logs))
        .route(
            "/patients/:id/adherence-logs",
            get(list_patient_logs).post(add_log),
        )
}

async fn list_logs(
    State(state): State<AppState>,
) -> Result<Json<Vec<AdherenceLogDetail>>, ApiError> {
    Ok(Json(state.with_db(|db| db.list_adherence_logs()).await?))
}

async fn list_patient_logs(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<AdherenceLogDetail>>, ApiError> {
    let logs = state
        .with_db(move |db| {
            if db.get_patient(&patient_id)?.is_none() {
                return Ok(None);
            }
            db.list_patient_adherence_logs(&patient_id).map(Some)
        })
        .await?;
    logs.map(Json).ok_or_else(|| ApiError::not_found("Patient"))
}

async fn add_log(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    ApiJson(input): ApiJson<NewAdherenceLog>,
) -> Result<(StatusCode, Json<AdherenceLog>), ApiError> {
    let log = state
        .with_db(move |db| db.add_adherence_log(&patient_id, &input))
        .await?;
    Ok(created(log))
}
