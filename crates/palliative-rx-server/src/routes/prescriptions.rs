//! Prescriptions, their medicine lines, and dispensing.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get},
    Router,
};
use palliative_rx_core::models::{
    NewPrescription, NewPrescriptionFill, NewPrescriptionMedicine, Prescription,
    PrescriptionDetail, PrescriptionFill, PrescriptionMedicine, PrescriptionUpdate,
};

use super::{created, deleted, found};
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/prescriptions",
            get(list_prescriptions).post(create_prescription),
        )
        .route(
            "/prescriptions/:id",
            get(get_prescription)
                .put(update_prescription)
                .delete(delete_prescription),
        )
        .route(
            "/prescriptions/:id/medicines",
            get(list_lines).post(add_line),
        )
        .route(
            "/prescriptions/:id/medicines/:medicine_id",
            delete(remove_line),
        )
        .route("/prescription-fills", get(list_fills).post(dispense))
        .route("/prescription-fills/:id", get(get_fill))
}

async fn list_prescriptions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Prescription>>, ApiError> {
    Ok(Json(state.with_db(|db| db.list_prescriptions()).await?))
}

async fn create_prescription(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewPrescription>,
) -> Result<(StatusCode, Json<PrescriptionDetail>), ApiError> {
    let detail = state
        .with_db(move |db| db.create_prescription(&input))
        .await?;
    tracing::info!(
        prescription = %detail.prescription.id,
        lines = detail.medicines.len(),
        "Created prescription"
    );
    Ok(created(detail))
}

async fn get_prescription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PrescriptionDetail>, ApiError> {
    found(
        state.with_db(move |db| db.get_prescription_detail(&id)).await?,
        "Prescription",
    )
}

async fn update_prescription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<PrescriptionUpdate>,
) -> Result<Json<Prescription>, ApiError> {
    found(
        state
            .with_db(move |db| db.update_prescription(&id, update))
            .await?,
        "Prescription",
    )
}

async fn delete_prescription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(
        state.with_db(move |db| db.delete_prescription(&id)).await?,
        "Prescription",
    )
}

async fn list_lines(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PrescriptionMedicine>>, ApiError> {
    found(
        state
            .with_db(move |db| db.list_prescription_medicines(&id))
            .await?,
        "Prescription",
    )
}

async fn add_line(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<NewPrescriptionMedicine>,
) -> Result<(StatusCode, Json<PrescriptionMedicine>), ApiError> {
    let line = state
        .with_db(move |db| db.add_prescription_medicine(&id, &input))
        .await?;
    Ok(created(line))
}

async fn remove_line(
    State(state): State<AppState>,
    Path((id, medicine_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .with_db(move |db| db.remove_prescription_medicine(&id, &medicine_id))
        .await?;
    deleted(removed > 0, "Prescription medicine")
}

async fn list_fills(
    State(state): State<AppState>,
) -> Result<Json<Vec<PrescriptionFill>>, ApiError> {
    Ok(Json(state.with_db(|db| db.list_prescription_fills()).await?))
}

/// Dispense stock against a prescription line.
async fn dispense(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewPrescriptionFill>,
) -> Result<(StatusCode, Json<PrescriptionFill>), ApiError> {
    let fill = state.with_db(move |db| db.dispense(&input)).await?;
    Ok(created(fill))
}

async fn get_fill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PrescriptionFill>, ApiError> {
    found(
        state.with_db(move |db| db.get_prescription_fill(&id)).await?,
        "Prescription fill",
    )
}
