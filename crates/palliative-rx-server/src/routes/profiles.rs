//! Doctor, patient, pharmacy and distributor profiles.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use palliative_rx_core::models::{
    Distributor, DistributorUpdate, Doctor, DoctorUpdate, NewDistributor, NewDoctor, NewPatient,
    NewPharmacy, Patient, PatientUpdate, Pharmacy, PharmacyUpdate,
};

use super::{created, deleted, found};
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/doctors", get(list_doctors).post(create_doctor))
        .route(
            "/doctors/:id",
            get(get_doctor).put(update_doctor).delete(delete_doctor),
        )
        .route("/patients", get(list_patients).post(create_patient))
        .route(
            "/patients/:id",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
        .route("/pharmacies", get(list_pharmacies).post(create_pharmacy))
        .route(
            "/pharmacies/:id",
            get(get_pharmacy).put(update_pharmacy).delete(delete_pharmacy),
        )
        .route("/distributors", get(list_distributors).post(create_distributor))
        .route(
            "/distributors/:id",
            get(get_distributor)
                .put(update_distributor)
                .delete(delete_distributor),
        )
}

// =============================================================================
// Doctors
// =============================================================================

async fn list_doctors(State(state): State<AppState>) -> Result<Json<Vec<Doctor>>, ApiError> {
    Ok(Json(state.with_db(|db| db.list_doctors()).await?))
}

async fn create_doctor(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewDoctor>,
) -> Result<(StatusCode, Json<Doctor>), ApiError> {
    Ok(created(state.with_db(move |db| db.create_doctor(&input)).await?))
}

async fn get_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Doctor>, ApiError> {
    found(state.with_db(move |db| db.get_doctor(&id)).await?, "Doctor")
}

async fn update_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<DoctorUpdate>,
) -> Result<Json<Doctor>, ApiError> {
    found(state.with_db(move |db| db.update_doctor(&id, update)).await?, "Doctor")
}

async fn delete_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(state.with_db(move |db| db.delete_doctor(&id)).await?, "Doctor")
}

// =============================================================================
// Patients
// =============================================================================

async fn list_patients(State(state): State<AppState>) -> Result<Json<Vec<Patient>>, ApiError> {
    Ok(Json(state.with_db(|db| db.list_patients()).await?))
}

async fn create_patient(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewPatient>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    Ok(created(state.with_db(move |db| db.create_patient(&input)).await?))
}

async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    found(state.with_db(move |db| db.get_patient(&id)).await?, "Patient")
}

async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<PatientUpdate>,
) -> Result<Json<Patient>, ApiError> {
    found(state.with_db(move |db| db.update_patient(&id, update)).await?, "Patient")
}

async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(state.with_db(move |db| db.delete_patient(&id)).await?, "Patient")
}

// =============================================================================
// Pharmacies
// =============================================================================

async fn list_pharmacies(State(state): State<AppState>) -> Result<Json<Vec<Pharmacy>>, ApiError> {
    Ok(Json(state.with_db(|db| db.list_pharmacies()).await?))
}

async fn create_pharmacy(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewPharmacy>,
) -> Result<(StatusCode, Json<Pharmacy>), ApiError> {
    Ok(created(state.with_db(move |db| db.create_pharmacy(&input)).await?))
}

async fn get_pharmacy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Pharmacy>, ApiError> {
    found(state.with_db(move |db| db.get_pharmacy(&id)).await?, "Pharmacy")
}

async fn update_pharmacy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<PharmacyUpdate>,
) -> Result<Json<Pharmacy>, ApiError> {
    found(state.with_db(move |db| db.update_pharmacy(&id, update)).await?, "Pharmacy")
}

async fn delete_pharmacy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(state.with_db(move |db| db.delete_pharmacy(&id)).await?, "Pharmacy")
}

// =============================================================================
// Distributors
// =============================================================================

async fn list_distributors(
    State(state): State<AppState>,
) -> Result<Json<Vec<Distributor>>, ApiError> {
    Ok(Json(state.with_db(|db| db.list_distributors()).await?))
}

async fn create_distributor(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewDistributor>,
) -> Result<(StatusCode, Json<Distributor>), ApiError> {
    Ok(created(state.with_db(move |db| db.create_distributor(&input)).await?))
}

async fn get_distributor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Distributor>, ApiError> {
    found(state.with_db(move |db| db.get_distributor(&id)).await?, "Distributor")
}

async fn update_distributor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<DistributorUpdate>,
) -> Result<Json<Distributor>, ApiError> {
    found(
        state.with_db(move |db| db.update_distributor(&id, update)).await?,
        "Distributor",
    )
}

async fn delete_distributor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(state.with_db(move |db| db.delete_distributor(&id)).await?, "Distributor")
}
