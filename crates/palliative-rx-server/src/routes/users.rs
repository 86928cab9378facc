//! User accounts and login.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use palliative_rx_core::models::{Credentials, NewUser, User, UserUpdate};

use super::{created, deleted, found};
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/login", post(login))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.with_db(|db| db.list_users()).await?))
}

async fn create_user(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.with_db(move |db| db.create_user(&input)).await?;
    tracing::info!(user = %user.id, role = %user.role, "Created user");
    Ok(created(user))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    found(state.with_db(move |db| db.get_user(&id)).await?, "User")
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    found(state.with_db(move |db| db.update_user(&id, update)).await?, "User")
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(state.with_db(move |db| db.delete_user(&id)).await?, "User")
}

async fn login(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<User>, ApiError> {
    let user = state.with_db(move |db| db.authenticate(&credentials)).await?;
    Ok(Json(user))
}
