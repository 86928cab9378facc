//! Per-user notifications.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use palliative_rx_core::models::{
    NewNotification, Notification, NotificationFilter, NotificationUpdate,
};

use super::{created, deleted, found};
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(list_notifications).post(create_notification),
        )
        .route(
            "/notifications/:id",
            get(get_notification)
                .put(update_notification)
                .delete(delete_notification),
        )
}

/// `?userId=` and `?unread=true` narrow the list.
async fn list_notifications(
    State(state): State<AppState>,
    Query(filter): Query<NotificationFilter>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    Ok(Json(
        state
            .with_db(move |db| db.list_notifications(&filter))
            .await?,
    ))
}

async fn create_notification(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewNotification>,
) -> Result<(StatusCode, Json<Notification>), ApiError> {
    Ok(created(
        state
            .with_db(move |db| db.create_notification(&input))
            .await?,
    ))
}

async fn get_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Notification>, ApiError> {
    found(
        state.with_db(move |db| db.get_notification(&id)).await?,
        "Notification",
    )
}

async fn update_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<NotificationUpdate>,
) -> Result<Json<Notification>, ApiError> {
    found(
        state
            .with_db(move |db| db.update_notification(&id, update))
            .await?,
        "Notification",
    )
}

async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(
        state.with_db(move |db| db.delete_notification(&id)).await?,
        "Notification",
    )
}
