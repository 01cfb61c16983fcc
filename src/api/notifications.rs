use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentPerson;
use crate::api::pagination::default_limit;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::notification::NotificationResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/:notification_id/read", post(mark_read))
}

#[derive(Debug, Deserialize)]
struct NotificationQuery {
    #[serde(default, alias = "unreadOnly")]
    unread_only: bool,
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

#[derive(Debug, Serialize)]
struct NotificationListResponse {
    items: Vec<NotificationResponse>,
    unread_count: i64,
    skip: i64,
    limit: i64,
}

async fn list_notifications(
    CurrentPerson(person): CurrentPerson,
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<NotificationListResponse>, ApiError> {
    let limit = query.limit.clamp(1, 500);
    let skip = query.skip.max(0);

    let notifications = repositories::notifications::list_for_person(
        state.db(),
        &person.id,
        query.unread_only,
        skip,
        limit,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list notifications"))?;

    let unread_count = repositories::notifications::count_unread(state.db(), &person.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count unread notifications"))?;

    Ok(Json(NotificationListResponse {
        items: notifications.into_iter().map(NotificationResponse::from_db).collect(),
        unread_count,
        skip,
        limit,
    }))
}

async fn mark_read(
    CurrentPerson(person): CurrentPerson,
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let notification =
        repositories::notifications::mark_read(state.db(), &notification_id, &person.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to mark notification read"))?
            .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

    Ok(Json(NotificationResponse::from_db(notification)))
}
