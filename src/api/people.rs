use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::pagination::{default_limit, PaginatedResponse};
use crate::api::validation::{validate_password_len, validate_username};
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::PersonRole;
use crate::repositories;
use crate::schemas::person::{AdminPersonCreate, AdminPersonUpdate, PersonResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_people).post(create_person))
        .route("/:person_id", get(get_person).put(update_person))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default = "default_role_filter")]
    role: PersonRole,
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_role_filter() -> PersonRole {
    PersonRole::Student
}

async fn list_people(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PaginatedResponse<PersonResponse>>, ApiError> {
    let limit = query.limit.clamp(1, 500);
    let skip = query.skip.max(0);

    let people = repositories::people::list_by_role(state.db(), query.role, skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list people"))?;

    let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM people WHERE role = $1")
        .bind(query.role)
        .fetch_one(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count people"))?;

    Ok(Json(PaginatedResponse {
        items: people.into_iter().map(PersonResponse::from_db).collect(),
        total_count,
        skip,
        limit,
    }))
}

async fn create_person(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<AdminPersonCreate>,
) -> Result<(StatusCode, Json<PersonResponse>), ApiError> {
    validate_username(&payload.username)?;
    validate_password_len(&payload.password)?;

    let existing = repositories::people::exists_by_username(state.db(), &payload.username)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing person"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Person with this username already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let person = repositories::people::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        repositories::people::CreatePerson {
            username: &payload.username,
            hashed_password,
            full_name: &payload.full_name,
            role: payload.role,
            is_active: payload.is_active,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create person"))?;

    Ok((StatusCode::CREATED, Json(PersonResponse::from_db(person))))
}

async fn get_person(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(person_id): Path<String>,
) -> Result<Json<PersonResponse>, ApiError> {
    let person = repositories::people::find_by_id(state.db(), &person_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load person"))?
        .ok_or_else(|| ApiError::NotFound("Person not found".to_string()))?;

    Ok(Json(PersonResponse::from_db(person)))
}

async fn update_person(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(person_id): Path<String>,
    Json(payload): Json<AdminPersonUpdate>,
) -> Result<Json<PersonResponse>, ApiError> {
    let hashed_password = match &payload.password {
        Some(password) => {
            validate_password_len(password)?;
            Some(
                security::hash_password(password)
                    .map_err(|e| ApiError::internal(e, "Failed to hash password"))?,
            )
        }
        None => None,
    };

    let updated = repositories::people::update(
        state.db(),
        &person_id,
        repositories::people::UpdatePerson {
            full_name: payload.full_name,
            role: payload.role,
            is_active: payload.is_active,
            hashed_password,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update person"))?;

    if !updated {
        return Err(ApiError::NotFound("Person not found".to_string()));
    }

    let person = repositories::people::find_by_id(state.db(), &person_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load person"))?
        .ok_or_else(|| ApiError::NotFound("Person not found".to_string()))?;

    Ok(Json(PersonResponse::from_db(person)))
}
