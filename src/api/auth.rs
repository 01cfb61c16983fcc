use axum::{
    extract::{Form, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentPerson;
use crate::api::validation::{validate_password_len, validate_username};
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Person;
use crate::db::types::PersonRole;
use crate::repositories;
use crate::schemas::auth::TokenResponse;
use crate::schemas::person::{PersonCreate, PersonLogin, PersonResponse};

/// Max attempts per window for auth endpoints (login/signup/token).
const AUTH_RATE_LIMIT: u64 = 10;
/// Rate limit window in seconds.
const AUTH_RATE_WINDOW_SECONDS: u64 = 60;

#[derive(Debug, Deserialize)]
struct OAuth2PasswordForm {
    username: String,
    password: String,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/token", post(token))
        .route("/me", get(me))
}

/// Self-service signup always creates a student; advisor and admin accounts
/// come from the admin endpoints.
async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<PersonCreate>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    validate_username(&payload.username)?;
    validate_password_len(&payload.password)?;

    let rate_key = format!("rl:signup:{}", payload.username);
    let allowed = state
        .redis()
        .rate_limit(&rate_key, AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if !allowed {
        return Err(ApiError::TooManyRequests("Too many signup attempts, try again later"));
    }

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
            role: PersonRole::Student,
            is_active: true,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create person"))?;

    let token = security::create_access_token(&person.id, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    let response = TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user: PersonResponse::from_db(person),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<PersonLogin>,
) -> Result<Json<TokenResponse>, ApiError> {
    validate_username(&payload.username)?;

    let rate_key = format!("rl:login:{}", payload.username);
    let allowed = state
        .redis()
        .rate_limit(&rate_key, AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if !allowed {
        return Err(ApiError::TooManyRequests("Too many login attempts, try again later"));
    }

    issue_token(&state, &payload.username, &payload.password).await.map(Json)
}

/// OAuth2 password form variant of login, for clients that speak the
/// standard token endpoint shape.
async fn token(
    State(state): State<AppState>,
    Form(payload): Form<OAuth2PasswordForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    validate_username(&payload.username)?;

    let rate_key = format!("rl:token:{}", payload.username);
    let allowed = state
        .redis()
        .rate_limit(&rate_key, AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if !allowed {
        return Err(ApiError::TooManyRequests("Too many token attempts, try again later"));
    }

    issue_token(&state, &payload.username, &payload.password).await.map(Json)
}

async fn me(CurrentPerson(person): CurrentPerson) -> Json<PersonResponse> {
    Json(PersonResponse::from_db(person))
}

async fn issue_token(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<TokenResponse, ApiError> {
    let person = fetch_person_by_username(state, username).await?;

    let verified = security::verify_password(password, &person.hashed_password)
        .map_err(|_| ApiError::Unauthorized("Incorrect username or password"))?;

    if !verified {
        return Err(ApiError::Unauthorized("Incorrect username or password"));
    }

    if !person.is_active {
        return Err(ApiError::BadRequest("Inactive person".to_string()));
    }

    let token = security::create_access_token(&person.id, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    Ok(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user: PersonResponse::from_db(person),
    })
}

async fn fetch_person_by_username(state: &AppState, username: &str) -> Result<Person, ApiError> {
    repositories::people::find_by_username(state.db(), username)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load person"))?
        .ok_or(ApiError::Unauthorized("Incorrect username or password"))
}
