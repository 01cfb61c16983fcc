use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::Person;
use crate::db::types::PersonRole;
use crate::repositories;

pub(crate) struct CurrentPerson(pub(crate) Person);
pub(crate) struct CurrentAdmin(pub(crate) Person);
pub(crate) struct CurrentStudent(pub(crate) Person);
pub(crate) struct CurrentAdvisor(pub(crate) Person);

#[async_trait]
impl FromRequestParts<AppState> for CurrentPerson {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        let person = repositories::people::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load person"))?;

        let Some(person) = person else {
            return Err(ApiError::Unauthorized("Person not found"));
        };

        if !person.is_active {
            return Err(ApiError::Unauthorized("Invalid authentication credentials"));
        }

        Ok(CurrentPerson(person))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentPerson(person) = CurrentPerson::from_request_parts(parts, state).await?;

        if person.role == PersonRole::Admin {
            Ok(CurrentAdmin(person))
        } else {
            Err(ApiError::Forbidden("Admin access required"))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentPerson(person) = CurrentPerson::from_request_parts(parts, state).await?;

        if person.role == PersonRole::Student {
            Ok(CurrentStudent(person))
        } else {
            Err(ApiError::Forbidden("Student access required"))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdvisor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentPerson(person) = CurrentPerson::from_request_parts(parts, state).await?;

        if person.role == PersonRole::Advisor {
            Ok(CurrentAdvisor(person))
        } else {
            Err(ApiError::Forbidden("Advisor access required"))
        }
    }
}
