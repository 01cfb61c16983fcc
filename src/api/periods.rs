use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentPerson};
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::period::{PeriodCreate, PeriodResponse};
use crate::services::dispatch;
use crate::services::workflow::period;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_periods).post(create_period))
        .route("/active", get(get_active_period))
        .route("/:period_id/activate", post(activate_period))
}

async fn list_periods(
    CurrentPerson(_person): CurrentPerson,
    State(state): State<AppState>,
) -> Result<Json<Vec<PeriodResponse>>, ApiError> {
    let periods = repositories::periods::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list periods"))?;

    Ok(Json(periods.into_iter().map(PeriodResponse::from_db).collect()))
}

async fn get_active_period(
    CurrentPerson(_person): CurrentPerson,
    State(state): State<AppState>,
) -> Result<Json<PeriodResponse>, ApiError> {
    let period = repositories::periods::find_active(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load active period"))?
        .ok_or_else(|| ApiError::NotFound("No active period".to_string()))?;

    Ok(Json(PeriodResponse::from_db(period)))
}

async fn create_period(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<PeriodCreate>,
) -> Result<(StatusCode, Json<PeriodResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let defaults = state.settings().supervision();
    let advisor_quota = payload.advisor_quota.unwrap_or(defaults.default_advisor_quota as i32);
    if advisor_quota <= 0 {
        return Err(ApiError::BadRequest("advisorQuota must be positive".to_string()));
    }
    let card_number_format = payload
        .card_number_format
        .clone()
        .unwrap_or_else(|| defaults.default_card_number_format.clone());

    let (created, record) = period::create_period(
        state.db(),
        &admin,
        period::NewPeriod {
            name: &payload.name,
            academic_year: &payload.academic_year,
            advisor_quota,
            card_number_format: &card_number_format,
        },
    )
    .await?;
    dispatch::emit(&state, record).await;

    Ok((StatusCode::CREATED, Json(PeriodResponse::from_db(created))))
}

async fn activate_period(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(period_id): Path<String>,
) -> Result<Json<PeriodResponse>, ApiError> {
    let (activated, record) = period::activate_period(state.db(), &admin, &period_id).await?;
    dispatch::emit(&state, record).await;

    Ok(Json(PeriodResponse::from_db(activated)))
}
