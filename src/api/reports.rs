use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdvisor;
use crate::core::state::AppState;
use crate::schemas::completion::ArchiveResponse;
use crate::schemas::report::{ReportResponse, ReportReview};
use crate::services::dispatch;
use crate::services::workflow::report;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/:report_id/review", post(review_report))
}

#[derive(Debug, Serialize)]
struct ReportReviewResponse {
    report: ReportResponse,
    /// Present when acceptance completed the thesis and it was archived.
    archive: Option<ArchiveResponse>,
}

async fn review_report(
    CurrentAdvisor(advisor): CurrentAdvisor,
    State(state): State<AppState>,
    Path(report_id): Path<String>,
    Json(payload): Json<ReportReview>,
) -> Result<Json<ReportReviewResponse>, ApiError> {
    let (updated, archive, record) = report::review_final_report(
        state.db(),
        &advisor,
        &report_id,
        payload.decision,
        payload.notes.as_deref(),
    )
    .await?;
    dispatch::emit(&state, record).await;

    Ok(Json(ReportReviewResponse {
        report: ReportResponse::from_db(updated),
        archive: archive.map(ArchiveResponse::from_db),
    }))
}
