use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdvisor;
use crate::core::state::AppState;
use crate::schemas::chapter::{ChapterResponse, ChapterReview};
use crate::services::dispatch;
use crate::services::workflow::chapters;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/:chapter_id/review", post(review_chapter))
}

async fn review_chapter(
    CurrentAdvisor(advisor): CurrentAdvisor,
    State(state): State<AppState>,
    Path(chapter_id): Path<String>,
    Json(payload): Json<ChapterReview>,
) -> Result<Json<ChapterResponse>, ApiError> {
    let (chapter, record) = chapters::review_chapter(
        state.db(),
        &advisor,
        &chapter_id,
        payload.decision,
        payload.notes.as_deref(),
    )
    .await?;
    dispatch::emit(&state, record).await;

    Ok(Json(ChapterResponse::from_db(chapter)))
}
