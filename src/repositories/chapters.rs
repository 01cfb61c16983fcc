use sqlx::PgExecutor;
use time::PrimitiveDateTime;

use crate::db::models::ChapterSubmission;
use crate::db::types::ChapterStatus;

const COLUMNS: &str = "\
    id, proposal_id, chapter_number, status, file_ref, review_notes, \
    reviewed_by, submitted_at, reviewed_at, created_at, updated_at";

pub(crate) async fn find_by_id(
    exec: impl PgExecutor<'_>,
    id: &str,
) -> Result<Option<ChapterSubmission>, sqlx::Error> {
    sqlx::query_as::<_, ChapterSubmission>(&format!(
        "SELECT {COLUMNS} FROM chapter_submissions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(exec)
    .await
}

pub(crate) async fn find_by_number(
    exec: impl PgExecutor<'_>,
    proposal_id: &str,
    chapter_number: i32,
) -> Result<Option<ChapterSubmission>, sqlx::Error> {
    sqlx::query_as::<_, ChapterSubmission>(&format!(
        "SELECT {COLUMNS} FROM chapter_submissions WHERE proposal_id = $1 AND chapter_number = $2"
    ))
    .bind(proposal_id)
    .bind(chapter_number)
    .fetch_optional(exec)
    .await
}

pub(crate) async fn list_by_proposal(
    exec: impl PgExecutor<'_>,
    proposal_id: &str,
) -> Result<Vec<ChapterSubmission>, sqlx::Error> {
    sqlx::query_as::<_, ChapterSubmission>(&format!(
        "SELECT {COLUMNS} FROM chapter_submissions WHERE proposal_id = $1 ORDER BY chapter_number"
    ))
    .bind(proposal_id)
    .fetch_all(exec)
    .await
}

/// One row per (proposal, chapter_number): the first upload inserts, every
/// later upload updates the same row back to pending.
pub(crate) async fn upsert_pending(
    exec: impl PgExecutor<'_>,
    id: &str,
    proposal_id: &str,
    chapter_number: i32,
    file_ref: &str,
    now: PrimitiveDateTime,
) -> Result<ChapterSubmission, sqlx::Error> {
    sqlx::query_as::<_, ChapterSubmission>(&format!(
        "INSERT INTO chapter_submissions
            (id, proposal_id, chapter_number, status, file_ref, submitted_at, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $6, $6)
         ON CONFLICT (proposal_id, chapter_number) DO UPDATE
         SET status = $4,
             file_ref = $5,
             review_notes = NULL,
             reviewed_by = NULL,
             reviewed_at = NULL,
             submitted_at = $6,
             updated_at = $6
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(proposal_id)
    .bind(chapter_number)
    .bind(ChapterStatus::Pending)
    .bind(file_ref)
    .bind(now)
    .fetch_one(exec)
    .await
}

pub(crate) async fn set_review(
    exec: impl PgExecutor<'_>,
    id: &str,
    status: ChapterStatus,
    review_notes: Option<&str>,
    reviewed_by: &str,
    now: PrimitiveDateTime,
) -> Result<ChapterSubmission, sqlx::Error> {
    sqlx::query_as::<_, ChapterSubmission>(&format!(
        "UPDATE chapter_submissions
         SET status = $1,
             review_notes = $2,
             reviewed_by = $3,
             reviewed_at = $4,
             updated_at = $4
         WHERE id = $5
         RETURNING {COLUMNS}"
    ))
    .bind(status)
    .bind(review_notes)
    .bind(reviewed_by)
    .bind(now)
    .bind(id)
    .fetch_one(exec)
    .await
}

pub(crate) async fn count_accepted(
    exec: impl PgExecutor<'_>,
    proposal_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM chapter_submissions WHERE proposal_id = $1 AND status = $2",
    )
    .bind(proposal_id)
    .bind(ChapterStatus::Accepted)
    .fetch_one(exec)
    .await
}
