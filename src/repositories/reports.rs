use sqlx::PgExecutor;
use time::PrimitiveDateTime;

use crate::db::models::FinalReport;
use crate::db::types::{ReportSlot, ReportStatus};

const COLUMNS: &str = "\
    id, proposal_id, final_text_ref, abstract_ref, approval_sheet_ref, \
    statement_sheet_ref, presentation_ref, status, review_notes, reviewed_by, \
    verified_at, submitted_at, created_at, updated_at";

pub(crate) async fn find_by_id(
    exec: impl PgExecutor<'_>,
    id: &str,
) -> Result<Option<FinalReport>, sqlx::Error> {
    sqlx::query_as::<_, FinalReport>(&format!("SELECT {COLUMNS} FROM final_reports WHERE id = $1"))
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub(crate) async fn find_by_proposal(
    exec: impl PgExecutor<'_>,
    proposal_id: &str,
) -> Result<Option<FinalReport>, sqlx::Error> {
    sqlx::query_as::<_, FinalReport>(&format!(
        "SELECT {COLUMNS} FROM final_reports WHERE proposal_id = $1"
    ))
    .bind(proposal_id)
    .fetch_optional(exec)
    .await
}

/// Lazily creates the single report row for a proposal on first file upload.
pub(crate) async fn create_pending(
    exec: impl PgExecutor<'_>,
    id: &str,
    proposal_id: &str,
    now: PrimitiveDateTime,
) -> Result<FinalReport, sqlx::Error> {
    sqlx::query_as::<_, FinalReport>(&format!(
        "INSERT INTO final_reports (id, proposal_id, status, submitted_at, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $4, $4)
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(proposal_id)
    .bind(ReportStatus::Pending)
    .bind(now)
    .fetch_one(exec)
    .await
}

/// Updates one file slot in place and resets the report to pending. The slot
/// column name is a static string from `ReportSlot::column`.
pub(crate) async fn set_slot(
    exec: impl PgExecutor<'_>,
    id: &str,
    slot: ReportSlot,
    file_ref: &str,
    now: PrimitiveDateTime,
) -> Result<FinalReport, sqlx::Error> {
    sqlx::query_as::<_, FinalReport>(&format!(
        "UPDATE final_reports
         SET {column} = $1,
             status = $2,
             review_notes = NULL,
             reviewed_by = NULL,
             submitted_at = $3,
             updated_at = $3
         WHERE id = $4
         RETURNING {COLUMNS}",
        column = slot.column()
    ))
    .bind(file_ref)
    .bind(ReportStatus::Pending)
    .bind(now)
    .bind(id)
    .fetch_one(exec)
    .await
}

pub(crate) async fn set_review(
    exec: impl PgExecutor<'_>,
    id: &str,
    status: ReportStatus,
    review_notes: Option<&str>,
    reviewed_by: &str,
    verified_at: Option<PrimitiveDateTime>,
    now: PrimitiveDateTime,
) -> Result<FinalReport, sqlx::Error> {
    sqlx::query_as::<_, FinalReport>(&format!(
        "UPDATE final_reports
         SET status = $1,
             review_notes = $2,
             reviewed_by = $3,
             verified_at = COALESCE($4, verified_at),
             updated_at = $5
         WHERE id = $6
         RETURNING {COLUMNS}"
    ))
    .bind(status)
    .bind(review_notes)
    .bind(reviewed_by)
    .bind(verified_at)
    .bind(now)
    .bind(id)
    .fetch_one(exec)
    .await
}

pub(crate) async fn accepted_exists(
    exec: impl PgExecutor<'_>,
    proposal_id: &str,
) -> Result<bool, sqlx::Error> {
    let found: Option<i32> = sqlx::query_scalar(
        "SELECT 1 FROM final_reports WHERE proposal_id = $1 AND status = $2",
    )
    .bind(proposal_id)
    .bind(ReportStatus::Accepted)
    .fetch_optional(exec)
    .await?;
    Ok(found.is_some())
}
