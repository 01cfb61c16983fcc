use sqlx::PgExecutor;
use time::PrimitiveDateTime;

use crate::db::models::ArchiveRecord;
use crate::db::types::ArchiveStatus;

const COLUMNS: &str = "\
    id, proposal_id, status, completed_at, final_file_ref, card_number, \
    created_at, updated_at";

pub(crate) async fn find_by_proposal(
    exec: impl PgExecutor<'_>,
    proposal_id: &str,
) -> Result<Option<ArchiveRecord>, sqlx::Error> {
    sqlx::query_as::<_, ArchiveRecord>(&format!(
        "SELECT {COLUMNS} FROM archive_records WHERE proposal_id = $1"
    ))
    .bind(proposal_id)
    .fetch_optional(exec)
    .await
}

pub(crate) async fn exists_by_proposal(
    exec: impl PgExecutor<'_>,
    proposal_id: &str,
) -> Result<bool, sqlx::Error> {
    let found: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM archive_records WHERE proposal_id = $1")
            .bind(proposal_id)
            .fetch_optional(exec)
            .await?;
    Ok(found.is_some())
}

pub(crate) async fn insert(
    exec: impl PgExecutor<'_>,
    id: &str,
    proposal_id: &str,
    final_file_ref: Option<&str>,
    card_number: Option<&str>,
    now: PrimitiveDateTime,
) -> Result<ArchiveRecord, sqlx::Error> {
    sqlx::query_as::<_, ArchiveRecord>(&format!(
        "INSERT INTO archive_records
            (id, proposal_id, status, completed_at, final_file_ref, card_number, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $4, $4)
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(proposal_id)
    .bind(ArchiveStatus::Completed)
    .bind(now)
    .bind(final_file_ref)
    .bind(card_number)
    .fetch_one(exec)
    .await
}

/// Admin-initiated status correction, the only permitted mutation of an
/// archive record.
pub(crate) async fn update_status(
    exec: impl PgExecutor<'_>,
    proposal_id: &str,
    status: ArchiveStatus,
    now: PrimitiveDateTime,
) -> Result<Option<ArchiveRecord>, sqlx::Error> {
    sqlx::query_as::<_, ArchiveRecord>(&format!(
        "UPDATE archive_records SET status = $1, updated_at = $2
         WHERE proposal_id = $3
         RETURNING {COLUMNS}"
    ))
    .bind(status)
    .bind(now)
    .bind(proposal_id)
    .fetch_optional(exec)
    .await
}
