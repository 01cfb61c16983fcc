use sqlx::PgExecutor;
use time::PrimitiveDateTime;

use crate::db::models::ActivityLogEntry;

const COLUMNS: &str = "id, actor_id, proposal_id, description, created_at";

/// The log is append-only; nothing in the workflow updates or deletes rows.
pub(crate) async fn insert(
    exec: impl PgExecutor<'_>,
    id: &str,
    actor_id: &str,
    proposal_id: Option<&str>,
    description: &str,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO activity_log (id, actor_id, proposal_id, description, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(actor_id)
    .bind(proposal_id)
    .bind(description)
    .bind(now)
    .execute(exec)
    .await?;
    Ok(())
}

pub(crate) async fn list_by_proposal(
    exec: impl PgExecutor<'_>,
    proposal_id: &str,
    skip: i64,
    limit: i64,
) -> Result<Vec<ActivityLogEntry>, sqlx::Error> {
    sqlx::query_as::<_, ActivityLogEntry>(&format!(
        "SELECT {COLUMNS} FROM activity_log WHERE proposal_id = $1
         ORDER BY created_at DESC OFFSET $2 LIMIT $3"
    ))
    .bind(proposal_id)
    .bind(skip)
    .bind(limit)
    .fetch_all(exec)
    .await
}
