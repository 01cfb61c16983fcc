use sqlx::PgExecutor;
use time::PrimitiveDateTime;

use crate::db::models::SupervisionMessage;

const COLUMNS: &str = "id, proposal_id, sender_id, body, created_at";

pub(crate) async fn insert(
    exec: impl PgExecutor<'_>,
    id: &str,
    proposal_id: &str,
    sender_id: &str,
    body: &str,
    now: PrimitiveDateTime,
) -> Result<SupervisionMessage, sqlx::Error> {
    sqlx::query_as::<_, SupervisionMessage>(&format!(
        "INSERT INTO supervision_messages (id, proposal_id, sender_id, body, created_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(proposal_id)
    .bind(sender_id)
    .bind(body)
    .bind(now)
    .fetch_one(exec)
    .await
}

pub(crate) async fn list_by_proposal(
    exec: impl PgExecutor<'_>,
    proposal_id: &str,
    skip: i64,
    limit: i64,
) -> Result<Vec<SupervisionMessage>, sqlx::Error> {
    sqlx::query_as::<_, SupervisionMessage>(&format!(
        "SELECT {COLUMNS} FROM supervision_messages WHERE proposal_id = $1
         ORDER BY created_at OFFSET $2 LIMIT $3"
    ))
    .bind(proposal_id)
    .bind(skip)
    .bind(limit)
    .fetch_all(exec)
    .await
}

/// Supervision meeting count captured on the card at generation time.
pub(crate) async fn count_by_proposal(
    exec: impl PgExecutor<'_>,
    proposal_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM supervision_messages WHERE proposal_id = $1",
    )
    .bind(proposal_id)
    .fetch_one(exec)
    .await
}
