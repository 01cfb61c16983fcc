use sqlx::PgExecutor;
use time::PrimitiveDateTime;

use crate::db::models::Notification;

const COLUMNS: &str = "id, person_id, proposal_id, title, body, is_read, created_at";

pub(crate) async fn insert(
    exec: impl PgExecutor<'_>,
    id: &str,
    person_id: &str,
    proposal_id: Option<&str>,
    title: &str,
    body: &str,
    now: PrimitiveDateTime,
) -> Result<Notification, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "INSERT INTO notifications (id, person_id, proposal_id, title, body, is_read, created_at)
         VALUES ($1, $2, $3, $4, $5, FALSE, $6)
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(person_id)
    .bind(proposal_id)
    .bind(title)
    .bind(body)
    .bind(now)
    .fetch_one(exec)
    .await
}

pub(crate) async fn list_for_person(
    exec: impl PgExecutor<'_>,
    person_id: &str,
    unread_only: bool,
    skip: i64,
    limit: i64,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "SELECT {COLUMNS} FROM notifications
         WHERE person_id = $1 AND (NOT $2 OR NOT is_read)
         ORDER BY created_at DESC OFFSET $3 LIMIT $4"
    ))
    .bind(person_id)
    .bind(unread_only)
    .bind(skip)
    .bind(limit)
    .fetch_all(exec)
    .await
}

/// Scoped to the owner so a person cannot mark someone else's notification.
pub(crate) async fn mark_read(
    exec: impl PgExecutor<'_>,
    id: &str,
    person_id: &str,
) -> Result<Option<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND person_id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(person_id)
    .fetch_optional(exec)
    .await
}

pub(crate) async fn count_unread(
    exec: impl PgExecutor<'_>,
    person_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE person_id = $1 AND NOT is_read",
    )
    .bind(person_id)
    .fetch_one(exec)
    .await
}
