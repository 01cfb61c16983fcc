use sqlx::PgExecutor;
use time::PrimitiveDateTime;

use crate::db::models::SupervisionCard;

const COLUMNS: &str = "id, proposal_id, card_number, meeting_count, issued_at";

pub(crate) async fn find_by_proposal(
    exec: impl PgExecutor<'_>,
    proposal_id: &str,
) -> Result<Option<SupervisionCard>, sqlx::Error> {
    sqlx::query_as::<_, SupervisionCard>(&format!(
        "SELECT {COLUMNS} FROM supervision_cards WHERE proposal_id = $1"
    ))
    .bind(proposal_id)
    .fetch_optional(exec)
    .await
}

pub(crate) async fn insert(
    exec: impl PgExecutor<'_>,
    id: &str,
    proposal_id: &str,
    card_number: &str,
    meeting_count: i64,
    issued_at: PrimitiveDateTime,
) -> Result<SupervisionCard, sqlx::Error> {
    sqlx::query_as::<_, SupervisionCard>(&format!(
        "INSERT INTO supervision_cards (id, proposal_id, card_number, meeting_count, issued_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(proposal_id)
    .bind(card_number)
    .bind(meeting_count)
    .bind(issued_at)
    .fetch_one(exec)
    .await
}
