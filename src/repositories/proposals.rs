use sqlx::PgExecutor;
use time::PrimitiveDateTime;

use crate::db::models::Proposal;
use crate::db::types::ProposalStatus;

const COLUMNS: &str = "\
    id, student_id, title, topic, status, review_reason, \
    primary_advisor_id, secondary_advisor_id, submitted_at, approved_at, \
    created_at, updated_at";

pub(crate) async fn find_by_id(
    exec: impl PgExecutor<'_>,
    id: &str,
) -> Result<Option<Proposal>, sqlx::Error> {
    sqlx::query_as::<_, Proposal>(&format!("SELECT {COLUMNS} FROM proposals WHERE id = $1"))
        .bind(id)
        .fetch_optional(exec)
        .await
}

/// Locks the proposal row for the remainder of the surrounding transaction.
/// Every workflow transition takes this lock first so check-then-act on the
/// proposal and its dependent rows is serialized.
pub(crate) async fn find_by_id_for_update(
    exec: impl PgExecutor<'_>,
    id: &str,
) -> Result<Option<Proposal>, sqlx::Error> {
    sqlx::query_as::<_, Proposal>(&format!(
        "SELECT {COLUMNS} FROM proposals WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(exec)
    .await
}

pub(crate) async fn find_by_student(
    exec: impl PgExecutor<'_>,
    student_id: &str,
) -> Result<Option<Proposal>, sqlx::Error> {
    sqlx::query_as::<_, Proposal>(&format!(
        "SELECT {COLUMNS} FROM proposals WHERE student_id = $1"
    ))
    .bind(student_id)
    .fetch_optional(exec)
    .await
}

pub(crate) async fn exists_for_student(
    exec: impl PgExecutor<'_>,
    student_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM proposals WHERE student_id = $1")
        .bind(student_id)
        .fetch_optional(exec)
        .await
}

pub(crate) struct CreateProposal<'a> {
    pub student_id: &'a str,
    pub title: &'a str,
    pub topic: &'a str,
    pub status: ProposalStatus,
    pub now: PrimitiveDateTime,
}

pub(crate) async fn create(
    exec: impl PgExecutor<'_>,
    id: &str,
    params: CreateProposal<'_>,
) -> Result<Proposal, sqlx::Error> {
    sqlx::query_as::<_, Proposal>(&format!(
        "INSERT INTO proposals (id, student_id, title, topic, status, submitted_at, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $6, $6)
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(params.student_id)
    .bind(params.title)
    .bind(params.topic)
    .bind(params.status)
    .bind(params.now)
    .fetch_one(exec)
    .await
}

/// Student resubmission: new title/topic, status back to submitted, the
/// previous review reason cleared.
pub(crate) async fn resubmit(
    exec: impl PgExecutor<'_>,
    id: &str,
    title: &str,
    topic: &str,
    now: PrimitiveDateTime,
) -> Result<Proposal, sqlx::Error> {
    sqlx::query_as::<_, Proposal>(&format!(
        "UPDATE proposals
         SET title = $1,
             topic = $2,
             status = $3,
             review_reason = NULL,
             submitted_at = $4,
             updated_at = $4
         WHERE id = $5
         RETURNING {COLUMNS}"
    ))
    .bind(title)
    .bind(topic)
    .bind(ProposalStatus::Submitted)
    .bind(now)
    .bind(id)
    .fetch_one(exec)
    .await
}

pub(crate) async fn set_review(
    exec: impl PgExecutor<'_>,
    id: &str,
    status: ProposalStatus,
    review_reason: Option<&str>,
    approved_at: Option<PrimitiveDateTime>,
    now: PrimitiveDateTime,
) -> Result<Proposal, sqlx::Error> {
    sqlx::query_as::<_, Proposal>(&format!(
        "UPDATE proposals
         SET status = $1,
             review_reason = $2,
             approved_at = COALESCE($3, approved_at),
             updated_at = $4
         WHERE id = $5
         RETURNING {COLUMNS}"
    ))
    .bind(status)
    .bind(review_reason)
    .bind(approved_at)
    .bind(now)
    .bind(id)
    .fetch_one(exec)
    .await
}

pub(crate) async fn set_advisors(
    exec: impl PgExecutor<'_>,
    id: &str,
    primary_advisor_id: &str,
    secondary_advisor_id: Option<&str>,
    now: PrimitiveDateTime,
) -> Result<Proposal, sqlx::Error> {
    sqlx::query_as::<_, Proposal>(&format!(
        "UPDATE proposals
         SET primary_advisor_id = $1,
             secondary_advisor_id = $2,
             updated_at = $3
         WHERE id = $4
         RETURNING {COLUMNS}"
    ))
    .bind(primary_advisor_id)
    .bind(secondary_advisor_id)
    .bind(now)
    .bind(id)
    .fetch_one(exec)
    .await
}

pub(crate) async fn list_supervised_by(
    exec: impl PgExecutor<'_>,
    advisor_id: &str,
    skip: i64,
    limit: i64,
) -> Result<Vec<Proposal>, sqlx::Error> {
    sqlx::query_as::<_, Proposal>(&format!(
        "SELECT {COLUMNS} FROM proposals
         WHERE primary_advisor_id = $1 OR secondary_advisor_id = $1
         ORDER BY submitted_at DESC
         OFFSET $2 LIMIT $3"
    ))
    .bind(advisor_id)
    .bind(skip)
    .bind(limit)
    .fetch_all(exec)
    .await
}

/// Active primary-slot load for the advisor quota check. Rejected proposals
/// no longer occupy a supervision slot.
pub(crate) async fn count_primary_supervisions(
    exec: impl PgExecutor<'_>,
    advisor_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM proposals WHERE primary_advisor_id = $1 AND status <> $2",
    )
    .bind(advisor_id)
    .bind(ProposalStatus::Rejected)
    .fetch_one(exec)
    .await
}
