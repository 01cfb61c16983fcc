use sqlx::PgExecutor;
use time::PrimitiveDateTime;

use crate::db::models::Period;

const COLUMNS: &str = "\
    id, name, academic_year, is_active, advisor_quota, card_number_format, \
    created_at, updated_at";

pub(crate) async fn find_by_id(
    exec: impl PgExecutor<'_>,
    id: &str,
) -> Result<Option<Period>, sqlx::Error> {
    sqlx::query_as::<_, Period>(&format!("SELECT {COLUMNS} FROM periods WHERE id = $1"))
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub(crate) async fn find_active(
    exec: impl PgExecutor<'_>,
) -> Result<Option<Period>, sqlx::Error> {
    sqlx::query_as::<_, Period>(&format!("SELECT {COLUMNS} FROM periods WHERE is_active"))
        .fetch_optional(exec)
        .await
}

pub(crate) async fn list(exec: impl PgExecutor<'_>) -> Result<Vec<Period>, sqlx::Error> {
    sqlx::query_as::<_, Period>(&format!(
        "SELECT {COLUMNS} FROM periods ORDER BY academic_year DESC, name"
    ))
    .fetch_all(exec)
    .await
}

pub(crate) struct CreatePeriod<'a> {
    pub name: &'a str,
    pub academic_year: &'a str,
    pub advisor_quota: i32,
    pub card_number_format: &'a str,
    pub now: PrimitiveDateTime,
}

pub(crate) async fn create(
    exec: impl PgExecutor<'_>,
    id: &str,
    params: CreatePeriod<'_>,
) -> Result<Period, sqlx::Error> {
    sqlx::query_as::<_, Period>(&format!(
        "INSERT INTO periods
            (id, name, academic_year, is_active, advisor_quota, card_number_format, created_at, updated_at)
         VALUES ($1, $2, $3, FALSE, $4, $5, $6, $6)
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(params.name)
    .bind(params.academic_year)
    .bind(params.advisor_quota)
    .bind(params.card_number_format)
    .bind(params.now)
    .fetch_one(exec)
    .await
}

pub(crate) async fn deactivate_all(
    exec: impl PgExecutor<'_>,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE periods SET is_active = FALSE, updated_at = $1 WHERE is_active")
        .bind(now)
        .execute(exec)
        .await?;
    Ok(())
}

pub(crate) async fn set_active(
    exec: impl PgExecutor<'_>,
    id: &str,
    now: PrimitiveDateTime,
) -> Result<Option<Period>, sqlx::Error> {
    sqlx::query_as::<_, Period>(&format!(
        "UPDATE periods SET is_active = TRUE, updated_at = $1 WHERE id = $2 RETURNING {COLUMNS}"
    ))
    .bind(now)
    .bind(id)
    .fetch_optional(exec)
    .await
}
