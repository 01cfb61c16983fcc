use sqlx::PgExecutor;
use time::PrimitiveDateTime;

use crate::db::models::Person;
use crate::db::types::PersonRole;

const COLUMNS: &str =
    "id, username, hashed_password, full_name, role, is_active, created_at, updated_at";

pub(crate) async fn find_by_id(
    exec: impl PgExecutor<'_>,
    id: &str,
) -> Result<Option<Person>, sqlx::Error> {
    sqlx::query_as::<_, Person>(&format!("SELECT {COLUMNS} FROM people WHERE id = $1"))
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub(crate) async fn find_by_username(
    exec: impl PgExecutor<'_>,
    username: &str,
) -> Result<Option<Person>, sqlx::Error> {
    sqlx::query_as::<_, Person>(&format!("SELECT {COLUMNS} FROM people WHERE username = $1"))
        .bind(username)
        .fetch_optional(exec)
        .await
}

pub(crate) async fn exists_by_username(
    exec: impl PgExecutor<'_>,
    username: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM people WHERE username = $1")
        .bind(username)
        .fetch_optional(exec)
        .await
}

pub(crate) async fn find_role_by_id(
    exec: impl PgExecutor<'_>,
    id: &str,
) -> Result<Option<PersonRole>, sqlx::Error> {
    sqlx::query_scalar::<_, PersonRole>("SELECT role FROM people WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub(crate) async fn list_by_role(
    exec: impl PgExecutor<'_>,
    role: PersonRole,
    skip: i64,
    limit: i64,
) -> Result<Vec<Person>, sqlx::Error> {
    sqlx::query_as::<_, Person>(&format!(
        "SELECT {COLUMNS} FROM people WHERE role = $1 ORDER BY full_name OFFSET $2 LIMIT $3"
    ))
    .bind(role)
    .bind(skip)
    .bind(limit)
    .fetch_all(exec)
    .await
}

pub(crate) struct CreatePerson<'a> {
    pub username: &'a str,
    pub hashed_password: String,
    pub full_name: &'a str,
    pub role: PersonRole,
    pub is_active: bool,
    pub now: PrimitiveDateTime,
}

pub(crate) async fn create(
    exec: impl PgExecutor<'_>,
    id: &str,
    params: CreatePerson<'_>,
) -> Result<Person, sqlx::Error> {
    sqlx::query_as::<_, Person>(&format!(
        "INSERT INTO people (id, username, hashed_password, full_name, role, is_active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(params.username)
    .bind(params.hashed_password)
    .bind(params.full_name)
    .bind(params.role)
    .bind(params.is_active)
    .bind(params.now)
    .fetch_one(exec)
    .await
}

pub(crate) struct UpdatePerson {
    pub full_name: Option<String>,
    pub role: Option<PersonRole>,
    pub is_active: Option<bool>,
    pub hashed_password: Option<String>,
    pub now: PrimitiveDateTime,
}

pub(crate) async fn update(
    exec: impl PgExecutor<'_>,
    id: &str,
    params: UpdatePerson,
) -> Result<bool, sqlx::Error> {
    let updated = sqlx::query(
        "UPDATE people SET
            full_name = COALESCE($1, full_name),
            role = COALESCE($2, role),
            is_active = COALESCE($3, is_active),
            hashed_password = COALESCE($4, hashed_password),
            updated_at = $5
         WHERE id = $6",
    )
    .bind(params.full_name)
    .bind(params.role)
    .bind(params.is_active)
    .bind(params.hashed_password)
    .bind(params.now)
    .bind(id)
    .execute(exec)
    .await?;

    Ok(updated.rows_affected() > 0)
}
