//! Supervision periods. At most one period is active; activation swaps the
//! flag atomically.

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::{Period, Person};
use crate::repositories;
use crate::services::dispatch::TransitionRecord;
use crate::services::workflow::WorkflowError;

pub(crate) struct NewPeriod<'a> {
    pub name: &'a str,
    pub academic_year: &'a str,
    pub advisor_quota: i32,
    pub card_number_format: &'a str,
}

pub(crate) async fn create_period(
    pool: &PgPool,
    admin: &Person,
    params: NewPeriod<'_>,
) -> Result<(Period, TransitionRecord), WorkflowError> {
    let now = primitive_now_utc();
    let create = repositories::periods::CreatePeriod {
        name: params.name,
        academic_year: params.academic_year,
        advisor_quota: params.advisor_quota,
        card_number_format: params.card_number_format,
        now,
    };
    let period =
        match repositories::periods::create(pool, &Uuid::new_v4().to_string(), create).await {
            Ok(period) => period,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(WorkflowError::DuplicateEntity("period"));
            }
            Err(err) => return Err(err.into()),
        };

    let record = TransitionRecord::new(
        &admin.id,
        None,
        format!("period \"{}\" ({}) created", period.name, period.academic_year),
    );
    Ok((period, record))
}

/// Deactivates whatever period is currently active and activates the given
/// one, in one transaction.
pub(crate) async fn activate_period(
    pool: &PgPool,
    admin: &Person,
    period_id: &str,
) -> Result<(Period, TransitionRecord), WorkflowError> {
    let now = primitive_now_utc();
    let mut tx = pool.begin().await?;

    repositories::periods::find_by_id(&mut *tx, period_id)
        .await?
        .ok_or(WorkflowError::NotFound("period"))?;
    repositories::periods::deactivate_all(&mut *tx, now).await?;
    let period = repositories::periods::set_active(&mut *tx, period_id, now)
        .await?
        .ok_or(WorkflowError::NotFound("period"))?;
    tx.commit().await?;

    let record = TransitionRecord::new(
        &admin.id,
        None,
        format!("period \"{}\" ({}) activated", period.name, period.academic_year),
    );
    Ok((period, record))
}
