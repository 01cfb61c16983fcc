//! Completion artifacts: the supervision card and the archive record.
//!
//! Both require the thesis to be finishable: all five chapters accepted and
//! the final report accepted. The card is idempotent per proposal; the
//! archive record refuses duplicates.

use sqlx::{PgConnection, PgPool};
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::{ArchiveRecord, Person, Proposal, SupervisionCard};
use crate::db::types::{ArchiveStatus, PersonRole};
use crate::repositories;
use crate::services::dispatch::TransitionRecord;
use crate::services::supervision;
use crate::services::workflow::WorkflowError;

pub(crate) const REQUIRED_CHAPTERS: i64 = 5;

/// Whether the proposal has met every completion requirement.
pub(crate) async fn can_finalize(
    conn: &mut PgConnection,
    proposal_id: &str,
) -> Result<bool, sqlx::Error> {
    let accepted = repositories::chapters::count_accepted(&mut *conn, proposal_id).await?;
    if accepted < REQUIRED_CHAPTERS {
        return Ok(false);
    }
    repositories::reports::accepted_exists(&mut *conn, proposal_id).await
}

/// Renders a period's card number template. Recognized placeholders are
/// `{student}`, `{year}` and `{period}`; unknown text passes through.
pub(crate) fn render_card_number(
    template: &str,
    student_username: &str,
    academic_year: &str,
    period_name: &str,
) -> String {
    template
        .replace("{student}", student_username)
        .replace("{year}", academic_year)
        .replace("{period}", period_name)
}

/// Issues the supervision card. Returns the existing card without a
/// transition record when one was already issued.
pub(crate) async fn generate_supervision_card(
    pool: &PgPool,
    actor: &Person,
    proposal_id: &str,
) -> Result<(SupervisionCard, Option<TransitionRecord>), WorkflowError> {
    let now = primitive_now_utc();
    let mut tx = pool.begin().await?;

    let proposal = repositories::proposals::find_by_id_for_update(&mut *tx, proposal_id)
        .await?
        .ok_or(WorkflowError::NotFound("proposal"))?;
    supervision::require_participant(&proposal, actor)?;

    if let Some(card) = repositories::cards::find_by_proposal(&mut *tx, &proposal.id).await? {
        return Ok((card, None));
    }
    if !can_finalize(&mut *tx, &proposal.id).await? {
        return Err(WorkflowError::FinalizationNotReady);
    }

    let period = repositories::periods::find_active(&mut *tx)
        .await?
        .ok_or(WorkflowError::NotFound("active period"))?;
    let student = repositories::people::find_by_id(&mut *tx, &proposal.student_id)
        .await?
        .ok_or(WorkflowError::NotFound("student"))?;

    let card_number = render_card_number(
        &period.card_number_format,
        &student.username,
        &period.academic_year,
        &period.name,
    );
    let meeting_count =
        repositories::messages::count_by_proposal(&mut *tx, &proposal.id).await?;

    let card = repositories::cards::insert(
        &mut *tx,
        &Uuid::new_v4().to_string(),
        &proposal.id,
        &card_number,
        meeting_count,
        now,
    )
    .await?;
    tx.commit().await?;

    let record = TransitionRecord::new(
        &actor.id,
        Some(&proposal.id),
        format!("supervision card {} issued for \"{}\"", card.card_number, proposal.title),
    )
    .notify(
        &proposal.student_id,
        "Supervision card issued",
        format!("Supervision card {} was issued for your thesis.", card.card_number),
    );
    Ok((card, Some(record)))
}

/// Shared with the final-report acceptance path, which archives inside its
/// own transaction.
pub(crate) async fn create_archive_in_tx(
    conn: &mut PgConnection,
    proposal: &Proposal,
    now: PrimitiveDateTime,
) -> Result<ArchiveRecord, WorkflowError> {
    if repositories::archives::exists_by_proposal(&mut *conn, &proposal.id).await? {
        return Err(WorkflowError::AlreadyArchived);
    }
    if !can_finalize(&mut *conn, &proposal.id).await? {
        return Err(WorkflowError::FinalizationNotReady);
    }

    let report = repositories::reports::find_by_proposal(&mut *conn, &proposal.id).await?;
    let card = repositories::cards::find_by_proposal(&mut *conn, &proposal.id).await?;

    let record = repositories::archives::insert(
        &mut *conn,
        &Uuid::new_v4().to_string(),
        &proposal.id,
        report.as_ref().and_then(|r| r.final_text_ref.as_deref()),
        card.as_ref().map(|c| c.card_number.as_str()),
        now,
    )
    .await?;
    Ok(record)
}

/// Explicitly archives a completed thesis. Reserved for assigned advisors
/// and admins.
pub(crate) async fn create_archive_record(
    pool: &PgPool,
    actor: &Person,
    proposal_id: &str,
) -> Result<(ArchiveRecord, TransitionRecord), WorkflowError> {
    let now = primitive_now_utc();
    let mut tx = pool.begin().await?;

    let proposal = repositories::proposals::find_by_id_for_update(&mut *tx, proposal_id)
        .await?
        .ok_or(WorkflowError::NotFound("proposal"))?;
    if actor.role != PersonRole::Admin {
        supervision::slot_for(&proposal, &actor.id)?;
    }

    let archive = create_archive_in_tx(&mut *tx, &proposal, now).await?;
    tx.commit().await?;

    let record = TransitionRecord::new(
        &actor.id,
        Some(&proposal.id),
        format!("thesis \"{}\" archived", proposal.title),
    )
    .notify(
        &proposal.student_id,
        "Thesis archived",
        format!("Your thesis \"{}\" was archived.", proposal.title),
    );
    Ok((archive, record))
}

/// Admin correction of a finished record's outcome status.
pub(crate) async fn correct_archive_status(
    pool: &PgPool,
    admin: &Person,
    proposal_id: &str,
    status: ArchiveStatus,
) -> Result<(ArchiveRecord, TransitionRecord), WorkflowError> {
    let now = primitive_now_utc();
    let archive = repositories::archives::update_status(pool, proposal_id, status, now)
        .await?
        .ok_or(WorkflowError::NotFound("archive record"))?;

    let record = TransitionRecord::new(
        &admin.id,
        Some(proposal_id),
        format!("archive record status corrected to {:?}", status),
    );
    Ok((archive, record))
}

#[cfg(test)]
mod tests {
    use super::render_card_number;

    #[test]
    fn card_number_template_substitutes_placeholders() {
        let rendered =
            render_card_number("TS/{student}/{year}", "jdoe", "2025/2026", "Spring defense");
        assert_eq!(rendered, "TS/jdoe/2025/2026");
    }

    #[test]
    fn card_number_template_passes_literal_text_through() {
        assert_eq!(render_card_number("CARD-001", "jdoe", "2025", "x"), "CARD-001");
        assert_eq!(
            render_card_number("{period}-{student}", "jdoe", "2025", "autumn"),
            "autumn-jdoe"
        );
    }
}
