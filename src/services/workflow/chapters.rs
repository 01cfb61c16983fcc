//! Sequential chapter submissions.
//!
//! Chapters 1 through 5 are uploaded in order: chapter `n` is locked until
//! chapter `n - 1` has been accepted. A revision request re-opens the same
//! chapter; acceptance freezes it.

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::{ChapterSubmission, Person};
use crate::db::types::{ChapterStatus, ProposalStatus};
use crate::repositories;
use crate::services::dispatch::TransitionRecord;
use crate::services::supervision;
use crate::services::workflow::{non_empty, ReviewDecision, WorkflowError};

pub(crate) const FIRST_CHAPTER: i32 = 1;
pub(crate) const LAST_CHAPTER: i32 = 5;

/// Chapter review has no terminal rejection. A chapter is either accepted or
/// sent back for another round.
pub(crate) fn chapter_review_transition(
    current: ChapterStatus,
    decision: ReviewDecision,
) -> Result<ChapterStatus, WorkflowError> {
    if current != ChapterStatus::Pending {
        return Err(WorkflowError::InvalidTransition(
            "only a pending chapter can be reviewed",
        ));
    }
    match decision {
        ReviewDecision::Accepted => Ok(ChapterStatus::Accepted),
        ReviewDecision::RevisionRequested => Ok(ChapterStatus::RevisionRequested),
        ReviewDecision::Rejected => Err(WorkflowError::InvalidTransition(
            "a chapter cannot be rejected outright",
        )),
    }
}

/// An accepted chapter is immutable; pending and revision-requested chapters
/// accept a replacement upload.
pub(crate) fn upload_allowed(existing: Option<ChapterStatus>) -> Result<(), WorkflowError> {
    match existing {
        Some(ChapterStatus::Accepted) => Err(WorkflowError::InvalidTransition(
            "an accepted chapter cannot be resubmitted",
        )),
        _ => Ok(()),
    }
}

/// The ordering gate: chapter `n` requires chapter `n - 1` accepted.
pub(crate) fn prior_chapter_gate(
    chapter_number: i32,
    prior_status: Option<ChapterStatus>,
) -> Result<(), WorkflowError> {
    if chapter_number <= FIRST_CHAPTER {
        return Ok(());
    }
    match prior_status {
        Some(ChapterStatus::Accepted) => Ok(()),
        _ => Err(WorkflowError::PriorStepIncomplete { missing: chapter_number - 1 }),
    }
}

/// Stores a chapter upload, enforcing proposal acceptance, the ordering gate,
/// and chapter immutability after acceptance.
pub(crate) async fn upload_chapter(
    pool: &PgPool,
    student: &Person,
    proposal_id: &str,
    chapter_number: i32,
    file_ref: &str,
) -> Result<(ChapterSubmission, TransitionRecord), WorkflowError> {
    if !(FIRST_CHAPTER..=LAST_CHAPTER).contains(&chapter_number) {
        return Err(WorkflowError::InvalidTransition("chapter number out of range"));
    }

    let now = primitive_now_utc();
    let mut tx = pool.begin().await?;

    let proposal = repositories::proposals::find_by_id_for_update(&mut *tx, proposal_id)
        .await?
        .ok_or(WorkflowError::NotFound("proposal"))?;
    if proposal.student_id != student.id {
        return Err(WorkflowError::NotAuthorized);
    }
    if proposal.status != ProposalStatus::Accepted {
        return Err(WorkflowError::ProposalNotAccepted);
    }

    if chapter_number > FIRST_CHAPTER {
        let prior =
            repositories::chapters::find_by_number(&mut *tx, &proposal.id, chapter_number - 1)
                .await?;
        prior_chapter_gate(chapter_number, prior.map(|c| c.status))?;
    }
    let existing =
        repositories::chapters::find_by_number(&mut *tx, &proposal.id, chapter_number).await?;
    upload_allowed(existing.map(|c| c.status))?;

    let chapter = repositories::chapters::upsert_pending(
        &mut *tx,
        &Uuid::new_v4().to_string(),
        &proposal.id,
        chapter_number,
        file_ref,
        now,
    )
    .await?;
    tx.commit().await?;

    let mut record = TransitionRecord::new(
        &student.id,
        Some(&proposal.id),
        format!("{} uploaded chapter {}", student.full_name, chapter_number),
    );
    for advisor_id in proposal.advisor_ids() {
        record = record.notify(
            advisor_id,
            "Chapter uploaded",
            format!(
                "{} uploaded chapter {} of \"{}\".",
                student.full_name, chapter_number, proposal.title
            ),
        );
    }
    Ok((chapter, record))
}

/// Records an advisor's verdict on a pending chapter. Acceptance unlocks the
/// next chapter for the student; a revision request carries optional notes.
pub(crate) async fn review_chapter(
    pool: &PgPool,
    advisor: &Person,
    chapter_id: &str,
    decision: ReviewDecision,
    notes: Option<&str>,
) -> Result<(ChapterSubmission, TransitionRecord), WorkflowError> {
    let now = primitive_now_utc();
    let mut tx = pool.begin().await?;

    let chapter = repositories::chapters::find_by_id(&mut *tx, chapter_id)
        .await?
        .ok_or(WorkflowError::NotFound("chapter submission"))?;
    let proposal = repositories::proposals::find_by_id_for_update(&mut *tx, &chapter.proposal_id)
        .await?
        .ok_or(WorkflowError::NotFound("proposal"))?;
    // Re-read under the proposal lock; the pre-lock row may be stale.
    let chapter = repositories::chapters::find_by_id(&mut *tx, chapter_id)
        .await?
        .ok_or(WorkflowError::NotFound("chapter submission"))?;

    let slot = supervision::slot_for(&proposal, &advisor.id)?;
    supervision::require_decision_authority(slot, decision)?;

    let next = chapter_review_transition(chapter.status, decision)?;
    let chapter = repositories::chapters::set_review(
        &mut *tx,
        &chapter.id,
        next,
        non_empty(notes),
        &advisor.id,
        now,
    )
    .await?;
    tx.commit().await?;

    let body = match (decision, non_empty(notes)) {
        (ReviewDecision::Accepted, _) => {
            format!("Chapter {} of \"{}\" was accepted.", chapter.chapter_number, proposal.title)
        }
        (_, Some(notes)) => format!(
            "Chapter {} of \"{}\" needs revision: {}",
            chapter.chapter_number, proposal.title, notes
        ),
        (_, None) => format!(
            "Chapter {} of \"{}\" needs revision.",
            chapter.chapter_number, proposal.title
        ),
    };
    let record = TransitionRecord::new(
        &advisor.id,
        Some(&proposal.id),
        format!(
            "{} marked chapter {} as {}",
            advisor.full_name, chapter.chapter_number, decision.as_str()
        ),
    )
    .notify(&proposal.student_id, "Chapter reviewed", body);
    Ok((chapter, record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapter_one_needs_no_predecessor() {
        assert!(prior_chapter_gate(1, None).is_ok());
    }

    #[test]
    fn later_chapters_need_the_previous_one_accepted() {
        assert!(prior_chapter_gate(2, Some(ChapterStatus::Accepted)).is_ok());
        for prior in [None, Some(ChapterStatus::Pending), Some(ChapterStatus::RevisionRequested)] {
            assert!(matches!(
                prior_chapter_gate(3, prior),
                Err(WorkflowError::PriorStepIncomplete { missing: 2 })
            ));
        }
    }

    #[test]
    fn accepted_chapters_are_immutable() {
        assert!(upload_allowed(None).is_ok());
        assert!(upload_allowed(Some(ChapterStatus::Pending)).is_ok());
        assert!(upload_allowed(Some(ChapterStatus::RevisionRequested)).is_ok());
        assert!(upload_allowed(Some(ChapterStatus::Accepted)).is_err());
    }

    #[test]
    fn review_requires_a_pending_chapter() {
        for current in [ChapterStatus::Accepted, ChapterStatus::RevisionRequested] {
            assert!(chapter_review_transition(current, ReviewDecision::Accepted).is_err());
        }
        assert_eq!(
            chapter_review_transition(ChapterStatus::Pending, ReviewDecision::Accepted).unwrap(),
            ChapterStatus::Accepted
        );
        assert_eq!(
            chapter_review_transition(ChapterStatus::Pending, ReviewDecision::RevisionRequested)
                .unwrap(),
            ChapterStatus::RevisionRequested
        );
    }

    #[test]
    fn chapters_cannot_be_rejected() {
        assert!(matches!(
            chapter_review_transition(ChapterStatus::Pending, ReviewDecision::Rejected),
            Err(WorkflowError::InvalidTransition(_))
        ));
    }
}
