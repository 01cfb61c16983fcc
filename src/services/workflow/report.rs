//! Final report slots and review.
//!
//! The report row is created lazily on the first file upload and carries five
//! named file slots. Any upload while the report is pending or under revision
//! resets it to pending; once accepted or rejected the report is frozen.

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::{ArchiveRecord, FinalReport, Person};
use crate::db::types::{ProposalStatus, ReportSlot, ReportStatus};
use crate::repositories;
use crate::services::dispatch::TransitionRecord;
use crate::services::supervision;
use crate::services::workflow::{finalize, non_empty, ReviewDecision, WorkflowError};

/// Review is only defined on a pending report; unlike chapters, outright
/// rejection is a legal terminal outcome here.
pub(crate) fn report_review_transition(
    current: ReportStatus,
    decision: ReviewDecision,
) -> Result<ReportStatus, WorkflowError> {
    if current != ReportStatus::Pending {
        return Err(WorkflowError::InvalidTransition(
            "only a pending final report can be reviewed",
        ));
    }
    Ok(match decision {
        ReviewDecision::Accepted => ReportStatus::Accepted,
        ReviewDecision::RevisionRequested => ReportStatus::RevisionRequested,
        ReviewDecision::Rejected => ReportStatus::Rejected,
    })
}

/// Whether a slot upload is allowed in the report's current state.
pub(crate) fn report_upload_allowed(current: ReportStatus) -> Result<(), WorkflowError> {
    match current {
        ReportStatus::Pending | ReportStatus::RevisionRequested => Ok(()),
        ReportStatus::Accepted => Err(WorkflowError::InvalidTransition(
            "an accepted final report cannot be modified",
        )),
        ReportStatus::Rejected => Err(WorkflowError::InvalidTransition(
            "a rejected final report cannot be modified",
        )),
    }
}

/// Stores one file slot of the final report, creating the report row on the
/// first upload.
pub(crate) async fn upload_report_file(
    pool: &PgPool,
    student: &Person,
    proposal_id: &str,
    slot: ReportSlot,
    file_ref: &str,
) -> Result<(FinalReport, TransitionRecord), WorkflowError> {
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

    let report = match repositories::reports::find_by_proposal(&mut *tx, &proposal.id).await? {
        Some(report) => {
            report_upload_allowed(report.status)?;
            report
        }
        None => {
            repositories::reports::create_pending(
                &mut *tx,
                &Uuid::new_v4().to_string(),
                &proposal.id,
                now,
            )
            .await?
        }
    };
    let report = repositories::reports::set_slot(&mut *tx, &report.id, slot, file_ref, now).await?;
    tx.commit().await?;

    let mut record = TransitionRecord::new(
        &student.id,
        Some(&proposal.id),
        format!("{} uploaded report file ({})", student.full_name, slot.as_str()),
    );
    for advisor_id in proposal.advisor_ids() {
        record = record.notify(
            advisor_id,
            "Report file uploaded",
            format!(
                "{} uploaded the {} file for \"{}\".",
                student.full_name, slot.as_str(), proposal.title
            ),
        );
    }
    Ok((report, record))
}

/// Records the verdict on a pending final report. Acceptance stamps
/// `verified_at` and, when the chapters are complete too, archives the thesis
/// in the same transaction.
pub(crate) async fn review_final_report(
    pool: &PgPool,
    advisor: &Person,
    report_id: &str,
    decision: ReviewDecision,
    notes: Option<&str>,
) -> Result<(FinalReport, Option<ArchiveRecord>, TransitionRecord), WorkflowError> {
    let now = primitive_now_utc();
    let mut tx = pool.begin().await?;

    let report = repositories::reports::find_by_id(&mut *tx, report_id)
        .await?
        .ok_or(WorkflowError::NotFound("final report"))?;
    let proposal = repositories::proposals::find_by_id_for_update(&mut *tx, &report.proposal_id)
        .await?
        .ok_or(WorkflowError::NotFound("proposal"))?;
    // Re-read under the proposal lock; the pre-lock row may be stale.
    let report = repositories::reports::find_by_id(&mut *tx, report_id)
        .await?
        .ok_or(WorkflowError::NotFound("final report"))?;

    let slot = supervision::slot_for(&proposal, &advisor.id)?;
    supervision::require_decision_authority(slot, decision)?;

    let next = report_review_transition(report.status, decision)?;
    let verified_at = (decision == ReviewDecision::Accepted).then_some(now);
    let report = repositories::reports::set_review(
        &mut *tx,
        &report.id,
        next,
        non_empty(notes),
        &advisor.id,
        verified_at,
        now,
    )
    .await?;

    // Acceptance of the report may complete the thesis. Archive it while we
    // still hold the proposal lock; an incomplete chapter set just means the
    // archive record will be created later.
    let archive = if decision == ReviewDecision::Accepted {
        match finalize::create_archive_in_tx(&mut *tx, &proposal, now).await {
            Ok(archive) => Some(archive),
            Err(WorkflowError::AlreadyArchived | WorkflowError::FinalizationNotReady) => None,
            Err(err) => return Err(err),
        }
    } else {
        None
    };
    tx.commit().await?;

    let body = match (decision, non_empty(notes)) {
        (ReviewDecision::Accepted, _) => {
            format!("Your final report for \"{}\" was accepted.", proposal.title)
        }
        (_, Some(notes)) => format!(
            "Your final report was marked {}: {}",
            decision.as_str(), notes
        ),
        (_, None) => format!("Your final report was marked {}.", decision.as_str()),
    };
    let mut record = TransitionRecord::new(
        &advisor.id,
        Some(&proposal.id),
        format!(
            "{} marked the final report of \"{}\" as {}",
            advisor.full_name, proposal.title, decision.as_str()
        ),
    )
    .notify(&proposal.student_id, "Final report reviewed", body);
    if archive.is_some() {
        record = record.notify(
            &proposal.student_id,
            "Thesis archived",
            format!("Your thesis \"{}\" was archived.", proposal.title),
        );
    }
    Ok((report, archive, record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_requires_a_pending_report() {
        for current in
            [ReportStatus::Accepted, ReportStatus::RevisionRequested, ReportStatus::Rejected]
        {
            assert!(report_review_transition(current, ReviewDecision::Accepted).is_err());
        }
    }

    #[test]
    fn review_maps_each_decision() {
        assert_eq!(
            report_review_transition(ReportStatus::Pending, ReviewDecision::Accepted).unwrap(),
            ReportStatus::Accepted
        );
        assert_eq!(
            report_review_transition(ReportStatus::Pending, ReviewDecision::RevisionRequested)
                .unwrap(),
            ReportStatus::RevisionRequested
        );
        assert_eq!(
            report_review_transition(ReportStatus::Pending, ReviewDecision::Rejected).unwrap(),
            ReportStatus::Rejected
        );
    }

    #[test]
    fn uploads_are_frozen_after_a_terminal_verdict() {
        assert!(report_upload_allowed(ReportStatus::Pending).is_ok());
        assert!(report_upload_allowed(ReportStatus::RevisionRequested).is_ok());
        assert!(report_upload_allowed(ReportStatus::Accepted).is_err());
        assert!(report_upload_allowed(ReportStatus::Rejected).is_err());
    }
}
