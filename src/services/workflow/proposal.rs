//! Title proposal lifecycle: submission, revision, advisor review, and
//! advisor assignment.

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::{Person, Proposal};
use crate::db::types::{PersonRole, ProposalStatus};
use crate::repositories;
use crate::services::dispatch::TransitionRecord;
use crate::services::supervision;
use crate::services::workflow::{non_empty, ReviewDecision, WorkflowError};

/// Review is only defined on a submitted proposal. Terminal and intermediate
/// states alike refuse further review.
pub(crate) fn review_transition(
    current: ProposalStatus,
    decision: ReviewDecision,
) -> Result<ProposalStatus, WorkflowError> {
    if current != ProposalStatus::Submitted {
        return Err(WorkflowError::InvalidTransition(
            "only a submitted proposal can be reviewed",
        ));
    }
    Ok(match decision {
        ReviewDecision::Accepted => ProposalStatus::Accepted,
        ReviewDecision::RevisionRequested => ProposalStatus::RevisionRequested,
        ReviewDecision::Rejected => ProposalStatus::Rejected,
    })
}

/// A student may rework the title only while it is a draft or was sent back
/// for revision. Acceptance and rejection both freeze it.
pub(crate) fn resubmit_transition(current: ProposalStatus) -> Result<ProposalStatus, WorkflowError> {
    match current {
        ProposalStatus::Draft | ProposalStatus::RevisionRequested => Ok(ProposalStatus::Submitted),
        _ => Err(WorkflowError::InvalidTransition(
            "only a draft or revision-requested proposal can be resubmitted",
        )),
    }
}

/// Creates the student's single proposal, already in the submitted state.
pub(crate) async fn submit_proposal(
    pool: &PgPool,
    student: &Person,
    title: &str,
    topic: &str,
) -> Result<(Proposal, TransitionRecord), WorkflowError> {
    let now = primitive_now_utc();
    let mut tx = pool.begin().await?;

    if repositories::proposals::exists_for_student(&mut *tx, &student.id).await?.is_some() {
        return Err(WorkflowError::DuplicateEntity("proposal"));
    }

    let create = repositories::proposals::CreateProposal {
        student_id: &student.id,
        title,
        topic,
        status: ProposalStatus::Submitted,
        now,
    };
    let proposal =
        match repositories::proposals::create(&mut *tx, &Uuid::new_v4().to_string(), create).await {
            Ok(proposal) => proposal,
            // The one-proposal-per-student constraint also holds under
            // concurrent submissions racing past the existence check.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(WorkflowError::DuplicateEntity("proposal"));
            }
            Err(err) => return Err(err.into()),
        };
    tx.commit().await?;

    let record = TransitionRecord::new(
        &student.id,
        Some(&proposal.id),
        format!("{} submitted thesis proposal \"{}\"", student.full_name, proposal.title),
    );
    Ok((proposal, record))
}

/// Reworks the title and topic and puts the proposal back in front of the
/// advisors. Clears the previous review reason.
pub(crate) async fn revise_proposal(
    pool: &PgPool,
    student: &Person,
    title: &str,
    topic: &str,
) -> Result<(Proposal, TransitionRecord), WorkflowError> {
    let now = primitive_now_utc();
    let mut tx = pool.begin().await?;

    let proposal = repositories::proposals::find_by_student(&mut *tx, &student.id)
        .await?
        .ok_or(WorkflowError::NotFound("proposal"))?;
    let proposal = repositories::proposals::find_by_id_for_update(&mut *tx, &proposal.id)
        .await?
        .ok_or(WorkflowError::NotFound("proposal"))?;

    resubmit_transition(proposal.status)?;
    let proposal =
        repositories::proposals::resubmit(&mut *tx, &proposal.id, title, topic, now).await?;
    tx.commit().await?;

    let mut record = TransitionRecord::new(
        &student.id,
        Some(&proposal.id),
        format!("{} resubmitted thesis proposal \"{}\"", student.full_name, proposal.title),
    );
    for advisor_id in proposal.advisor_ids() {
        record = record.notify(
            advisor_id,
            "Proposal resubmitted",
            format!("{} resubmitted the proposal \"{}\".", student.full_name, proposal.title),
        );
    }
    Ok((proposal, record))
}

/// Records an advisor's verdict on a submitted proposal. Revision requests
/// and rejections carry a mandatory reason; acceptance stamps `approved_at`.
pub(crate) async fn review_proposal(
    pool: &PgPool,
    advisor: &Person,
    proposal_id: &str,
    decision: ReviewDecision,
    reason: Option<&str>,
) -> Result<(Proposal, TransitionRecord), WorkflowError> {
    let now = primitive_now_utc();
    let mut tx = pool.begin().await?;

    let proposal = repositories::proposals::find_by_id_for_update(&mut *tx, proposal_id)
        .await?
        .ok_or(WorkflowError::NotFound("proposal"))?;

    let slot = supervision::slot_for(&proposal, &advisor.id)?;
    supervision::require_decision_authority(slot, decision)?;

    let reason = match decision {
        ReviewDecision::Accepted => None,
        _ => Some(non_empty(reason).ok_or(WorkflowError::ReasonRequired)?),
    };
    let next = review_transition(proposal.status, decision)?;
    let approved_at = (decision == ReviewDecision::Accepted).then_some(now);

    let proposal =
        repositories::proposals::set_review(&mut *tx, &proposal.id, next, reason, approved_at, now)
            .await?;
    tx.commit().await?;

    let body = match reason {
        Some(reason) => {
            format!("Your proposal was marked {}: {}", decision.as_str(), reason)
        }
        None => format!("Your proposal was marked {}.", decision.as_str()),
    };
    let record = TransitionRecord::new(
        &advisor.id,
        Some(&proposal.id),
        format!("{} marked proposal \"{}\" as {}", advisor.full_name, proposal.title, decision.as_str()),
    )
    .notify(&proposal.student_id, "Proposal reviewed", body);
    Ok((proposal, record))
}

/// Assigns the advisor pair. The primary slot is subject to the active
/// period's supervision quota; a re-assignment of the same primary advisor
/// does not re-count against it.
pub(crate) async fn assign_advisors(
    pool: &PgPool,
    admin: &Person,
    proposal_id: &str,
    primary_id: &str,
    secondary_id: Option<&str>,
) -> Result<(Proposal, TransitionRecord), WorkflowError> {
    let now = primitive_now_utc();
    let mut tx = pool.begin().await?;

    let proposal = repositories::proposals::find_by_id_for_update(&mut *tx, proposal_id)
        .await?
        .ok_or(WorkflowError::NotFound("proposal"))?;

    if secondary_id == Some(primary_id) {
        return Err(WorkflowError::InvalidTransition(
            "primary and secondary advisor must differ",
        ));
    }
    require_advisor(&mut tx, primary_id).await?;
    if let Some(secondary_id) = secondary_id {
        require_advisor(&mut tx, secondary_id).await?;
    }

    if proposal.primary_advisor_id.as_deref() != Some(primary_id) {
        if let Some(period) = repositories::periods::find_active(&mut *tx).await? {
            let limit = i64::from(period.advisor_quota);
            let current =
                repositories::proposals::count_primary_supervisions(&mut *tx, primary_id).await?;
            if current >= limit {
                return Err(WorkflowError::QuotaExceeded { limit });
            }
        }
    }

    let proposal = repositories::proposals::set_advisors(
        &mut *tx,
        &proposal.id,
        primary_id,
        secondary_id,
        now,
    )
    .await?;
    tx.commit().await?;

    let mut record = TransitionRecord::new(
        &admin.id,
        Some(&proposal.id),
        format!("{} assigned advisors for proposal \"{}\"", admin.full_name, proposal.title),
    )
    .notify(
        &proposal.student_id,
        "Advisors assigned",
        format!("Advisors were assigned to your proposal \"{}\".", proposal.title),
    );
    for advisor_id in proposal.advisor_ids() {
        record = record.notify(
            advisor_id,
            "Supervision assigned",
            format!("You were assigned to supervise \"{}\".", proposal.title),
        );
    }
    Ok((proposal, record))
}

async fn require_advisor(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    person_id: &str,
) -> Result<(), WorkflowError> {
    match repositories::people::find_role_by_id(&mut **tx, person_id).await? {
        Some(PersonRole::Advisor) => Ok(()),
        _ => Err(WorkflowError::NotFound("advisor")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_only_applies_to_submitted() {
        for status in [
            ProposalStatus::Draft,
            ProposalStatus::Accepted,
            ProposalStatus::RevisionRequested,
            ProposalStatus::Rejected,
        ] {
            assert!(matches!(
                review_transition(status, ReviewDecision::Accepted),
                Err(WorkflowError::InvalidTransition(_))
            ));
        }
    }

    #[test]
    fn review_maps_each_decision() {
        assert_eq!(
            review_transition(ProposalStatus::Submitted, ReviewDecision::Accepted).unwrap(),
            ProposalStatus::Accepted
        );
        assert_eq!(
            review_transition(ProposalStatus::Submitted, ReviewDecision::RevisionRequested)
                .unwrap(),
            ProposalStatus::RevisionRequested
        );
        assert_eq!(
            review_transition(ProposalStatus::Submitted, ReviewDecision::Rejected).unwrap(),
            ProposalStatus::Rejected
        );
    }

    #[test]
    fn resubmission_is_limited_to_draft_and_revision() {
        assert_eq!(
            resubmit_transition(ProposalStatus::Draft).unwrap(),
            ProposalStatus::Submitted
        );
        assert_eq!(
            resubmit_transition(ProposalStatus::RevisionRequested).unwrap(),
            ProposalStatus::Submitted
        );
        for status in
            [ProposalStatus::Submitted, ProposalStatus::Accepted, ProposalStatus::Rejected]
        {
            assert!(resubmit_transition(status).is_err());
        }
    }
}
