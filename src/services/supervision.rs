//! Advisor slot resolution and decision authority.
//!
//! A proposal carries up to two advisors. The primary advisor owns terminal
//! decisions; the secondary advisor can only ask for revisions.

use serde::Serialize;

use crate::db::models::{Person, Proposal};
use crate::db::types::PersonRole;
use crate::services::workflow::{ReviewDecision, WorkflowError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum AdvisorSlot {
    Primary,
    Secondary,
}

/// Resolves which advisor slot `advisor_id` occupies on `proposal`.
pub(crate) fn slot_for(proposal: &Proposal, advisor_id: &str) -> Result<AdvisorSlot, WorkflowError> {
    if proposal.primary_advisor_id.as_deref() == Some(advisor_id) {
        return Ok(AdvisorSlot::Primary);
    }
    if proposal.secondary_advisor_id.as_deref() == Some(advisor_id) {
        return Ok(AdvisorSlot::Secondary);
    }
    Err(WorkflowError::NotAuthorized)
}

/// Terminal verdicts (accept, reject) are reserved for the primary slot.
pub(crate) fn require_decision_authority(
    slot: AdvisorSlot,
    decision: ReviewDecision,
) -> Result<(), WorkflowError> {
    match (slot, decision) {
        (AdvisorSlot::Primary, _) => Ok(()),
        (AdvisorSlot::Secondary, ReviewDecision::RevisionRequested) => Ok(()),
        (AdvisorSlot::Secondary, _) => Err(WorkflowError::NotAuthorized),
    }
}

/// Whether `person` may read a proposal and its artifacts: the owning
/// student, an assigned advisor, or an admin.
pub(crate) fn is_participant(proposal: &Proposal, person: &Person) -> bool {
    if person.role == PersonRole::Admin {
        return true;
    }
    if proposal.student_id == person.id {
        return true;
    }
    slot_for(proposal, &person.id).is_ok()
}

pub(crate) fn require_participant(
    proposal: &Proposal,
    person: &Person,
) -> Result<(), WorkflowError> {
    if is_participant(proposal, person) {
        Ok(())
    } else {
        Err(WorkflowError::NotAuthorized)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::db::types::ProposalStatus;

    fn proposal() -> Proposal {
        let ts = datetime!(2025-09-01 12:00:00);
        Proposal {
            id: "p-1".into(),
            student_id: "student-1".into(),
            title: "Adaptive mesh refinement".into(),
            topic: "numerics".into(),
            status: ProposalStatus::Submitted,
            review_reason: None,
            primary_advisor_id: Some("advisor-1".into()),
            secondary_advisor_id: Some("advisor-2".into()),
            submitted_at: ts,
            approved_at: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn person(id: &str, role: PersonRole) -> Person {
        let ts = datetime!(2025-09-01 12:00:00);
        Person {
            id: id.into(),
            username: id.into(),
            hashed_password: "x".into(),
            full_name: id.into(),
            role,
            is_active: true,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn slots_resolve_by_assignment() {
        let p = proposal();
        assert_eq!(slot_for(&p, "advisor-1").unwrap(), AdvisorSlot::Primary);
        assert_eq!(slot_for(&p, "advisor-2").unwrap(), AdvisorSlot::Secondary);
        assert!(matches!(slot_for(&p, "advisor-3"), Err(WorkflowError::NotAuthorized)));
    }

    #[test]
    fn secondary_advisor_cannot_decide_terminally() {
        assert!(require_decision_authority(AdvisorSlot::Secondary, ReviewDecision::Accepted)
            .is_err());
        assert!(require_decision_authority(AdvisorSlot::Secondary, ReviewDecision::Rejected)
            .is_err());
        assert!(require_decision_authority(
            AdvisorSlot::Secondary,
            ReviewDecision::RevisionRequested
        )
        .is_ok());
    }

    #[test]
    fn primary_advisor_may_use_every_decision() {
        for decision in [
            ReviewDecision::Accepted,
            ReviewDecision::RevisionRequested,
            ReviewDecision::Rejected,
        ] {
            assert!(require_decision_authority(AdvisorSlot::Primary, decision).is_ok());
        }
    }

    #[test]
    fn participants_are_owner_advisors_and_admins() {
        let p = proposal();
        assert!(is_participant(&p, &person("student-1", PersonRole::Student)));
        assert!(is_participant(&p, &person("advisor-2", PersonRole::Advisor)));
        assert!(is_participant(&p, &person("root", PersonRole::Admin)));
        assert!(!is_participant(&p, &person("student-2", PersonRole::Student)));
        assert!(!is_participant(&p, &person("advisor-9", PersonRole::Advisor)));
    }
}
