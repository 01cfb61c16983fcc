//! The supervision workflow engine.
//!
//! Every status move of a proposal and its dependent artifacts goes through
//! one of the operations in this module tree. Each operation opens a
//! transaction, locks the owning proposal row, validates the move against
//! the explicit transition tables, writes, and returns a
//! [`TransitionRecord`](crate::services::dispatch::TransitionRecord) that the
//! caller hands to the dispatcher after the commit.

pub(crate) mod chapters;
pub(crate) mod finalize;
pub(crate) mod period;
pub(crate) mod proposal;
pub(crate) mod report;

#[cfg(test)]
mod full_flow;

use serde::Deserialize;
use thiserror::Error;

/// Typed failure taxonomy of the engine. Side-effect failures (notification,
/// activity log) are never represented here; the dispatcher swallows them.
#[derive(Debug, Error)]
pub(crate) enum WorkflowError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("actor lacks the required relationship to this record")]
    NotAuthorized,
    #[error("invalid transition: {0}")]
    InvalidTransition(&'static str),
    #[error("chapter {missing} must be accepted first")]
    PriorStepIncomplete { missing: i32 },
    #[error("{0} already exists")]
    DuplicateEntity(&'static str),
    #[error("proposal has not been accepted yet")]
    ProposalNotAccepted,
    #[error("completion requirements are not met")]
    FinalizationNotReady,
    #[error("an archive record already exists for this proposal")]
    AlreadyArchived,
    #[error("a non-empty reason is required for this decision")]
    ReasonRequired,
    #[error("advisor already supervises {limit} active proposals")]
    QuotaExceeded { limit: i64 },
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// A reviewer's verdict. Chapters do not admit `rejected`; their transition
/// table refuses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ReviewDecision {
    Accepted,
    RevisionRequested,
    Rejected,
}

impl ReviewDecision {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ReviewDecision::Accepted => "accepted",
            ReviewDecision::RevisionRequested => "revision_requested",
            ReviewDecision::Rejected => "rejected",
        }
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::non_empty;

    #[test]
    fn non_empty_trims_and_filters() {
        assert_eq!(non_empty(Some("  reason  ")), Some("reason"));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }
}
