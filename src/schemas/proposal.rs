use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Proposal;
use crate::db::types::ProposalStatus;
use crate::services::workflow::ReviewDecision;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ProposalSubmit {
    #[validate(length(min = 1, max = 300, message = "title must be 1 to 300 characters"))]
    pub(crate) title: String,
    #[validate(length(min = 1, message = "topic must not be empty"))]
    pub(crate) topic: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProposalReview {
    pub(crate) decision: ReviewDecision,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdvisorAssignment {
    #[serde(alias = "primaryAdvisorId")]
    pub(crate) primary_advisor_id: String,
    #[serde(default)]
    #[serde(alias = "secondaryAdvisorId")]
    pub(crate) secondary_advisor_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProposalResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) title: String,
    pub(crate) topic: String,
    pub(crate) status: ProposalStatus,
    pub(crate) review_reason: Option<String>,
    pub(crate) primary_advisor_id: Option<String>,
    pub(crate) secondary_advisor_id: Option<String>,
    pub(crate) submitted_at: String,
    pub(crate) approved_at: Option<String>,
}

impl ProposalResponse {
    pub(crate) fn from_db(proposal: Proposal) -> Self {
        Self {
            id: proposal.id,
            student_id: proposal.student_id,
            title: proposal.title,
            topic: proposal.topic,
            status: proposal.status,
            review_reason: proposal.review_reason,
            primary_advisor_id: proposal.primary_advisor_id,
            secondary_advisor_id: proposal.secondary_advisor_id,
            submitted_at: format_primitive(proposal.submitted_at),
            approved_at: proposal.approved_at.map(format_primitive),
        }
    }
}
