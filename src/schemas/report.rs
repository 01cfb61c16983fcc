use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::FinalReport;
use crate::db::types::ReportStatus;
use crate::services::workflow::ReviewDecision;

#[derive(Debug, Deserialize)]
pub(crate) struct ReportReview {
    pub(crate) decision: ReviewDecision,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportResponse {
    pub(crate) id: String,
    pub(crate) proposal_id: String,
    pub(crate) final_text_ref: Option<String>,
    pub(crate) abstract_ref: Option<String>,
    pub(crate) approval_sheet_ref: Option<String>,
    pub(crate) statement_sheet_ref: Option<String>,
    pub(crate) presentation_ref: Option<String>,
    pub(crate) status: ReportStatus,
    pub(crate) review_notes: Option<String>,
    pub(crate) reviewed_by: Option<String>,
    pub(crate) verified_at: Option<String>,
    pub(crate) submitted_at: String,
}

impl ReportResponse {
    pub(crate) fn from_db(report: FinalReport) -> Self {
        Self {
            id: report.id,
            proposal_id: report.proposal_id,
            final_text_ref: report.final_text_ref,
            abstract_ref: report.abstract_ref,
            approval_sheet_ref: report.approval_sheet_ref,
            statement_sheet_ref: report.statement_sheet_ref,
            presentation_ref: report.presentation_ref,
            status: report.status,
            review_notes: report.review_notes,
            reviewed_by: report.reviewed_by,
            verified_at: report.verified_at.map(format_primitive),
            submitted_at: format_primitive(report.submitted_at),
        }
    }
}
