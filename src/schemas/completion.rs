use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::{ArchiveRecord, SupervisionCard};
use crate::db::types::ArchiveStatus;

#[derive(Debug, Serialize)]
pub(crate) struct CardResponse {
    pub(crate) id: String,
    pub(crate) proposal_id: String,
    pub(crate) card_number: String,
    pub(crate) meeting_count: i64,
    pub(crate) issued_at: String,
}

impl CardResponse {
    pub(crate) fn from_db(card: SupervisionCard) -> Self {
        Self {
            id: card.id,
            proposal_id: card.proposal_id,
            card_number: card.card_number,
            meeting_count: card.meeting_count,
            issued_at: format_primitive(card.issued_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArchiveStatusUpdate {
    pub(crate) status: ArchiveStatus,
}

#[derive(Debug, Serialize)]
pub(crate) struct ArchiveResponse {
    pub(crate) id: String,
    pub(crate) proposal_id: String,
    pub(crate) status: ArchiveStatus,
    pub(crate) completed_at: String,
    pub(crate) final_file_ref: Option<String>,
    pub(crate) card_number: Option<String>,
}

impl ArchiveResponse {
    pub(crate) fn from_db(record: ArchiveRecord) -> Self {
        Self {
            id: record.id,
            proposal_id: record.proposal_id,
            status: record.status,
            completed_at: format_primitive(record.completed_at),
            final_file_ref: record.final_file_ref,
            card_number: record.card_number,
        }
    }
}

/// Progress summary for the student dashboard.
#[derive(Debug, Serialize)]
pub(crate) struct CompletionStatus {
    pub(crate) accepted_chapters: i64,
    pub(crate) required_chapters: i64,
    pub(crate) report_accepted: bool,
    pub(crate) can_finalize: bool,
}
