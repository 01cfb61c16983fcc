use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{
    ArchiveStatus, ChapterStatus, PersonRole, ProposalStatus, ReportSlot, ReportStatus,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Person {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) hashed_password: String,
    pub(crate) full_name: String,
    pub(crate) role: PersonRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Period {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) academic_year: String,
    pub(crate) is_active: bool,
    pub(crate) advisor_quota: i32,
    pub(crate) card_number_format: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Proposal {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) title: String,
    pub(crate) topic: String,
    pub(crate) status: ProposalStatus,
    pub(crate) review_reason: Option<String>,
    pub(crate) primary_advisor_id: Option<String>,
    pub(crate) secondary_advisor_id: Option<String>,
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) approved_at: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

impl Proposal {
    pub(crate) fn advisor_ids(&self) -> Vec<&str> {
        self.primary_advisor_id
            .iter()
            .chain(self.secondary_advisor_id.iter())
            .map(String::as_str)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ChapterSubmission {
    pub(crate) id: String,
    pub(crate) proposal_id: String,
    pub(crate) chapter_number: i32,
    pub(crate) status: ChapterStatus,
    pub(crate) file_ref: String,
    pub(crate) review_notes: Option<String>,
    pub(crate) reviewed_by: Option<String>,
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) reviewed_at: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct FinalReport {
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
    pub(crate) verified_at: Option<PrimitiveDateTime>,
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

impl FinalReport {
    pub(crate) fn slot_ref(&self, slot: ReportSlot) -> Option<&str> {
        match slot {
            ReportSlot::FinalText => self.final_text_ref.as_deref(),
            ReportSlot::Abstract => self.abstract_ref.as_deref(),
            ReportSlot::ApprovalSheet => self.approval_sheet_ref.as_deref(),
            ReportSlot::StatementSheet => self.statement_sheet_ref.as_deref(),
            ReportSlot::Presentation => self.presentation_ref.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct SupervisionCard {
    pub(crate) id: String,
    pub(crate) proposal_id: String,
    pub(crate) card_number: String,
    pub(crate) meeting_count: i64,
    pub(crate) issued_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ArchiveRecord {
    pub(crate) id: String,
    pub(crate) proposal_id: String,
    pub(crate) status: ArchiveStatus,
    pub(crate) completed_at: PrimitiveDateTime,
    pub(crate) final_file_ref: Option<String>,
    pub(crate) card_number: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ActivityLogEntry {
    pub(crate) id: String,
    pub(crate) actor_id: String,
    pub(crate) proposal_id: Option<String>,
    pub(crate) description: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Notification {
    pub(crate) id: String,
    pub(crate) person_id: String,
    pub(crate) proposal_id: Option<String>,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) is_read: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct SupervisionMessage {
    pub(crate) id: String,
    pub(crate) proposal_id: String,
    pub(crate) sender_id: String,
    pub(crate) body: String,
    pub(crate) created_at: PrimitiveDateTime,
}
