use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "personrole", rename_all = "lowercase")]
pub(crate) enum PersonRole {
    Student,
    Advisor,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "proposalstatus", rename_all = "snake_case")]
pub(crate) enum ProposalStatus {
    Draft,
    Submitted,
    Accepted,
    RevisionRequested,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "chapterstatus", rename_all = "snake_case")]
pub(crate) enum ChapterStatus {
    Pending,
    RevisionRequested,
    Accepted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "reportstatus", rename_all = "snake_case")]
pub(crate) enum ReportStatus {
    Pending,
    RevisionRequested,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "archivestatus", rename_all = "snake_case")]
pub(crate) enum ArchiveStatus {
    Completed,
    Graduated,
    NeedsRework,
}

/// The five independent file slots of a final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ReportSlot {
    FinalText,
    Abstract,
    ApprovalSheet,
    StatementSheet,
    Presentation,
}

impl ReportSlot {
    /// Column holding this slot's file reference. Only these static names
    /// are ever interpolated into SQL.
    pub(crate) fn column(self) -> &'static str {
        match self {
            ReportSlot::FinalText => "final_text_ref",
            ReportSlot::Abstract => "abstract_ref",
            ReportSlot::ApprovalSheet => "approval_sheet_ref",
            ReportSlot::StatementSheet => "statement_sheet_ref",
            ReportSlot::Presentation => "presentation_ref",
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ReportSlot::FinalText => "final_text",
            ReportSlot::Abstract => "abstract",
            ReportSlot::ApprovalSheet => "approval_sheet",
            ReportSlot::StatementSheet => "statement_sheet",
            ReportSlot::Presentation => "presentation",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "final_text" => Some(ReportSlot::FinalText),
            "abstract" => Some(ReportSlot::Abstract),
            "approval_sheet" => Some(ReportSlot::ApprovalSheet),
            "statement_sheet" => Some(ReportSlot::StatementSheet),
            "presentation" => Some(ReportSlot::Presentation),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReportSlot;

    #[test]
    fn report_slot_parse_roundtrip() {
        for slot in [
            ReportSlot::FinalText,
            ReportSlot::Abstract,
            ReportSlot::ApprovalSheet,
            ReportSlot::StatementSheet,
            ReportSlot::Presentation,
        ] {
            assert_eq!(ReportSlot::parse(slot.as_str()), Some(slot));
        }
        assert_eq!(ReportSlot::parse("appendix"), None);
    }
}
