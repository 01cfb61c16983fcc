use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::ChapterSubmission;
use crate::db::types::ChapterStatus;
use crate::services::workflow::ReviewDecision;

#[derive(Debug, Deserialize)]
pub(crate) struct ChapterReview {
    pub(crate) decision: ReviewDecision,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChapterResponse {
    pub(crate) id: String,
    pub(crate) proposal_id: String,
    pub(crate) chapter_number: i32,
    pub(crate) status: ChapterStatus,
    pub(crate) file_ref: String,
    pub(crate) review_notes: Option<String>,
    pub(crate) reviewed_by: Option<String>,
    pub(crate) submitted_at: String,
    pub(crate) reviewed_at: Option<String>,
}

impl ChapterResponse {
    pub(crate) fn from_db(chapter: ChapterSubmission) -> Self {
        Self {
            id: chapter.id,
            proposal_id: chapter.proposal_id,
            chapter_number: chapter.chapter_number,
            status: chapter.status,
            file_ref: chapter.file_ref,
            review_notes: chapter.review_notes,
            reviewed_by: chapter.reviewed_by,
            submitted_at: format_primitive(chapter.submitted_at),
            reviewed_at: chapter.reviewed_at.map(format_primitive),
        }
    }
}
