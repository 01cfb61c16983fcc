use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::SupervisionMessage;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct MessageCreate {
    #[validate(length(min = 1, max = 4000, message = "body must be 1 to 4000 characters"))]
    pub(crate) body: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    pub(crate) id: String,
    pub(crate) proposal_id: String,
    pub(crate) sender_id: String,
    pub(crate) body: String,
    pub(crate) created_at: String,
}

impl MessageResponse {
    pub(crate) fn from_db(message: SupervisionMessage) -> Self {
        Self {
            id: message.id,
            proposal_id: message.proposal_id,
            sender_id: message.sender_id,
            body: message.body,
            created_at: format_primitive(message.created_at),
        }
    }
}
