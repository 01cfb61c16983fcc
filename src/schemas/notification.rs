use serde::Serialize;

use crate::core::time::format_primitive;
use crate::db::models::{ActivityLogEntry, Notification};

#[derive(Debug, Serialize)]
pub(crate) struct NotificationResponse {
    pub(crate) id: String,
    pub(crate) proposal_id: Option<String>,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) is_read: bool,
    pub(crate) created_at: String,
}

impl NotificationResponse {
    pub(crate) fn from_db(notification: Notification) -> Self {
        Self {
            id: notification.id,
            proposal_id: notification.proposal_id,
            title: notification.title,
            body: notification.body,
            is_read: notification.is_read,
            created_at: format_primitive(notification.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ActivityResponse {
    pub(crate) id: String,
    pub(crate) actor_id: String,
    pub(crate) proposal_id: Option<String>,
    pub(crate) description: String,
    pub(crate) created_at: String,
}

impl ActivityResponse {
    pub(crate) fn from_db(entry: ActivityLogEntry) -> Self {
        Self {
            id: entry.id,
            actor_id: entry.actor_id,
            proposal_id: entry.proposal_id,
            description: entry.description,
            created_at: format_primitive(entry.created_at),
        }
    }
}
