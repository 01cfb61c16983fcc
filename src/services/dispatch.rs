//! Post-commit side effects of workflow transitions.
//!
//! Engine operations return a [`TransitionRecord`] describing what happened;
//! the handler passes it here after the transaction commits. Everything in
//! this module is best effort. A lost notification or activity row must never
//! fail a request whose state change is already durable.

use serde_json::json;
use uuid::Uuid;

use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::db::models::SupervisionMessage;
use crate::repositories;

#[derive(Debug)]
pub(crate) struct NotificationDraft {
    pub person_id: String,
    pub title: String,
    pub body: String,
}

/// What a committed transition wants the outside world to know.
#[derive(Debug)]
pub(crate) struct TransitionRecord {
    pub actor_id: String,
    pub proposal_id: Option<String>,
    pub description: String,
    pub notifications: Vec<NotificationDraft>,
}

impl TransitionRecord {
    pub(crate) fn new(actor_id: &str, proposal_id: Option<&str>, description: String) -> Self {
        Self {
            actor_id: actor_id.to_string(),
            proposal_id: proposal_id.map(str::to_string),
            description,
            notifications: Vec::new(),
        }
    }

    pub(crate) fn notify(mut self, person_id: &str, title: &str, body: String) -> Self {
        self.notifications.push(NotificationDraft {
            person_id: person_id.to_string(),
            title: title.to_string(),
            body,
        });
        self
    }
}

/// Writes the activity log entry and fans notifications out to their
/// recipients, mirroring each one onto the recipient's Redis channel for
/// connected clients.
pub(crate) async fn emit(state: &AppState, record: TransitionRecord) {
    metrics::counter!("workflow_transitions_total").increment(1);
    let now = primitive_now_utc();

    if let Err(err) = repositories::activity::insert(
        state.db(),
        &Uuid::new_v4().to_string(),
        &record.actor_id,
        record.proposal_id.as_deref(),
        &record.description,
        now,
    )
    .await
    {
        tracing::error!(error = %err, "failed to write activity log entry");
    }

    for draft in &record.notifications {
        let stored = repositories::notifications::insert(
            state.db(),
            &Uuid::new_v4().to_string(),
            &draft.person_id,
            record.proposal_id.as_deref(),
            &draft.title,
            &draft.body,
            now,
        )
        .await;

        let stored = match stored {
            Ok(notification) => notification,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    person_id = %draft.person_id,
                    "failed to store notification"
                );
                continue;
            }
        };

        metrics::counter!("notifications_sent_total").increment(1);

        let payload = json!({
            "type": "notification",
            "id": stored.id,
            "proposalId": stored.proposal_id,
            "title": stored.title,
            "body": stored.body,
            "createdAt": format_primitive(stored.created_at),
        });
        let channel = format!("person:{}", draft.person_id);
        if let Err(err) = state.redis().publish(&channel, &payload.to_string()).await {
            tracing::warn!(error = %err, channel = %channel, "notification publish failed");
        }
    }
}

/// Mirrors a stored supervision message onto the proposal's channel so both
/// sides of the conversation see it without polling.
pub(crate) async fn publish_message(state: &AppState, message: &SupervisionMessage) {
    let payload = json!({
        "type": "message",
        "id": message.id,
        "proposalId": message.proposal_id,
        "senderId": message.sender_id,
        "body": message.body,
        "createdAt": format_primitive(message.created_at),
    });
    let channel = format!("proposal:{}", message.proposal_id);
    if let Err(err) = state.redis().publish(&channel, &payload.to_string()).await {
        tracing::warn!(error = %err, channel = %channel, "message publish failed");
    }
}
