//! Message entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::MessageStatus;

/// A message queued for delivery to the webhook provider.
///
/// Invariant: `provider_message_id` and `sent_at` are populated if and only
/// if `status` is [`MessageStatus::Sent`]. Messages are created pending and
/// transitioned to sent exclusively by the sender after a confirmed
/// delivery, never back.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Unique message identifier.
    pub id: Uuid,
    /// Recipient phone number.
    pub phone_number: String,
    /// Message body.
    pub content: String,
    /// Current delivery status.
    pub status: MessageStatus,
    /// Identifier assigned by the webhook provider on delivery.
    pub provider_message_id: Option<String>,
    /// When the message was confirmed delivered.
    pub sent_at: Option<DateTime<Utc>>,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
    /// When the message was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Message {
    /// Create a new pending message.
    pub fn new_pending(phone_number: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            phone_number: phone_number.into(),
            content: content.into(),
            status: MessageStatus::Pending,
            provider_message_id: None,
            sent_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pending_has_no_delivery_fields() {
        let message = Message::new_pending("+905551111111", "hello");
        assert_eq!(message.status, MessageStatus::Pending);
        assert!(message.provider_message_id.is_none());
        assert!(message.sent_at.is_none());
    }
}
