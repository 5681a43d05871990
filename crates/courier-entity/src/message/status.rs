//! Message status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery status of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Waiting to be picked up by the sender.
    Pending,
    /// Confirmed delivered to the webhook provider.
    Sent,
    /// Terminally failed (only reachable under the mark-failed policy).
    Failed,
}

impl MessageStatus {
    /// Check if the message can still be dispatched.
    pub fn is_dispatchable(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&MessageStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        let back: MessageStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MessageStatus::Pending);
    }

    #[test]
    fn test_only_pending_is_dispatchable() {
        assert!(MessageStatus::Pending.is_dispatchable());
        assert!(!MessageStatus::Sent.is_dispatchable());
        assert!(!MessageStatus::Failed.is_dispatchable());
    }
}
