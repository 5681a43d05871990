//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use courier_entity::message::model::Message;
use courier_entity::message::status::MessageStatus;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Message representation returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message ID.
    pub id: Uuid,
    /// Recipient phone number.
    pub phone_number: String,
    /// Message body.
    pub content: String,
    /// Delivery status.
    pub status: MessageStatus,
    /// Provider-assigned identifier, present once sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
    /// Delivery timestamp, present once sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            phone_number: message.phone_number,
            content: message.content,
            status: message.status,
            provider_message_id: message.provider_message_id,
            sent_at: message.sent_at,
            created_at: message.created_at,
            updated_at: message.updated_at,
        }
    }
}

/// Sender running state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderStatusResponse {
    /// Whether the sender job is running.
    pub running: bool,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessageResponse {
    /// Message.
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}

/// Detailed health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status.
    pub status: String,
    /// Database connectivity.
    pub database: String,
    /// Cache connectivity (or "disabled").
    pub cache: String,
    /// Whether the sender job is running.
    pub sender_running: bool,
}
