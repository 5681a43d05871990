//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use courier_entity::message::status::MessageStatus;

/// Create message request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMessageRequest {
    /// Recipient phone number.
    #[validate(length(min = 1, max = 20, message = "Phone number must be 1-20 characters"))]
    pub phone_number: String,
    /// Message body.
    #[validate(length(min = 1, max = 160, message = "Content must be 1-160 characters"))]
    pub content: String,
}

/// Partial message update request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateMessageRequest {
    /// New recipient phone number.
    #[validate(length(min = 1, max = 20, message = "Phone number must be 1-20 characters"))]
    pub phone_number: Option<String>,
    /// New message body.
    #[validate(length(min = 1, max = 160, message = "Content must be 1-160 characters"))]
    pub content: Option<String>,
    /// New delivery status.
    pub status: Option<MessageStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_create_request_passes() {
        let req = CreateMessageRequest {
            phone_number: "+905551111111".to_string(),
            content: "Your delivery is on its way".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_oversized_content_is_rejected() {
        let req = CreateMessageRequest {
            phone_number: "+905551111111".to_string(),
            content: "x".repeat(161),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_empty_phone_number_is_rejected() {
        let req = CreateMessageRequest {
            phone_number: String::new(),
            content: "hello".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_with_no_fields_is_valid() {
        let req = UpdateMessageRequest {
            phone_number: None,
            content: None,
            status: None,
        };
        assert!(req.validate().is_ok());
    }
}
