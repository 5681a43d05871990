//! Message CRUD operations over the repository.

use std::sync::Arc;

use uuid::Uuid;

use courier_core::error::AppError;
use courier_core::result::AppResult;
use courier_core::types::pagination::{PageRequest, PageResponse};
use courier_database::repositories::message::MessageRepository;
use courier_entity::message::model::Message;
use courier_entity::message::status::MessageStatus;

/// Input for creating a message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    /// Recipient phone number.
    pub phone_number: String,
    /// Message body.
    pub content: String,
}

/// Partial update of a message; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct MessageUpdate {
    /// New recipient phone number.
    pub phone_number: Option<String>,
    /// New message body.
    pub content: Option<String>,
    /// New delivery status.
    pub status: Option<MessageStatus>,
}

/// Manages message CRUD.
///
/// Messages enter the system pending; the sender owns the transition to
/// sent, so `create` never accepts a status.
#[derive(Debug, Clone)]
pub struct MessageService {
    /// Message repository.
    repo: Arc<MessageRepository>,
}

impl MessageService {
    /// Creates a new message service.
    pub fn new(repo: Arc<MessageRepository>) -> Self {
        Self { repo }
    }

    /// Creates a new pending message.
    pub async fn create(&self, new: NewMessage) -> AppResult<Message> {
        let message = Message::new_pending(new.phone_number, new.content);
        self.repo.create(&message).await
    }

    /// Retrieves a message by ID.
    pub async fn get(&self, id: Uuid) -> AppResult<Message> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Message {id} not found")))
    }

    /// Lists messages, newest first.
    pub async fn list(&self, page: PageRequest) -> AppResult<PageResponse<Message>> {
        self.repo.find_all(&page).await
    }

    /// Applies a partial update to a message.
    pub async fn update(&self, id: Uuid, update: MessageUpdate) -> AppResult<Message> {
        let mut message = self.get(id).await?;

        if let Some(phone_number) = update.phone_number {
            message.phone_number = phone_number;
        }
        if let Some(content) = update.content {
            message.content = content;
        }
        if let Some(status) = update.status {
            message.status = status;
        }

        self.repo.update(&message).await
    }

    /// Deletes a message.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found(format!("Message {id} not found")));
        }
        Ok(())
    }
}
