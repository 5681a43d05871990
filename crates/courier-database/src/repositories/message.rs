//! Message repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use courier_core::error::{AppError, ErrorKind};
use courier_core::result::AppResult;
use courier_core::types::pagination::{PageRequest, PageResponse};
use courier_entity::message::model::Message;
use courier_entity::message::status::MessageStatus;

/// Store operations the message sender depends on.
///
/// Split out as a trait so the sender can be exercised against an in-memory
/// store in tests. [`MessageRepository`] is the PostgreSQL implementation.
#[async_trait]
pub trait MessageStore: Send + Sync + 'static {
    /// Fetch up to `limit` pending messages, oldest first.
    async fn find_pending(&self, limit: i64) -> AppResult<Vec<Message>>;

    /// Mark a message sent with the provider-assigned identifier.
    async fn mark_sent(
        &self,
        id: Uuid,
        provider_message_id: &str,
        sent_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Mark a message terminally failed.
    async fn mark_failed(&self, id: Uuid) -> AppResult<()>;
}

/// Repository for message CRUD operations.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new message and return the stored row.
    pub async fn create(&self, message: &Message) -> AppResult<Message> {
        sqlx::query_as::<_, Message>(
            "INSERT INTO messages (id, phone_number, content, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(message.id)
        .bind(&message.phone_number)
        .bind(&message.content)
        .bind(message.status)
        .bind(message.created_at)
        .bind(message.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create message", e))
    }

    /// Find a message by its identifier.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Message>> {
        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find message", e))
    }

    /// List messages, newest first.
    pub async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Message>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count messages", e)
            })?;

        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list messages", e))?;

        Ok(PageResponse::new(
            messages,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Update an existing message and return the updated row.
    pub async fn update(&self, message: &Message) -> AppResult<Message> {
        sqlx::query_as::<_, Message>(
            "UPDATE messages SET phone_number = $2, content = $3, status = $4, \
             provider_message_id = $5, sent_at = $6, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(message.id)
        .bind(&message.phone_number)
        .bind(&message.content)
        .bind(message.status)
        .bind(&message.provider_message_id)
        .bind(message.sent_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update message", e))
    }

    /// Delete a message. Returns `true` if a row was removed.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete message", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn find_pending(&self, limit: i64) -> AppResult<Vec<Message>> {
        sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE status = $1 ORDER BY created_at ASC LIMIT $2",
        )
        .bind(MessageStatus::Pending)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list pending messages", e)
        })
    }

    async fn mark_sent(
        &self,
        id: Uuid,
        provider_message_id: &str,
        sent_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE messages SET status = $2, provider_message_id = $3, sent_at = $4, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(MessageStatus::Sent)
        .bind(provider_message_id)
        .bind(sent_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark message sent", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Message {id} not found")));
        }
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE messages SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(MessageStatus::Failed)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to mark message failed", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Message {id} not found")));
        }
        Ok(())
    }
}
