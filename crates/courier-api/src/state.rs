//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use courier_cache::CacheManager;
use courier_core::config::AppConfig;
use courier_service::message::MessageService;
use courier_worker::SenderJob;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Cache manager; `None` when the cache is disabled.
    pub cache: Option<Arc<CacheManager>>,
    /// Message CRUD service.
    pub message_service: Arc<MessageService>,
    /// Background message sender.
    pub sender_job: Arc<SenderJob>,
}
