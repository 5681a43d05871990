//! Batch message sending.

pub mod cache;
pub mod service;

pub use cache::{CachedMessage, SentMessageCache};
pub use service::SenderService;
