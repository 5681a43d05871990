//! # courier-service
//!
//! Business logic for Courier: message CRUD ([`message::MessageService`])
//! and the batch sender ([`sender::SenderService`]) that delivers pending
//! messages to the webhook provider.

pub mod message;
pub mod sender;

pub use message::MessageService;
pub use sender::SenderService;
