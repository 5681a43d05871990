//! Message CRUD business logic.

pub mod service;

pub use service::{MessageService, MessageUpdate, NewMessage};
