//! Repository implementations.

pub mod message;

pub use message::{MessageRepository, MessageStore};
