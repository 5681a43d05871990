//! # courier-entity
//!
//! Domain entity models for Courier.

pub mod message;

pub use message::{Message, MessageStatus};
