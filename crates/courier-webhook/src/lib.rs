//! # courier-webhook
//!
//! Outbound webhook transport for Courier. Exposes the [`WebhookTransport`]
//! trait consumed by the sender, plus the [`WebhookClient`] implementation
//! built on reqwest.

pub mod client;

pub use client::{DeliveryReceipt, SendMessage, WebhookClient, WebhookTransport};
