//! Cache key builders for all Courier cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

/// Cache key for a sent message, keyed by the provider-assigned identifier.
pub fn sent_message(provider_message_id: &str) -> String {
    format!("message:{provider_message_id}")
}
