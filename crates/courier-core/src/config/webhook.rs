//! Webhook transport configuration.

use serde::{Deserialize, Serialize};

/// Outbound webhook client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Endpoint URL messages are delivered to.
    pub url: String,
    /// Value sent in the `x-auth-key` request header.
    #[serde(default)]
    pub auth_key: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Maximum retries for connection-level failures (0 = no retry).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}
