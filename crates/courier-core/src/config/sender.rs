//! Message sender job configuration.

use serde::{Deserialize, Serialize};

/// Background message sender configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderConfig {
    /// Whether the sender job starts automatically on boot.
    #[serde(default = "default_true")]
    pub auto_start: bool,
    /// Interval in seconds between sending cycles.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    /// Number of messages fetched per cycle.
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
    /// What to do with a message whose dispatch fails.
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            auto_start: default_true(),
            interval_seconds: default_interval(),
            batch_size: default_batch_size(),
            on_failure: FailurePolicy::default(),
        }
    }
}

/// Policy applied to a message whose dispatch fails.
///
/// `Requeue` leaves the message pending so the next cycle retries it
/// indefinitely; `MarkFailed` moves it to a terminal failed status so a
/// permanently-invalid message (e.g. a malformed recipient) cannot be
/// retried forever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Leave the message pending; it is retried on the next cycle.
    #[default]
    Requeue,
    /// Mark the message failed; it is never fetched again.
    MarkFailed,
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    120
}

fn default_batch_size() -> i64 {
    2
}
