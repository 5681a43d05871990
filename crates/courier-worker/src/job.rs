//! Message sender job: binds the batch sender to an interval scheduler.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info};

use courier_core::result::AppResult;
use courier_service::sender::SenderService;

use crate::scheduler::{IntervalScheduler, Job, Scheduler, SchedulerError};

/// One sending cycle, executed by the scheduler on every tick.
struct SenderCycle {
    sender: Arc<SenderService>,
}

#[async_trait]
impl Job for SenderCycle {
    async fn execute(&self) -> AppResult<()> {
        info!("Message sending cycle started");

        if let Err(err) = self.sender.send_pending_messages().await {
            error!(error = %err, "Message sending cycle failed");
            return Err(err);
        }

        info!("Message sending cycle completed");
        Ok(())
    }
}

/// Scheduled background delivery of pending messages.
///
/// Thin adapter over [`IntervalScheduler`]: no logic of its own beyond
/// delegation and cycle-boundary logging. The HTTP control surface maps
/// onto `start`/`stop`/`is_running` 1:1.
pub struct SenderJob {
    scheduler: IntervalScheduler,
}

impl std::fmt::Debug for SenderJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SenderJob").finish_non_exhaustive()
    }
}

impl SenderJob {
    /// Create the sender job with its scheduler.
    pub fn new(sender: Arc<SenderService>, interval: Duration) -> Result<Self, SchedulerError> {
        let cycle = Arc::new(SenderCycle { sender });
        let scheduler = IntervalScheduler::new(cycle, interval)?;
        Ok(Self { scheduler })
    }

    /// Start scheduled sending.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        info!("Starting message sender");
        self.scheduler.start().await
    }

    /// Stop scheduled sending.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        info!("Stopping message sender");
        self.scheduler.stop().await
    }

    /// Whether the sender is currently running.
    pub async fn is_running(&self) -> bool {
        self.scheduler.is_running().await
    }
}
