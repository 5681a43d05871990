//! Generic interval scheduler with safe lifecycle control.
//!
//! The scheduler runs an arbitrary [`Job`] on a fixed interval in a single
//! background task. The job is invoked once immediately on start, then on
//! every tick; missed ticks are dropped rather than queued, so at most one
//! invocation is ever in flight.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, oneshot, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use courier_core::error::{AppError, ErrorKind};
use courier_core::result::AppResult;

/// How long `stop` waits for the execution loop to acknowledge cancellation.
const STOP_GRACE: Duration = Duration::from_secs(5);

/// Scheduler lifecycle and construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// The interval must be positive.
    #[error("Scheduler interval must be positive")]
    InvalidInterval,
    /// `start` was called on a running scheduler.
    #[error("Scheduler is already running")]
    AlreadyRunning,
    /// `stop` was called on a stopped scheduler.
    #[error("Scheduler is not running")]
    NotRunning,
}

impl From<SchedulerError> for AppError {
    fn from(err: SchedulerError) -> Self {
        let kind = match err {
            SchedulerError::InvalidInterval => ErrorKind::Validation,
            SchedulerError::AlreadyRunning | SchedulerError::NotRunning => ErrorKind::Conflict,
        };
        AppError::new(kind, err.to_string())
    }
}

/// A unit of work executed on every tick.
#[async_trait]
pub trait Job: Send + Sync + 'static {
    /// Execute one invocation. An `Err` is logged and the same work is
    /// naturally retried on the next tick.
    async fn execute(&self) -> AppResult<()>;
}

/// Lifecycle control for a ticking executor.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Begin executing the job at the configured interval. Non-blocking.
    async fn start(&self) -> Result<(), SchedulerError>;

    /// Gracefully stop the scheduler, waiting up to a bounded grace period
    /// for the execution loop to finish.
    async fn stop(&self) -> Result<(), SchedulerError>;

    /// Whether the scheduler is currently running.
    async fn is_running(&self) -> bool;
}

/// Mutable lifecycle state, guarded by a single mutex.
struct State {
    running: bool,
    /// Cancellation signal for the current execution loop.
    cancel: Option<watch::Sender<bool>>,
    /// Completion signal from the current execution loop, consumed by `stop`.
    stopped: Option<oneshot::Receiver<()>>,
}

/// Interval-driven scheduler running one background execution loop.
///
/// The cancellation channel is created internally at `start` time and is
/// deliberately independent of any caller-scoped cancellation: a long-lived
/// background job must outlive the short-lived request that started it.
pub struct IntervalScheduler {
    job: Arc<dyn Job>,
    interval: Duration,
    state: Mutex<State>,
}

impl std::fmt::Debug for IntervalScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalScheduler")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl IntervalScheduler {
    /// Create a new scheduler in the stopped state.
    ///
    /// Fails with [`SchedulerError::InvalidInterval`] if the interval is
    /// zero. (A `Duration` cannot be negative, and the job argument is
    /// always present, so those construction failures of the contract are
    /// unrepresentable here.)
    pub fn new(job: Arc<dyn Job>, interval: Duration) -> Result<Self, SchedulerError> {
        if interval.is_zero() {
            return Err(SchedulerError::InvalidInterval);
        }

        Ok(Self {
            job,
            interval,
            state: Mutex::new(State {
                running: false,
                cancel: None,
                stopped: None,
            }),
        })
    }

    /// The main execution loop. Runs once per `start`.
    async fn run_loop(
        job: Arc<dyn Job>,
        interval: Duration,
        mut cancel: watch::Receiver<bool>,
        stopped: oneshot::Sender<()>,
    ) {
        // The first tick completes immediately, so the first batch is
        // processed without waiting a full interval.
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(interval_secs = interval.as_secs_f64(), "Scheduler loop started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    debug!("Tick received, executing job");
                    Self::invoke(&job).await;
                }
                changed = cancel.changed() => {
                    // A closed channel means the scheduler itself was dropped.
                    if changed.is_err() || *cancel.borrow() {
                        info!("Cancellation received, scheduler loop stopping");
                        break;
                    }
                }
            }
        }

        let _ = stopped.send(());
    }

    /// Invoke the job once, containing any fault at this single boundary.
    async fn invoke(job: &Arc<dyn Job>) {
        let job = Arc::clone(job);
        match tokio::spawn(async move { job.execute().await }).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(error = %err, "Job returned error; will retry on next tick");
            }
            Err(join_err) if join_err.is_panic() => {
                error!("Job panicked; scheduler loop continues");
            }
            Err(join_err) => {
                warn!(error = %join_err, "Job task failed to complete");
            }
        }
    }
}

#[async_trait]
impl Scheduler for IntervalScheduler {
    async fn start(&self) -> Result<(), SchedulerError> {
        let mut state = self.state.lock().await;

        if state.running {
            return Err(SchedulerError::AlreadyRunning);
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (stopped_tx, stopped_rx) = oneshot::channel();

        tokio::spawn(Self::run_loop(
            Arc::clone(&self.job),
            self.interval,
            cancel_rx,
            stopped_tx,
        ));

        state.cancel = Some(cancel_tx);
        state.stopped = Some(stopped_rx);
        state.running = true;

        Ok(())
    }

    async fn stop(&self) -> Result<(), SchedulerError> {
        let mut state = self.state.lock().await;

        if !state.running {
            return Err(SchedulerError::NotRunning);
        }

        if let Some(cancel) = state.cancel.take() {
            let _ = cancel.send(true);
        }

        // Bounded grace: the loop may be mid-invocation. The running flag is
        // cleared even when the grace period elapses, matching the observed
        // behavior of the system this was modeled on; the (theoretical)
        // overlap with a subsequent start is documented in DESIGN.md.
        if let Some(stopped) = state.stopped.take() {
            if time::timeout(STOP_GRACE, stopped).await.is_err() {
                warn!(
                    grace_secs = STOP_GRACE.as_secs(),
                    "Scheduler loop did not confirm stop within the grace period"
                );
            }
        }

        state.running = false;
        info!("Scheduler stopped");
        Ok(())
    }

    async fn is_running(&self) -> bool {
        self.state.lock().await.running
    }
}
