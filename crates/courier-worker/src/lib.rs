//! # courier-worker
//!
//! Background execution for Courier:
//! - A generic interval scheduler with safe lifecycle control
//! - The message sender job that binds the scheduler to the batch sender

pub mod job;
pub mod scheduler;

pub use job::SenderJob;
pub use scheduler::{IntervalScheduler, Job, Scheduler, SchedulerError};
