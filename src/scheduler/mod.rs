//! Periodic task scheduling.
//!
//! # Data Flow
//! ```text
//! register(task)
//!     → interval.rs (offset to next epoch-aligned boundary)
//!     → tokio task: sleep(offset) → run → every `interval` → run ...
//!     → each run isolated in its own spawned task
//! ```
//!
//! # Design Decisions
//! - First run is phase-aligned to wall-clock multiples of the interval, so
//!   tasks with the same interval tick together across restarts
//! - A failed or panicking run is logged and the schedule continues
//! - No cancellation: tasks live as long as the runtime. A caller that needs
//!   to stop one turns its action into a no-op
//! - Runs of one task never overlap; a slow run delays the next tick

pub mod interval;

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::observability::metrics;

pub use interval::{initial_delay, interval_from_unit, parse_interval};

/// Errors raised while building a schedule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("invalid interval '{0}'")]
    InvalidInterval(String),
    #[error("invalid time unit '{0}'")]
    InvalidUnit(String),
    #[error("interval must be greater than zero")]
    ZeroInterval,
}

/// Failure of a single task run.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TaskError(pub String);

/// A recurring unit of work.
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Name used in logs and metrics.
    fn name(&self) -> &str;

    /// Fixed period between runs.
    fn interval(&self) -> Duration;

    /// Perform one run.
    async fn run(&self) -> Result<(), TaskError>;
}

/// Drives registered tasks on epoch-aligned intervals.
#[derive(Default)]
pub struct Scheduler {
    registered: AtomicUsize,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start running `task` for the lifetime of the runtime.
    pub fn register(&self, task: Arc<dyn Task>) {
        let interval = task.interval();
        let offset = initial_delay(SystemTime::now(), interval);

        tracing::info!(
            task = task.name(),
            interval_ms = interval.as_millis() as u64,
            "[SCHEDULER] Task {} will run in {}s",
            task.name(),
            offset.as_secs()
        );

        self.registered.fetch_add(1, Ordering::Relaxed);
        tokio::spawn(drive(task, offset, interval));
    }

    /// Number of tasks registered so far.
    pub fn registered(&self) -> usize {
        self.registered.load(Ordering::Relaxed)
    }
}

async fn drive(task: Arc<dyn Task>, offset: Duration, interval: Duration) {
    let mut ticker = time::interval_at(Instant::now() + offset, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        run_once(&task).await;
    }
}

/// Run the task once in its own spawned task so a panic stays contained.
async fn run_once(task: &Arc<dyn Task>) -> bool {
    let runner = Arc::clone(task);
    match tokio::spawn(async move { runner.run().await }).await {
        Ok(Ok(())) => {
            tracing::trace!(task = task.name(), "Task run finished");
            true
        }
        Ok(Err(e)) => {
            tracing::error!(task = task.name(), error = %e, "Task run failed");
            metrics::record_task_failure(task.name());
            false
        }
        Err(e) => {
            tracing::error!(task = task.name(), error = %e, "Task run panicked");
            metrics::record_task_failure(task.name());
            false
        }
    }
}
