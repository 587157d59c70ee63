// src/exec/mod.rs

//! Scheduling and execution.
//!
//! The pure per-run state machine lives in [`scheduler`]; it owns the graph
//! and the task states and has no channels, no Tokio types, and performs no
//! IO. The async shell in [`runner`] feeds it events and dispatches ready
//! tasks to an [`ExecutorBackend`]; the production backend in [`backend`]
//! bounds parallelism with a semaphore and runs work functions on blocking
//! threads.

pub mod backend;
pub mod runner;
pub mod scheduler;

use std::sync::Arc;

use crate::errors::{FailureCause, StoreError};
use crate::task::{Task, TaskId};

pub use backend::{ExecutorBackend, WorkerPool};
pub use runner::{Runner, run_tasks};
pub use scheduler::{Scheduler, SchedulerStep, TaskState};

/// A task the scheduler has marked RUNNING and wants executed now.
#[derive(Clone)]
pub struct ReadyTask {
    pub id: TaskId,
    pub task: Arc<dyn Task>,
}

impl std::fmt::Debug for ReadyTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadyTask")
            .field("id", &self.id.to_string())
            .finish()
    }
}

/// Terminal outcome of executing (or skipping) one task.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    /// The output target already reported complete; `run()` was not invoked.
    Skipped,
    /// `run()` returned Ok and the target was marked complete.
    Succeeded,
    /// `run()` failed; the target was not marked complete.
    Failed(FailureCause),
}

/// Events flowing from workers back into the runner loop.
#[derive(Debug)]
pub enum RunnerEvent {
    /// A task reached a terminal outcome.
    TaskFinished { id: TaskId, outcome: TaskOutcome },
    /// The completion store failed for a reason other than a duplicate-key
    /// race. Fatal for the whole run.
    StoreFailure { id: TaskId, error: StoreError },
}
