// src/task/mod.rs

//! The task model.
//!
//! A [`Task`] is a named, parametrized unit of work: it declares its upstream
//! tasks via [`Task::dependencies`], produces exactly one [`Target`], and
//! carries a synchronous work function in [`Task::run`]. The scheduler only
//! invokes `run()` when the output target does not yet report complete.

pub mod params;
pub mod registry;

use std::sync::Arc;

use crate::errors::{DependencyError, WorkError};
use crate::target::Target;

pub use params::{Parameters, TaskId};
pub use registry::TaskRegistry;

/// A named, parametrized unit of work.
///
/// Implementations must be cheap to clone behind an `Arc`; all per-run state
/// lives in the scheduler, not in the task itself.
pub trait Task: Send + Sync {
    /// Stable identifier, distinct per logical unit-of-work type.
    fn name(&self) -> &str;

    /// Parameters of this instance (e.g. `{cohort: "ACC"}` after fan-out).
    fn parameters(&self) -> &Parameters;

    /// Upstream tasks that must be complete before this one can run.
    ///
    /// May be parameter-dependent and dynamically sized (fan-out). The graph
    /// builder evaluates this exactly once per `(name, parameters)` and
    /// memoizes the result; it is never re-evaluated mid-run.
    fn dependencies(&self) -> Result<Vec<Arc<dyn Task>>, DependencyError> {
        Ok(Vec::new())
    }

    /// The single output target of this task.
    fn output(&self) -> Target;

    /// The work function. Must be safe to invoke more than once for the same
    /// parameters (a previous partial write may exist); write idempotence is
    /// owned by the work function, typically via replace semantics against
    /// its sink.
    fn run(&self) -> Result<(), WorkError>;

    /// Graph-node identity: `(name, parameters)`.
    fn id(&self) -> TaskId {
        TaskId::new(self.name(), self.parameters().clone())
    }
}

impl std::fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id().to_string())
            .finish()
    }
}
