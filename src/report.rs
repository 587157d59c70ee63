// src/report.rs

//! Run report: the single user-visible surface for run outcomes.

use std::fmt;

use serde::Serialize;

use crate::errors::FailureCause;
use crate::task::TaskId;

/// A task that ended in FAILED, with its cause.
#[derive(Debug, Clone, Serialize)]
pub struct FailedTask {
    pub id: TaskId,
    #[serde(serialize_with = "serialize_cause")]
    pub cause: FailureCause,
}

fn serialize_cause<S: serde::Serializer>(
    cause: &FailureCause,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(cause)
}

/// Aggregate record of one orchestrator invocation.
///
/// The three sequences are disjoint and ordered by the graph's deterministic
/// topological order; the report is immutable once returned.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Tasks whose output target already reported complete; `run()` was
    /// never invoked.
    pub skipped: Vec<TaskId>,
    /// Tasks that ran and whose target was marked complete.
    pub succeeded: Vec<TaskId>,
    /// Tasks that failed, directly or through an upstream failure.
    pub failed: Vec<FailedTask>,
}

impl RunReport {
    /// Whether the driving process should exit zero.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.skipped.len() + self.succeeded.len() + self.failed.len()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "run finished: {} skipped, {} succeeded, {} failed ({} tasks)",
            self.skipped.len(),
            self.succeeded.len(),
            self.failed.len(),
            self.total(),
        )?;

        for id in &self.skipped {
            writeln!(f, "  skipped   {id}")?;
        }
        for id in &self.succeeded {
            writeln!(f, "  succeeded {id}")?;
        }
        for failed in &self.failed {
            writeln!(f, "  FAILED    {}: {}", failed.id, failed.cause)?;
        }

        Ok(())
    }
}
