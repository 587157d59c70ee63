// src/errors.rs

//! Crate-wide error types and helpers.

use thiserror::Error;

use crate::task::TaskId;

/// Top-level error for an orchestrator run.
#[derive(Error, Debug)]
pub enum DagrunError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cycle detected in task graph: {0}")]
    GraphCycle(String),

    #[error("Task not registered: {0}")]
    TaskNotRegistered(String),

    /// The completion ledger is unreachable or a write failed for a reason
    /// other than a duplicate-key race. Fatal: the run cannot make
    /// trustworthy progress without a working ledger.
    #[error("Completion store error: {0}")]
    CompletionStore(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DagrunError>;

/// Error from a task's work function.
///
/// Recorded on the task and propagated as FAILED to its dependents;
/// unrelated branches of the graph continue.
#[derive(Error, Debug)]
pub enum WorkError {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WorkError {
    pub fn msg(msg: impl Into<String>) -> Self {
        WorkError::Message(msg.into())
    }
}

/// A task's `dependencies()` could not be computed (e.g. a required
/// enumeration source is unavailable). Fatal for that branch only.
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("{0}")]
    Message(String),

    #[error("missing required parameter '{0}'")]
    MissingParameter(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DependencyError {
    pub fn msg(msg: impl Into<String>) -> Self {
        DependencyError::Message(msg.into())
    }
}

/// Error from the completion store itself.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("ledger IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt ledger record at {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Why a task ended up in the `failed` section of the run report.
#[derive(Debug, Clone)]
pub enum FailureCause {
    /// The work function returned an error.
    Work(String),
    /// `dependencies()` could not be computed for this task.
    DependencyResolution(String),
    /// A direct dependency ended in FAILED; this task was never run.
    UpstreamFailed(TaskId),
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCause::Work(msg) => write!(f, "work function failed: {msg}"),
            FailureCause::DependencyResolution(msg) => {
                write!(f, "dependency resolution failed: {msg}")
            }
            FailureCause::UpstreamFailed(id) => write!(f, "upstream task failed: {id}"),
        }
    }
}
