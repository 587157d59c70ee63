// src/exec/scheduler.rs

//! Pure per-run scheduler state machine.
//!
//! State machine per task: `PENDING → SKIPPED | RUNNING → SUCCEEDED | FAILED`.
//!
//! The scheduler is responsible for:
//! - deciding when a task is ready to run (all dependencies SKIPPED or
//!   SUCCEEDED)
//! - recording terminal outcomes reported by workers
//! - failing dependents when a task fails, without touching unrelated
//!   branches
//! - assembling the run report once every task is terminal
//!
//! It never retries: rerunning with the same roots relies on completed
//! targets being skipped.

use tracing::{debug, info, warn};

use crate::dag::{NodeId, TaskGraph};
use crate::errors::FailureCause;
use crate::exec::{ReadyTask, TaskOutcome};
use crate::report::{FailedTask, RunReport};
use crate::task::TaskId;

/// Per-task state during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Skipped,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Skipped | TaskState::Succeeded | TaskState::Failed)
    }

    /// Whether this state satisfies a dependent.
    fn satisfies(self) -> bool {
        matches!(self, TaskState::Skipped | TaskState::Succeeded)
    }
}

/// Structured result of a single scheduler step.
#[derive(Debug)]
pub struct SchedulerStep {
    /// Tasks that became ready to run as a result of this step.
    pub newly_ready: Vec<ReadyTask>,
    /// Tasks newly marked FAILED in this step (the failed task itself plus
    /// any poisoned dependents).
    pub newly_failed: Vec<TaskId>,
}

/// Scheduler holds the immutable graph plus mutable per-run state.
#[derive(Debug)]
pub struct Scheduler {
    graph: TaskGraph,
    /// Deterministic topological order; ready tasks are collected in this
    /// order so dispatch is reproducible given identical inputs.
    order: Vec<NodeId>,
    states: Vec<TaskState>,
    causes: Vec<Option<FailureCause>>,
}

impl Scheduler {
    pub fn new(graph: TaskGraph) -> Self {
        let order = graph.topological_order();
        let states = vec![TaskState::Pending; graph.len()];
        let causes = vec![None; graph.len()];
        Self {
            graph,
            order,
            states,
            causes,
        }
    }

    /// Begin the run: fail branches whose dependency resolution already
    /// failed during expansion, then collect the initially ready tasks.
    pub fn start(&mut self) -> SchedulerStep {
        let mut newly_failed = Vec::new();

        for n in self.order.clone() {
            if self.states[n] != TaskState::Pending {
                continue;
            }
            if let Some(err) = self.graph.node(n).resolution_error.clone() {
                self.fail_node(n, FailureCause::DependencyResolution(err), &mut newly_failed);
            }
        }

        SchedulerStep {
            newly_ready: self.collect_ready(),
            newly_failed,
        }
    }

    /// Record the terminal outcome of a task the scheduler marked RUNNING.
    pub fn record_outcome(&mut self, id: &TaskId, outcome: TaskOutcome) -> SchedulerStep {
        let Some(n) = self.graph.node_id(id) else {
            warn!(task = %id, "outcome for unknown task; ignoring");
            return SchedulerStep {
                newly_ready: Vec::new(),
                newly_failed: Vec::new(),
            };
        };

        if self.states[n] != TaskState::Running {
            warn!(task = %id, state = ?self.states[n], "outcome for task not in RUNNING state; ignoring");
            return SchedulerStep {
                newly_ready: Vec::new(),
                newly_failed: Vec::new(),
            };
        }

        let mut newly_failed = Vec::new();

        match outcome {
            TaskOutcome::Skipped => {
                debug!(task = %id, "target already complete; task skipped");
                self.states[n] = TaskState::Skipped;
            }
            TaskOutcome::Succeeded => {
                debug!(task = %id, "task succeeded");
                self.states[n] = TaskState::Succeeded;
            }
            TaskOutcome::Failed(cause) => {
                warn!(task = %id, cause = %cause, "task failed; failing dependents");
                self.fail_node(n, cause, &mut newly_failed);
            }
        }

        SchedulerStep {
            newly_ready: self.collect_ready(),
            newly_failed,
        }
    }

    /// Whether every task has reached a terminal state.
    pub fn all_terminal(&self) -> bool {
        self.states.iter().all(|s| s.is_terminal())
    }

    /// Read-only view of a task's state (tests, diagnostics).
    pub fn state_of(&self, id: &TaskId) -> Option<TaskState> {
        self.graph.node_id(id).map(|n| self.states[n])
    }

    /// Consume the scheduler and build the immutable run report, ordered by
    /// the deterministic topological order.
    pub fn into_report(self) -> RunReport {
        debug_assert!(self.all_terminal());

        let mut report = RunReport::default();
        for &n in &self.order {
            let id = self.graph.node(n).id.clone();
            match self.states[n] {
                TaskState::Skipped => report.skipped.push(id),
                TaskState::Succeeded => report.succeeded.push(id),
                TaskState::Failed => {
                    let cause = self.causes[n]
                        .clone()
                        .unwrap_or_else(|| FailureCause::Work("unknown failure".into()));
                    report.failed.push(FailedTask { id, cause });
                }
                TaskState::Pending | TaskState::Running => {
                    // Only reachable if the runner aborted mid-run.
                    warn!(task = %id, "task never reached a terminal state");
                }
            }
        }
        report
    }

    /// PENDING tasks whose dependencies are all satisfied transition to
    /// RUNNING and are handed to the executor.
    fn collect_ready(&mut self) -> Vec<ReadyTask> {
        let mut ready = Vec::new();

        for &n in &self.order {
            if self.states[n] != TaskState::Pending {
                continue;
            }

            let node = self.graph.node(n);
            let satisfied = node.deps.iter().all(|&d| self.states[d].satisfies());
            if !satisfied {
                continue;
            }

            info!(task = %node.id, "dependencies satisfied; dispatching");
            self.states[n] = TaskState::Running;
            ready.push(ReadyTask {
                id: node.id.clone(),
                task: node.task.clone(),
            });
        }

        ready
    }

    /// Mark a node FAILED with the given cause and poison all its PENDING
    /// transitive dependents. Each poisoned task's cause names its immediate
    /// failed dependency, so the report reads as a chain.
    fn fail_node(&mut self, n: NodeId, cause: FailureCause, newly_failed: &mut Vec<TaskId>) {
        self.states[n] = TaskState::Failed;
        self.causes[n] = Some(cause);
        newly_failed.push(self.graph.node(n).id.clone());

        let mut stack: Vec<(NodeId, NodeId)> = self
            .graph
            .node(n)
            .dependents
            .iter()
            .map(|&d| (d, n))
            .collect();

        while let Some((d, failed_dep)) = stack.pop() {
            if self.states[d] != TaskState::Pending {
                continue;
            }

            let upstream = self.graph.node(failed_dep).id.clone();
            debug!(
                task = %self.graph.node(d).id,
                upstream = %upstream,
                "failing dependent due to upstream failure"
            );
            self.states[d] = TaskState::Failed;
            self.causes[d] = Some(FailureCause::UpstreamFailed(upstream));
            newly_failed.push(self.graph.node(d).id.clone());

            stack.extend(self.graph.node(d).dependents.iter().map(|&dd| (dd, d)));
        }
    }
}
