// src/exec/runner.rs

//! Async shell driving the pure scheduler core.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::dag::GraphBuilder;
use crate::errors::{DagrunError, Result};
use crate::exec::backend::{ExecutorBackend, WorkerPool};
use crate::exec::scheduler::Scheduler;
use crate::exec::{ReadyTask, RunnerEvent};
use crate::report::RunReport;
use crate::store::CompletionStore;
use crate::task::Task;

/// Drives the scheduler in response to [`RunnerEvent`]s and delegates task
/// execution to an [`ExecutorBackend`].
///
/// This is a pure IO shell around [`Scheduler`], which contains all the
/// scheduling semantics. The shell reads events from a channel and
/// dispatches ready tasks to the executor.
pub struct Runner<E: ExecutorBackend> {
    core: Scheduler,
    event_rx: mpsc::Receiver<RunnerEvent>,
    executor: E,
}

impl<E: ExecutorBackend> Runner<E> {
    pub fn new(core: Scheduler, event_rx: mpsc::Receiver<RunnerEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
        }
    }

    /// Main event loop.
    ///
    /// Runs until every reachable task is terminal, then returns the run
    /// report. A completion-store failure aborts immediately.
    pub async fn run(mut self) -> Result<RunReport> {
        info!("run started");

        let step = self.core.start();
        self.dispatch(step.newly_ready).await?;

        while !self.core.all_terminal() {
            let event = self.event_rx.recv().await.ok_or_else(|| {
                DagrunError::Other(anyhow::anyhow!(
                    "runner event channel closed before the run completed"
                ))
            })?;

            debug!(?event, "runner received event");

            match event {
                RunnerEvent::TaskFinished { id, outcome } => {
                    let step = self.core.record_outcome(&id, outcome);
                    self.dispatch(step.newly_ready).await?;
                }
                RunnerEvent::StoreFailure { id, error } => {
                    error!(task = %id, error = %error, "completion store failure; aborting run");
                    return Err(DagrunError::CompletionStore(error));
                }
            }
        }

        let report = self.core.into_report();
        info!(
            skipped = report.skipped.len(),
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "run finished"
        );
        Ok(report)
    }

    async fn dispatch(&mut self, tasks: Vec<ReadyTask>) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }

        let names: Vec<_> = tasks.iter().map(|t| t.id.to_string()).collect();
        debug!(?names, "dispatching ready tasks");

        self.executor.spawn_ready_tasks(tasks).await
    }
}

/// Build the graph from the given roots and run it to completion against the
/// given completion store with a bounded worker pool.
///
/// This is the production wiring used by the CLI; tests that want to control
/// execution construct a [`Runner`] with their own backend instead.
pub async fn run_tasks(
    roots: Vec<Arc<dyn Task>>,
    store: Arc<dyn CompletionStore>,
    concurrency: usize,
) -> Result<RunReport> {
    let graph = GraphBuilder::build(roots)?;
    info!(tasks = graph.len(), concurrency, "task graph built");

    let (rt_tx, rt_rx) = mpsc::channel::<RunnerEvent>(64);
    let executor = WorkerPool::spawn(store, concurrency, rt_tx);

    Runner::new(Scheduler::new(graph), rt_rx, executor).run().await
}
