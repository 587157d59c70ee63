// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runner talks to an [`ExecutorBackend`] instead of spawning work
//! directly. This makes it easy to swap in a fake executor in tests while
//! keeping the production worker pool here.
//!
//! - [`WorkerPool`] is the production implementation: a semaphore-bounded
//!   pool that runs each work function on a blocking thread and reports
//!   outcomes back over an mpsc channel.
//! - Tests can provide their own backend that records scheduled tasks and
//!   emits [`RunnerEvent`]s directly.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info};

use crate::errors::{FailureCause, Result};
use crate::exec::{ReadyTask, RunnerEvent, TaskOutcome};
use crate::store::CompletionStore;

/// Trait abstracting how ready tasks are executed.
pub trait ExecutorBackend: Send {
    /// Dispatch the given tasks for execution. Each task must eventually
    /// produce exactly one [`RunnerEvent`].
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ReadyTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production executor backend: a bounded worker pool.
///
/// Concurrency is enforced with a semaphore; the queue feeding the pool is
/// unbounded so that dispatching from the runner loop never blocks on
/// backpressure (in-flight work is bounded by the permits, not the queue).
pub struct WorkerPool {
    tx: mpsc::UnboundedSender<ReadyTask>,
}

impl WorkerPool {
    /// Spawn the pool loop, wiring outcomes to the given runner event
    /// sender. `concurrency` is clamped to at least 1.
    pub fn spawn(
        store: Arc<dyn CompletionStore>,
        concurrency: usize,
        runtime_tx: mpsc::Sender<RunnerEvent>,
    ) -> Self {
        let tx = spawn_pool(store, concurrency.max(1), runtime_tx);
        Self { tx }
    }
}

impl ExecutorBackend for WorkerPool {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ReadyTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.tx.clone();

        Box::pin(async move {
            for task in tasks {
                tx.send(task)
                    .map_err(|e| anyhow::anyhow!("worker pool stopped: {e}"))?;
            }
            Ok(())
        })
    }
}

fn spawn_pool(
    store: Arc<dyn CompletionStore>,
    concurrency: usize,
    runtime_tx: mpsc::Sender<RunnerEvent>,
) -> mpsc::UnboundedSender<ReadyTask> {
    let (tx, mut rx) = mpsc::unbounded_channel::<ReadyTask>();

    tokio::spawn(async move {
        info!(concurrency, "worker pool started");

        let semaphore = Arc::new(Semaphore::new(concurrency));

        while let Some(ready) = rx.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(p) => p,
                Err(_) => break,
            };

            let store = store.clone();
            let rt_tx = runtime_tx.clone();

            tokio::spawn(async move {
                let id = ready.id.clone();
                let event = tokio::task::spawn_blocking(move || execute_task(ready, &*store))
                    .await
                    .unwrap_or_else(|join_err| RunnerEvent::TaskFinished {
                        id,
                        outcome: TaskOutcome::Failed(FailureCause::Work(format!(
                            "work function panicked: {join_err}"
                        ))),
                    });

                let _ = rt_tx.send(event).await;
                drop(permit);
            });
        }

        info!("worker pool finished (queue closed)");
    });

    tx
}

/// Execute one task against the completion store.
///
/// - target already complete → SKIPPED, `run()` never invoked
/// - `run()` errors → FAILED, target not marked complete
/// - `run()` ok → target marked complete → SUCCEEDED
///
/// A store failure (other than the duplicate-claim no-op, which
/// `Target::mark_complete` absorbs) is reported separately and aborts the
/// run.
pub fn execute_task(ready: ReadyTask, store: &dyn CompletionStore) -> RunnerEvent {
    let target = ready.task.output();

    match target.exists(store) {
        Err(error) => {
            return RunnerEvent::StoreFailure {
                id: ready.id,
                error,
            };
        }
        Ok(true) => {
            debug!(task = %ready.id, target = %target, "output target complete; skipping");
            return RunnerEvent::TaskFinished {
                id: ready.id,
                outcome: TaskOutcome::Skipped,
            };
        }
        Ok(false) => {}
    }

    info!(task = %ready.id, "running work function");

    match ready.task.run() {
        Err(e) => RunnerEvent::TaskFinished {
            id: ready.id,
            outcome: TaskOutcome::Failed(FailureCause::Work(e.to_string())),
        },
        Ok(()) => match target.mark_complete(store) {
            Err(error) => RunnerEvent::StoreFailure {
                id: ready.id,
                error,
            },
            Ok(()) => RunnerEvent::TaskFinished {
                id: ready.id,
                outcome: TaskOutcome::Succeeded,
            },
        },
    }
}
