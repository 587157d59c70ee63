// tests/runner_fake_executor.rs

mod common;
use crate::common::builders::TaskBuilder;
use crate::common::init_tracing;

use std::error::Error;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};

use dagrun::dag::GraphBuilder;
use dagrun::errors::FailureCause;
use dagrun::exec::{
    ExecutorBackend, ReadyTask, Runner, RunnerEvent, Scheduler, TaskOutcome,
};

type TestResult = Result<(), Box<dyn Error>>;

/// A fake executor that:
/// - records which tasks were dispatched
/// - immediately reports a scripted outcome for each one.
struct FakeExecutor {
    runtime_tx: mpsc::Sender<RunnerEvent>,
    dispatched: Arc<Mutex<Vec<String>>>,
    fail: Vec<String>,
}

impl FakeExecutor {
    fn new(runtime_tx: mpsc::Sender<RunnerEvent>, dispatched: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            runtime_tx,
            dispatched,
            fail: Vec::new(),
        }
    }

    fn failing(mut self, name: &str) -> Self {
        self.fail.push(name.to_string());
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ReadyTask>,
    ) -> Pin<Box<dyn Future<Output = dagrun::errors::Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let dispatched = Arc::clone(&self.dispatched);
        let fail = self.fail.clone();

        Box::pin(async move {
            for t in tasks {
                dispatched.lock().unwrap().push(t.id.to_string());

                let outcome = if fail.contains(&t.id.to_string()) {
                    TaskOutcome::Failed(FailureCause::Work("scripted failure".into()))
                } else {
                    TaskOutcome::Succeeded
                };

                tx.send(RunnerEvent::TaskFinished { id: t.id, outcome }).await.ok();
            }
            Ok(())
        })
    }
}

#[tokio::test]
async fn runner_with_fake_executor_runs_simple_chain() -> TestResult {
    init_tracing();

    let a = TaskBuilder::new("a").build();
    let b = TaskBuilder::new("b").requires(a.clone()).build();
    let graph = GraphBuilder::build(vec![b])?;

    let (rt_tx, rt_rx) = mpsc::channel::<RunnerEvent>(16);
    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(rt_tx, dispatched.clone());

    let runner = Runner::new(Scheduler::new(graph), rt_rx, executor);
    let report = timeout(Duration::from_secs(3), runner.run()).await??;

    assert_eq!(*dispatched.lock().unwrap(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(report.succeeded.len(), 2);
    assert!(report.is_success());
    Ok(())
}

#[tokio::test]
async fn failed_dependency_is_never_dispatched_downstream() -> TestResult {
    init_tracing();

    let a = TaskBuilder::new("a").build();
    let c = TaskBuilder::new("c").requires(a.clone()).build();
    let b = TaskBuilder::new("b").build();
    let graph = GraphBuilder::build(vec![c, b])?;

    let (rt_tx, rt_rx) = mpsc::channel::<RunnerEvent>(16);
    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(rt_tx, dispatched.clone()).failing("a");

    let runner = Runner::new(Scheduler::new(graph), rt_rx, executor);
    let report = timeout(Duration::from_secs(3), runner.run()).await??;

    // c was poisoned without ever reaching the executor.
    let dispatched = dispatched.lock().unwrap().clone();
    assert!(dispatched.contains(&"a".to_string()));
    assert!(dispatched.contains(&"b".to_string()));
    assert!(!dispatched.contains(&"c".to_string()));

    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.failed.len(), 2);

    let c_failure = report.failed.iter().find(|f| f.id.to_string() == "c").unwrap();
    assert!(matches!(&c_failure.cause, FailureCause::UpstreamFailed(id) if id.to_string() == "a"));
    Ok(())
}

#[tokio::test]
async fn empty_root_set_finishes_immediately() -> TestResult {
    init_tracing();

    let graph = GraphBuilder::build(vec![])?;
    let (rt_tx, rt_rx) = mpsc::channel::<RunnerEvent>(16);
    let executor = FakeExecutor::new(rt_tx, Arc::new(Mutex::new(Vec::new())));

    let runner = Runner::new(Scheduler::new(graph), rt_rx, executor);
    let report = timeout(Duration::from_secs(3), runner.run()).await??;

    assert_eq!(report.total(), 0);
    assert!(report.is_success());
    Ok(())
}
