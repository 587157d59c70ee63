//! Builders for scripted test tasks.

use std::sync::{Arc, Mutex};

use dagrun::errors::{DependencyError, WorkError};
use dagrun::target::Target;
use dagrun::task::{Parameters, Task};

/// Shared log of work-function invocations, in execution order.
pub type RunLog = Arc<Mutex<Vec<String>>>;

pub fn run_log() -> RunLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn logged(log: &RunLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// A scripted task: fixed dependencies, optional failure, optional run log.
pub struct TestTask {
    name: String,
    params: Parameters,
    deps: Vec<Arc<dyn Task>>,
    fail_with: Option<String>,
    dep_error: Option<String>,
    log: Option<RunLog>,
    target: Option<Target>,
}

impl Task for TestTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn dependencies(&self) -> Result<Vec<Arc<dyn Task>>, DependencyError> {
        match &self.dep_error {
            Some(msg) => Err(DependencyError::msg(msg.clone())),
            None => Ok(self.deps.clone()),
        }
    }

    fn output(&self) -> Target {
        self.target
            .clone()
            .unwrap_or_else(|| Target::stored(self.id().to_string(), "test_table"))
    }

    fn run(&self) -> Result<(), WorkError> {
        if let Some(log) = &self.log {
            log.lock().unwrap().push(self.id().to_string());
        }
        match &self.fail_with {
            Some(msg) => Err(WorkError::msg(msg.clone())),
            None => Ok(()),
        }
    }
}

pub struct TaskBuilder {
    name: String,
    params: Parameters,
    deps: Vec<Arc<dyn Task>>,
    fail_with: Option<String>,
    dep_error: Option<String>,
    log: Option<RunLog>,
    target: Option<Target>,
}

impl TaskBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Parameters::new(),
            deps: Vec::new(),
            fail_with: None,
            dep_error: None,
            log: None,
            target: None,
        }
    }

    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.params = self.params.with(key, value);
        self
    }

    pub fn requires(mut self, dep: Arc<dyn Task>) -> Self {
        self.deps.push(dep);
        self
    }

    pub fn fails(mut self, msg: &str) -> Self {
        self.fail_with = Some(msg.to_string());
        self
    }

    pub fn dependency_error(mut self, msg: &str) -> Self {
        self.dep_error = Some(msg.to_string());
        self
    }

    pub fn logged(mut self, log: &RunLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    pub fn target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn build(self) -> Arc<dyn Task> {
        Arc::new(TestTask {
            name: self.name,
            params: self.params,
            deps: self.deps,
            fail_with: self.fail_with,
            dep_error: self.dep_error,
            log: self.log,
            target: self.target,
        })
    }
}
