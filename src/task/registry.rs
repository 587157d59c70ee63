// src/task/registry.rs

//! Task declaration surface: name → factory registration.
//!
//! Callers build root task sets by choosing a task name and a parameter
//! mapping; the registry turns that into a concrete [`Task`] instance. The
//! CLI uses this to resolve textual task specs like
//! `load-cohort-clinical:cohort=ACC`.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::{DagrunError, DependencyError, Result};
use crate::task::{Parameters, Task};

type Factory = Arc<dyn Fn(Parameters) -> std::result::Result<Arc<dyn Task>, DependencyError> + Send + Sync>;

/// Registry mapping a task name to a factory `(parameters) -> Task`.
#[derive(Default, Clone)]
pub struct TaskRegistry {
    factories: BTreeMap<String, Factory>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a task name. Re-registering a name replaces
    /// the previous factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(Parameters) -> std::result::Result<Arc<dyn Task>, DependencyError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Instantiate a task by name with the given parameters.
    pub fn instantiate(&self, name: &str, parameters: Parameters) -> Result<Arc<dyn Task>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| DagrunError::TaskNotRegistered(name.to_string()))?;

        factory(parameters).map_err(|e| {
            DagrunError::Config(format!("could not instantiate task '{name}': {e}"))
        })
    }

    /// Registered task names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(|s| s.as_str())
    }
}

impl std::fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
