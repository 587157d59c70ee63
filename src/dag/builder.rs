// src/dag/builder.rs

//! Graph expansion from root tasks.
//!
//! Depth-first expansion with memoization on `(name, parameters)`: each
//! distinct identity becomes one node, `dependencies()` is evaluated exactly
//! once per node, and fan-out sequences are fully materialized at build
//! time. A node encountered while its own expansion is still in progress
//! signals a cycle, reported with the offending identity chain.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::dag::graph::{NodeId, TaskGraph, TaskNode};
use crate::errors::{DagrunError, Result};
use crate::task::{Task, TaskId};

pub struct GraphBuilder;

impl GraphBuilder {
    /// Expand the given roots into the full dependency graph.
    ///
    /// Fails with [`DagrunError::GraphCycle`] before any task executes if the
    /// dependency relation is cyclic. A task whose `dependencies()` errors is
    /// kept in the graph with the error recorded; the scheduler fails that
    /// branch at run start without aborting unrelated branches.
    pub fn build(roots: Vec<Arc<dyn Task>>) -> Result<TaskGraph> {
        let mut state = BuildState {
            nodes: Vec::new(),
            marks: HashMap::new(),
        };

        let mut path = Vec::new();
        for root in roots {
            state.visit(root, &mut path)?;
            debug_assert!(path.is_empty());
        }

        // Second pass: invert dependency edges into dependent lists.
        let edges: Vec<(NodeId, NodeId)> = state
            .nodes
            .iter()
            .enumerate()
            .flat_map(|(n, node)| node.deps.iter().map(move |&dep| (dep, n)))
            .collect();
        for (dep, dependent) in edges {
            state.nodes[dep].dependents.push(dependent);
        }

        let index = state
            .marks
            .into_iter()
            .filter_map(|(id, mark)| match mark {
                Mark::Done(n) => Some((id, n)),
                Mark::Visiting => None,
            })
            .collect();

        debug!(nodes = state.nodes.len(), "task graph expanded");
        Ok(TaskGraph::new(state.nodes, index))
    }
}

enum Mark {
    /// Expansion of this node is in progress further up the DFS stack.
    Visiting,
    Done(NodeId),
}

struct BuildState {
    nodes: Vec<TaskNode>,
    marks: HashMap<TaskId, Mark>,
}

impl BuildState {
    fn visit(&mut self, task: Arc<dyn Task>, path: &mut Vec<TaskId>) -> Result<NodeId> {
        let id = task.id();

        match self.marks.get(&id) {
            Some(Mark::Done(n)) => return Ok(*n),
            Some(Mark::Visiting) => {
                return Err(DagrunError::GraphCycle(cycle_chain(path, &id)));
            }
            None => {}
        }

        self.marks.insert(id.clone(), Mark::Visiting);
        path.push(id.clone());

        let (deps, resolution_error) = match task.dependencies() {
            Ok(deps) => {
                let mut dep_ids = Vec::with_capacity(deps.len());
                let mut result = Ok(());
                for dep in deps {
                    match self.visit(dep, path) {
                        Ok(n) => dep_ids.push(n),
                        Err(e) => {
                            result = Err(e);
                            break;
                        }
                    }
                }
                if let Err(e) = result {
                    path.pop();
                    return Err(e);
                }
                (dep_ids, None)
            }
            Err(e) => {
                debug!(task = %id, error = %e, "dependency resolution failed during expansion");
                (Vec::new(), Some(e.to_string()))
            }
        };

        path.pop();

        let n = self.nodes.len();
        self.nodes.push(TaskNode {
            id: id.clone(),
            task,
            deps,
            dependents: Vec::new(),
            resolution_error,
        });
        self.marks.insert(id, Mark::Done(n));

        Ok(n)
    }
}

/// Render the identity chain of a cycle, from the first occurrence of the
/// repeated task back around to itself.
fn cycle_chain(path: &[TaskId], repeated: &TaskId) -> String {
    let start = path.iter().position(|id| id == repeated).unwrap_or(0);
    let mut chain: Vec<String> = path[start..].iter().map(|id| id.to_string()).collect();
    chain.push(repeated.to_string());
    chain.join(" -> ")
}
