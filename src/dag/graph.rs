// src/dag/graph.rs

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;

use crate::task::{Task, TaskId};

/// Index of a node in the graph. Indices follow first-discovery order during
/// expansion, which is what makes [`TaskGraph::topological_order`]
/// deterministic for identical inputs.
pub type NodeId = usize;

/// One node per distinct `(name, parameters)` pair.
pub struct TaskNode {
    pub id: TaskId,
    pub task: Arc<dyn Task>,
    /// Direct dependencies: tasks that must be terminal before this one runs.
    pub deps: Vec<NodeId>,
    /// Direct dependents: tasks that list this one as a dependency.
    pub dependents: Vec<NodeId>,
    /// Set when this node's `dependencies()` could not be computed. The node
    /// fails at run start without its work function being invoked.
    pub resolution_error: Option<String>,
}

impl std::fmt::Debug for TaskNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskNode")
            .field("id", &self.id.to_string())
            .field("deps", &self.deps)
            .field("dependents", &self.dependents)
            .field("resolution_error", &self.resolution_error)
            .finish()
    }
}

/// The DAG of tasks reachable from a root set.
///
/// Acyclicity is guaranteed by construction: [`GraphBuilder::build`] fails
/// with a cycle error before a `TaskGraph` ever exists.
///
/// [`GraphBuilder::build`]: crate::dag::GraphBuilder::build
#[derive(Debug, Default)]
pub struct TaskGraph {
    nodes: Vec<TaskNode>,
    index: HashMap<TaskId, NodeId>,
}

impl TaskGraph {
    pub(crate) fn new(nodes: Vec<TaskNode>, index: HashMap<TaskId, NodeId>) -> Self {
        Self { nodes, index }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &TaskNode {
        &self.nodes[id]
    }

    pub fn node_id(&self, id: &TaskId) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TaskNode> {
        self.nodes.iter()
    }

    /// One valid linearization of the graph: every dependency precedes its
    /// dependents. Ties are broken by first-discovery order, so repeated
    /// builds from identical inputs produce identical sequences.
    pub fn topological_order(&self) -> Vec<NodeId> {
        let mut indegree: Vec<usize> = self.nodes.iter().map(|n| n.deps.len()).collect();

        // Min-heap over discovery indices.
        let mut ready: BinaryHeap<Reverse<NodeId>> = indegree
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d == 0)
            .map(|(n, _)| Reverse(n))
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(Reverse(n)) = ready.pop() {
            order.push(n);
            for &dep in &self.nodes[n].dependents {
                indegree[dep] -= 1;
                if indegree[dep] == 0 {
                    ready.push(Reverse(dep));
                }
            }
        }

        debug_assert_eq!(order.len(), self.nodes.len());
        order
    }
}
