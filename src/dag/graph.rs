// src/dag/graph.rs

use std::collections::HashMap;

use tracing::debug;

use crate::errors::GraphError;
use crate::task::{Task, TaskName};

/// Graph identity for one task: its name and the names it requires.
///
/// Tasks themselves carry their action; the graph only needs names and
/// edges, so it never touches or consumes the `Task`.
#[derive(Debug, Clone)]
struct TaskNode {
    id: TaskName,
    requires: Vec<TaskName>,
}

/// Per-node marker used during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    /// On the current traversal stack. Reaching an in-progress node again
    /// means the relation has a cycle.
    InProgress,
    Done,
}

/// Dependency graph over a set of named tasks.
///
/// Holds adjacency in both directions for the scheduler and resolves a
/// topological execution order. Construction rejects duplicate names;
/// [`DependencyGraph::resolve`] rejects unknown dependencies and cycles,
/// both as ordinary errors raised before any task action runs.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: Vec<TaskNode>,
    index: HashMap<TaskName, usize>,
    dependents: HashMap<TaskName, Vec<TaskName>>,
}

impl DependencyGraph {
    /// Build the graph from a task set, preserving input order.
    pub fn from_tasks(tasks: &[Task]) -> Result<Self, GraphError> {
        let mut nodes = Vec::with_capacity(tasks.len());
        let mut index = HashMap::with_capacity(tasks.len());

        for task in tasks {
            if index.insert(task.name().to_string(), nodes.len()).is_some() {
                return Err(GraphError::DuplicateTask(task.name().to_string()));
            }
            nodes.push(TaskNode {
                id: task.name().to_string(),
                requires: task.requires().to_vec(),
            });
        }

        // Reverse adjacency, used by the scheduler to skip dependents when a
        // task fails. Edges to unknown names are left out here; `resolve`
        // reports them and runs before any scheduling.
        let mut dependents: HashMap<TaskName, Vec<TaskName>> = HashMap::new();
        for node in &nodes {
            for dep in &node.requires {
                if index.contains_key(dep) {
                    dependents
                        .entry(dep.clone())
                        .or_default()
                        .push(node.id.clone());
                }
            }
        }

        Ok(Self {
            nodes,
            index,
            dependents,
        })
    }

    /// Resolve a valid execution order: for every task, its position in the
    /// returned order is after the position of every one of its
    /// dependencies. The empty graph resolves to the empty order.
    ///
    /// Depth-first from every task in input order. Each node carries a
    /// tri-state marker: reaching an in-progress node is a cycle (reported
    /// with the offending chain of names); a done node is a shared
    /// dependency already placed via another path and is not revisited.
    pub fn resolve(&self) -> Result<Vec<TaskName>, GraphError> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut stack: Vec<TaskName> = Vec::new();
        let mut order = Vec::with_capacity(self.nodes.len());

        for ii in 0..self.nodes.len() {
            if marks[ii] == Mark::Unvisited {
                self.visit(ii, &mut marks, &mut stack, &mut order)?;
            }
        }

        debug!(tasks = order.len(), "resolved execution order");
        Ok(order)
    }

    fn visit(
        &self,
        ii: usize,
        marks: &mut [Mark],
        stack: &mut Vec<TaskName>,
        order: &mut Vec<TaskName>,
    ) -> Result<(), GraphError> {
        let node = &self.nodes[ii];
        marks[ii] = Mark::InProgress;
        stack.push(node.id.clone());

        for dep in &node.requires {
            let Some(&jj) = self.index.get(dep) else {
                return Err(GraphError::UnknownDependency {
                    task: node.id.clone(),
                    missing: dep.clone(),
                });
            };
            match marks[jj] {
                Mark::Done => {}
                Mark::InProgress => {
                    let start = stack.iter().position(|name| name == dep).unwrap_or(0);
                    return Err(GraphError::Cycle(stack[start..].to_vec()));
                }
                Mark::Unvisited => self.visit(jj, marks, stack, order)?,
            }
        }

        stack.pop();
        marks[ii] = Mark::Done;
        order.push(node.id.clone());
        Ok(())
    }

    /// All task names, in input order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.id.as_str())
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.index
            .get(name)
            .map(|&ii| self.nodes[ii].requires.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks that require this one).
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.dependents
            .get(name)
            .map(|deps| deps.as_slice())
            .unwrap_or(&[])
    }
}
