// src/errors.rs

//! Structured error taxonomy for the orchestration core.
//!
//! Graph-shape problems ([`GraphError`]) are detected before any task action
//! runs. Action failures are collected per task and returned together as one
//! [`RunError`] once the whole reachable DAG has settled.

use std::fmt;

use thiserror::Error;

/// Errors detected while validating or resolving the task graph.
///
/// All of these are raised before any task action is invoked.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Two tasks in the same invocation share a name.
    #[error("duplicate task name '{0}'")]
    DuplicateTask(String),

    /// A task names a dependency that is not part of the invocation.
    #[error("task '{task}' depends on unknown task '{missing}'")]
    UnknownDependency { task: String, missing: String },

    /// The dependency relation is not acyclic. The chain lists the tasks on
    /// the offending cycle, in dependency order.
    #[error("dependency cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

/// A single task failure paired with its underlying cause.
#[derive(Debug)]
pub struct TaskFailure {
    pub task: String,
    pub error: anyhow::Error,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task '{}': {:#}", self.task, self.error)
    }
}

/// Aggregated result of a run.
///
/// `failures` lists exactly the tasks that failed on their own, each with its
/// underlying cause. `skipped` names the tasks that never ran because a
/// dependency (transitively) failed; they are implied by the failures and are
/// not failures themselves.
#[derive(Debug)]
pub struct RunError {
    pub failures: Vec<TaskFailure>,
    pub skipped: Vec<String>,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} task(s) failed", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  {failure}")?;
        }
        if !self.skipped.is_empty() {
            write!(
                f,
                "\n  ({} dependent task(s) skipped: {})",
                self.skipped.len(),
                self.skipped.join(", ")
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for RunError {}
