// src/task.rs

//! The caller-facing task contract consumed by the orchestration core.
//!
//! A [`Task`] is a named, independently schedulable unit of work: a fallible
//! zero-argument async action plus the names of the tasks that must succeed
//! before it may start. The core imposes nothing else on actions: they run
//! to completion and report success or a descriptive failure; all externally
//! visible effects (compiling, copying, fetching) belong to the actions
//! themselves.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use anyhow::Result;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Future returned by a task action.
pub type ActionFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// A fallible, zero-argument operation. Invoked at most once per run, and
/// never before every dependency has succeeded.
pub type Action = Box<dyn FnOnce() -> ActionFuture + Send>;

/// A named unit of work with declared prerequisites.
pub struct Task {
    pub(crate) name: TaskName,
    pub(crate) requires: Vec<TaskName>,
    pub(crate) action: Action,
}

impl Task {
    /// Create a task from a name and an async action.
    pub fn new<F, Fut>(name: impl Into<TaskName>, action: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            requires: Vec::new(),
            action: Box::new(move || Box::pin(action())),
        }
    }

    /// Declare a prerequisite: this task starts only after `dep` succeeded.
    pub fn after(mut self, dep: impl Into<TaskName>) -> Self {
        self.requires.push(dep.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn requires(&self) -> &[TaskName] {
        &self.requires
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}
