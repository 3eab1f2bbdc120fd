// src/engine/mod.rs

//! Orchestration engine: the async runner that executes a task set while
//! honoring the dependency graph.
//!
//! The pure scheduling state machine lives in [`crate::dag::scheduler`]; the
//! IO shell here owns the actions, dispatches each wavefront onto its own
//! tokio tasks, and serializes every state transition in a single
//! coordinator loop fed by one mpsc channel.

pub mod runtime;

pub use runtime::{RunReport, Runner};

use crate::task::TaskName;

/// Events flowing into the coordinator loop from in-flight actions and the
/// cancellation watcher.
#[derive(Debug)]
pub(crate) enum RunnerEvent {
    /// An action ran to completion (successfully or not).
    ActionFinished {
        task: TaskName,
        outcome: anyhow::Result<()>,
    },
    /// The caller's cancellation token fired.
    CancelRequested,
}
