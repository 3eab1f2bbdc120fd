// src/dag/scheduler.rs

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::dag::graph::DependencyGraph;
use crate::task::TaskName;

/// Per-run state of a task.
///
/// "Ready" is not stored: it is the transient condition of a `Pending` task
/// whose dependencies have all reached `Succeeded`. [`Scheduler::take_ready`]
/// marks such tasks `Running` in the same step that reports them, so no task
/// can be handed out twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Waiting on dependencies (or on dispatch).
    Pending,
    /// Handed to the runner; its action is in flight.
    Running,
    Succeeded,
    Failed,
    /// Never ran because a dependency failed (transitively).
    Skipped,
    /// Never ran because the run was cancelled before it started.
    Cancelled,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunState::Pending | RunState::Running)
    }
}

/// Pure per-run scheduling state machine.
///
/// Owns no channels and performs no IO; the async runner drives it and is
/// the single writer of all state transitions. Readiness is recomputed from
/// live per-task state on every step, which is correct for arbitrary DAGs
/// including shared dependencies: a diamond's shared base runs exactly once
/// and unblocks all of its dependents together when it succeeds.
#[derive(Debug)]
pub struct Scheduler {
    graph: DependencyGraph,
    states: HashMap<TaskName, RunState>,
}

impl Scheduler {
    /// Start a run with every task `Pending`.
    pub fn new(graph: DependencyGraph) -> Self {
        let states = graph
            .tasks()
            .map(|name| (name.to_string(), RunState::Pending))
            .collect();
        Self { graph, states }
    }

    /// Collect every `Pending` task whose dependencies are all `Succeeded`,
    /// mark them `Running`, and return their names: the current wavefront.
    pub fn take_ready(&mut self) -> Vec<TaskName> {
        // Decide first, then mutate, iterating in input order so dispatch
        // (and logs) are deterministic for a given task set.
        let ready: Vec<TaskName> = self
            .graph
            .tasks()
            .filter(|name| self.states.get(*name) == Some(&RunState::Pending))
            .filter(|name| self.deps_satisfied(name))
            .map(str::to_string)
            .collect();

        for name in &ready {
            debug!(task = %name, "dependencies satisfied; marking Running");
            self.states.insert(name.clone(), RunState::Running);
        }

        ready
    }

    fn deps_satisfied(&self, task: &str) -> bool {
        self.graph
            .dependencies_of(task)
            .iter()
            .all(|dep| self.states.get(dep) == Some(&RunState::Succeeded))
    }

    /// Record that a task's action returned success.
    pub fn record_success(&mut self, task: &str) {
        match self.states.get_mut(task) {
            Some(state) => *state = RunState::Succeeded,
            None => warn!(task = %task, "success reported for unknown task; ignoring"),
        }
    }

    /// Record that a task's action failed, and transitively mark every
    /// dependent that has not started as `Skipped`. Returns the newly
    /// skipped names.
    ///
    /// Tasks outside the dependent closure are untouched and keep running
    /// to completion independently.
    pub fn record_failure(&mut self, task: &str) -> Vec<TaskName> {
        match self.states.get_mut(task) {
            Some(state) => *state = RunState::Failed,
            None => {
                warn!(task = %task, "failure reported for unknown task; ignoring");
                return Vec::new();
            }
        }

        let mut stack: Vec<TaskName> = self.graph.dependents_of(task).to_vec();
        let mut skipped = Vec::new();

        while let Some(name) = stack.pop() {
            // A dependent of an unfinished task can only be Pending here; a
            // terminal or already-skipped dependent is left alone.
            if self.states.get(&name) == Some(&RunState::Pending) {
                debug!(task = %name, "skipping dependent of failed task");
                self.states.insert(name.clone(), RunState::Skipped);
                stack.extend(self.graph.dependents_of(&name).iter().cloned());
                skipped.push(name);
            }
        }

        skipped
    }

    /// Mark every task that has not started as `Cancelled`. Tasks already
    /// in flight are left `Running`; the runner lets them finish. Returns
    /// the newly cancelled names.
    pub fn cancel_pending(&mut self) -> Vec<TaskName> {
        let mut cancelled = Vec::new();
        for (name, state) in self.states.iter_mut() {
            if *state == RunState::Pending {
                *state = RunState::Cancelled;
                cancelled.push(name.clone());
            }
        }
        cancelled
    }

    /// True once no task is `Pending` or `Running`.
    pub fn is_settled(&self) -> bool {
        self.states.values().all(|state| state.is_terminal())
    }

    /// Current state of a task, if it is part of this run.
    pub fn state_of(&self, task: &str) -> Option<RunState> {
        self.states.get(task).copied()
    }

    /// Names of every task currently in `state`, in input order.
    pub fn tasks_in_state(&self, state: RunState) -> Vec<TaskName> {
        self.graph
            .tasks()
            .filter(|name| self.states.get(*name) == Some(&state))
            .map(str::to_string)
            .collect()
    }
}
