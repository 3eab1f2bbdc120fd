// src/engine/runtime.rs

use std::collections::HashMap;
use std::fmt;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::dag::graph::DependencyGraph;
use crate::dag::scheduler::{RunState, Scheduler};
use crate::errors::{GraphError, RunError, TaskFailure};
use crate::task::{Action, Task, TaskName};

use super::RunnerEvent;

/// Summary of a finished run: which tasks reached which terminal state.
///
/// Failures are carried by [`RunError`] instead; a report is only returned
/// when no task failed.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub succeeded: Vec<TaskName>,
    pub skipped: Vec<TaskName>,
    pub cancelled: Vec<TaskName>,
}

/// Executes a set of tasks with maximum safe parallelism.
///
/// Construction validates the graph (duplicate names, unknown dependencies,
/// cycles) before any action is invoked. [`Runner::run`] dispatches every
/// currently-ready task concurrently, waits for completions, and recomputes
/// readiness from live state until the whole DAG has settled. A failed task
/// fails alone: its transitive dependents are skipped, unrelated subgraphs
/// run to completion, and the aggregated error lists exactly the tasks that
/// independently failed.
pub struct Runner {
    scheduler: Scheduler,
    actions: HashMap<TaskName, Action>,
    cancel: CancellationToken,
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl Runner {
    /// Validate and resolve the task set. No action runs before this
    /// succeeds.
    pub fn new(tasks: Vec<Task>) -> Result<Self, GraphError> {
        let graph = DependencyGraph::from_tasks(&tasks)?;
        let order = graph.resolve()?;
        debug!(?order, "task set validated");

        let actions = tasks
            .into_iter()
            .map(|task| (task.name, task.action))
            .collect();

        Ok(Self {
            scheduler: Scheduler::new(graph),
            actions,
            cancel: CancellationToken::new(),
        })
    }

    /// Attach a cancellation token.
    ///
    /// Once the token fires, no further task starts: everything still
    /// pending is marked cancelled (distinct from failed, and absent from
    /// the aggregated error) while in-flight actions are allowed to finish.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run every task to a terminal state.
    pub async fn run(mut self) -> Result<RunReport, RunError> {
        let (tx, mut rx) = mpsc::channel::<RunnerEvent>(64);

        // The cancellation watcher feeds the same event stream as action
        // completions, so the loop below stays the single writer of all
        // scheduling state.
        let watcher = {
            let cancel = self.cancel.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                cancel.cancelled().await;
                let _ = tx.send(RunnerEvent::CancelRequested).await;
            })
        };

        let mut failures: Vec<TaskFailure> = Vec::new();
        let mut cancelled = false;

        self.dispatch_ready(&tx);

        while !self.scheduler.is_settled() {
            let Some(event) = rx.recv().await else {
                // Unreachable while we hold `tx`, but don't spin on a closed
                // channel if that ever changes.
                break;
            };

            match event {
                RunnerEvent::ActionFinished { task, outcome } => match outcome {
                    Ok(()) => {
                        info!(task = %task, "task succeeded");
                        self.scheduler.record_success(&task);
                        if !cancelled {
                            self.dispatch_ready(&tx);
                        }
                    }
                    Err(error) => {
                        warn!(task = %task, error = %error, "task failed");
                        let skipped = self.scheduler.record_failure(&task);
                        if !skipped.is_empty() {
                            info!(?skipped, "skipping dependents of failed task");
                        }
                        failures.push(TaskFailure { task, error });
                    }
                },
                RunnerEvent::CancelRequested => {
                    let stopped = self.scheduler.cancel_pending();
                    info!(
                        cancelled = stopped.len(),
                        "cancellation requested; letting in-flight tasks finish"
                    );
                    cancelled = true;
                }
            }
        }

        watcher.abort();

        let report = RunReport {
            succeeded: self.scheduler.tasks_in_state(RunState::Succeeded),
            skipped: self.scheduler.tasks_in_state(RunState::Skipped),
            cancelled: self.scheduler.tasks_in_state(RunState::Cancelled),
        };

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(RunError {
                failures,
                skipped: report.skipped,
            })
        }
    }

    /// Dispatch the current wavefront: spawn one tokio task per ready
    /// action. Each action reports back over the event channel when it
    /// finishes.
    fn dispatch_ready(&mut self, tx: &mpsc::Sender<RunnerEvent>) {
        for name in self.scheduler.take_ready() {
            let Some(action) = self.actions.remove(&name) else {
                // Every scheduled name comes from the validated task set.
                warn!(task = %name, "ready task has no action; ignoring");
                continue;
            };

            info!(task = %name, "starting task");
            let tx = tx.clone();
            tokio::spawn(async move {
                // The action runs on its own task so a panic surfaces as a
                // JoinError instead of silently wedging the run.
                let outcome = match tokio::spawn(async move { action().await }).await {
                    Ok(outcome) => outcome,
                    Err(err) => Err(anyhow::anyhow!("task action panicked: {err}")),
                };
                let _ = tx
                    .send(RunnerEvent::ActionFinished {
                        task: name,
                        outcome,
                    })
                    .await;
            });
        }
    }
}
