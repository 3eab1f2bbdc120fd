#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use packdag::Task;

/// Shared record of which actions actually ran, in completion order.
///
/// Cloning is cheap; every task action holds a clone and appends its own
/// name when invoked.
#[derive(Clone, Default)]
pub struct ActionLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: &str) {
        self.entries.lock().unwrap().push(name.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.lock().unwrap().iter().any(|entry| entry == name)
    }

    /// Position of the first invocation of `name`, if it ran.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .position(|entry| entry == name)
    }

    /// Number of times `name` ran.
    pub fn count(&self, name: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| *entry == name)
            .count()
    }
}

/// Task whose action records its name and succeeds.
pub fn ok_task(name: &str, log: &ActionLog) -> Task {
    let log = log.clone();
    let recorded = name.to_string();
    Task::new(name, move || async move {
        log.record(&recorded);
        Ok(())
    })
}

/// Task whose action records its name and fails with `msg`.
pub fn failing_task(name: &str, log: &ActionLog, msg: &str) -> Task {
    let log = log.clone();
    let recorded = name.to_string();
    let msg = msg.to_string();
    Task::new(name, move || async move {
        log.record(&recorded);
        Err(anyhow!(msg))
    })
}

/// Task that sleeps before recording and succeeding, for ordering and
/// cancellation tests.
pub fn slow_task(name: &str, log: &ActionLog, delay: Duration) -> Task {
    let log = log.clone();
    let recorded = name.to_string();
    Task::new(name, move || async move {
        tokio::time::sleep(delay).await;
        log.record(&recorded);
        Ok(())
    })
}
