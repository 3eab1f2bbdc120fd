// src/digest/gate.rs

use std::future::Future;

use anyhow::{Result, bail};
use tracing::{debug, info, warn};

use crate::digest::store::DigestStore;
use crate::digest::tree::TreeDigest;

/// Skip gate for one expensive step over one tracked tree.
///
/// The stored digest is read permissively: missing or unreadable means the
/// tree counts as changed, since a digest that was never computed is not an
/// error. The fresh digest is persisted only after the guarded step
/// succeeds, so a failed step is retried on the next run.
pub struct DigestGate<S> {
    unit: String,
    tree: TreeDigest,
    store: S,
    current: Option<String>,
}

impl<S: DigestStore> DigestGate<S> {
    pub fn new(unit: impl Into<String>, tree: TreeDigest, store: S) -> Self {
        Self {
            unit: unit.into(),
            tree,
            store,
            current: None,
        }
    }

    /// Compute the tree digest and compare it with the stored one.
    ///
    /// A failure to *compute* the fresh digest is an error (the tree itself
    /// is unreadable); a failure to *load* the stored digest is not.
    pub async fn is_unchanged(&mut self) -> Result<bool> {
        let current = self.tree.compute().await?;

        let stored = match self.store.load(&self.unit) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(
                    unit = %self.unit,
                    error = %err,
                    "could not read stored digest; treating tree as changed"
                );
                None
            }
        };

        let unchanged = stored.as_deref() == Some(current.as_str());
        debug!(unit = %self.unit, unchanged, "digest gate check");
        self.current = Some(current);
        Ok(unchanged)
    }

    /// Persist the digest computed by the last [`DigestGate::is_unchanged`]
    /// call.
    pub fn commit(&mut self) -> Result<()> {
        let Some(current) = self.current.take() else {
            bail!("no digest computed for unit '{}'", self.unit);
        };
        self.store.save(&self.unit, &current)
    }

    /// Run `step` only if the tracked tree changed, persisting the new
    /// digest after a successful run.
    pub async fn refresh_with<F, Fut>(&mut self, step: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        if self.is_unchanged().await? {
            info!(unit = %self.unit, "contents unchanged; skipping");
            return Ok(());
        }
        step().await?;
        self.commit()
    }
}
