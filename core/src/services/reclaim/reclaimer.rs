//! Periodic reclamation of expired and fully invalidated token records.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use o2s_shared::config::ReclaimConfig;

use crate::errors::StoreResult;
use crate::repositories::TokenStore;

/// Result of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Records matching the reclamation predicate when counted
    pub matched: u64,
    /// Rows the bulk delete actually removed. May differ from `matched` when
    /// writers raced with the sweep.
    pub deleted: u64,
}

impl SweepOutcome {
    /// Nothing matched, so no delete was issued
    pub fn is_noop(&self) -> bool {
        self.matched == 0
    }
}

/// Sweeps a token store for records that are expired or have no keys left.
pub struct Reclaimer<S: TokenStore + ?Sized> {
    store: Arc<S>,
    label: String,
}

impl<S: TokenStore + ?Sized + 'static> Reclaimer<S> {
    /// Create a reclaimer for `store`
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            label: String::from("token_store"),
        }
    }

    /// Name used in log records, usually the table name
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Run one sweep against the current time
    pub async fn sweep(&self) -> StoreResult<SweepOutcome> {
        self.sweep_at(Utc::now()).await
    }

    /// Run one sweep treating `now` as the current time.
    ///
    /// Counts first and only deletes when something matched, so an idle store
    /// never sees a delete statement.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> StoreResult<SweepOutcome> {
        let matched = self.store.count_reclaimable(now).await?;
        if matched == 0 {
            debug!(store = %self.label, "Nothing to reclaim");
            return Ok(SweepOutcome::default());
        }

        let deleted = self.store.delete_reclaimable(now).await?;
        if deleted != matched {
            debug!(store = %self.label, matched, deleted, "Concurrent writers changed the reclaimable set");
        }
        info!(store = %self.label, matched, deleted, "Reclaimed token records");

        Ok(SweepOutcome { matched, deleted })
    }

    /// Sweep once, logging and swallowing any failure
    async fn tick(&self) {
        if let Err(e) = self.sweep().await {
            error!(store = %self.label, error = %e, "Token reclamation sweep failed");
        }
    }

    /// Start sweeping in a background task.
    ///
    /// Returns `None` without spawning anything when reclamation is disabled.
    /// The first sweep runs one full interval after the call. Must be called
    /// from within a Tokio runtime.
    pub fn spawn(self, config: &ReclaimConfig) -> Option<ReclaimerHandle> {
        if config.disabled {
            info!(store = %self.label, "Token reclamation disabled");
            return None;
        }

        let period = config.interval();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            info!(
                store = %self.label,
                interval_secs = period.as_secs(),
                "Token reclaimer started"
            );

            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    // A send or a dropped handle both end the loop
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {}
                }

                if *shutdown_rx.borrow() {
                    break;
                }

                self.tick().await;
            }

            info!(store = %self.label, "Token reclaimer stopped");
        });

        Some(ReclaimerHandle {
            shutdown: shutdown_tx,
            task,
        })
    }
}

/// Handle to a running reclaimer task
pub struct ReclaimerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReclaimerHandle {
    /// Stop scheduling sweeps and wait for the task to exit.
    ///
    /// A sweep already in progress runs to completion first.
    pub async fn shutdown(self) {
        // Fails only when the task is already gone
        let _ = self.shutdown.send(true);

        if let Err(e) = self.task.await {
            warn!(error = %e, "Token reclaimer task ended abnormally");
        }
    }

    /// Whether the task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
