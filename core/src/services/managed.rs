//! A token store bundled with its reclaimer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use o2s_shared::config::ReclaimConfig;

use crate::domain::entities::token::{NewTokenRecord, TokenKind, TokenRecord};
use crate::errors::{StoreError, StoreResult};
use crate::repositories::TokenStore;
use crate::services::reclaim::{Reclaimer, ReclaimerHandle, SweepOutcome};

/// Owns an engine and the background task that reclaims its dead records.
///
/// Implements [`TokenStore`] by delegating to the engine, so protocol code can
/// hold this type (or an `Arc<dyn TokenStore>`) directly.
pub struct ManagedTokenStore<S: TokenStore + ?Sized> {
    store: Arc<S>,
    label: String,
    reclaimer: Mutex<Option<ReclaimerHandle>>,
    closed: AtomicBool,
}

impl<S: TokenStore + ?Sized + 'static> ManagedTokenStore<S> {
    /// Wrap `store` and start its reclaimer according to `config`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(store: Arc<S>, label: impl Into<String>, config: &ReclaimConfig) -> Self {
        let label = label.into();
        let reclaimer = Reclaimer::new(Arc::clone(&store))
            .with_label(label.clone())
            .spawn(config);

        Self {
            store,
            label,
            reclaimer: Mutex::new(reclaimer),
            closed: AtomicBool::new(false),
        }
    }

    /// The wrapped engine
    pub fn engine(&self) -> &Arc<S> {
        &self.store
    }

    /// Whether a background reclaimer is running
    pub async fn is_reclaiming(&self) -> bool {
        self.reclaimer
            .lock()
            .await
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Run one sweep now, independent of the schedule
    pub async fn purge(&self) -> StoreResult<SweepOutcome> {
        self.ensure_open()?;
        Reclaimer::new(Arc::clone(&self.store))
            .with_label(self.label.clone())
            .sweep()
            .await
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(StoreError::closed())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<S: TokenStore + ?Sized + 'static> TokenStore for ManagedTokenStore<S> {
    async fn insert(&self, record: NewTokenRecord) -> StoreResult<()> {
        self.ensure_open()?;
        self.store.insert(record).await
    }

    async fn find_by(&self, kind: TokenKind, value: &str) -> StoreResult<Option<TokenRecord>> {
        self.ensure_open()?;
        self.store.find_by(kind, value).await
    }

    async fn clear_by(&self, kind: TokenKind, value: &str) -> StoreResult<()> {
        self.ensure_open()?;
        self.store.clear_by(kind, value).await
    }

    async fn count_reclaimable(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        self.ensure_open()?;
        self.store.count_reclaimable(now).await
    }

    async fn delete_reclaimable(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        self.ensure_open()?;
        self.store.delete_reclaimable(now).await
    }

    /// Stop the reclaimer, then release the engine. Only the first call does
    /// any work.
    ///
    /// Afterwards every call fails with a storage error, except `get_by_*`
    /// and `remove_by_*` with an empty key, which never reach storage and
    /// still return `Skipped` and `Ok(())`.
    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        let handle = self.reclaimer.lock().await.take();
        if let Some(handle) = handle {
            handle.shutdown().await;
        }

        self.store.close().await;
        info!(store = %self.label, "Token store closed");
    }
}
