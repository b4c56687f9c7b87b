//! In-memory implementation of TokenStore
//!
//! Keeps records in a map keyed by id, with one index per token kind. All
//! writes go through a single lock, which gives the same per-record atomicity
//! the MySQL engine gets from InnoDB.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::domain::entities::token::{NewTokenRecord, TokenKind, TokenRecord};
use crate::errors::{StoreError, StoreResult};

use super::r#trait::TokenStore;

#[derive(Default)]
struct State {
    next_id: u64,
    records: BTreeMap<u64, TokenRecord>,
    code: HashMap<String, u64>,
    access: HashMap<String, u64>,
    refresh: HashMap<String, u64>,
    closed: bool,
}

impl State {
    fn index(&self, kind: TokenKind) -> &HashMap<String, u64> {
        match kind {
            TokenKind::Code => &self.code,
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    fn index_mut(&mut self, kind: TokenKind) -> &mut HashMap<String, u64> {
        match kind {
            TokenKind::Code => &mut self.code,
            TokenKind::Access => &mut self.access,
            TokenKind::Refresh => &mut self.refresh,
        }
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed {
            Err(StoreError::closed())
        } else {
            Ok(())
        }
    }

    fn remove_record(&mut self, id: u64) {
        if let Some(record) = self.records.remove(&id) {
            for kind in TokenKind::ALL {
                let key = record.key(kind);
                if !key.is_empty() {
                    self.index_mut(kind).remove(key);
                }
            }
        }
    }
}

/// Token store held entirely in process memory
#[derive(Default)]
pub struct MemoryTokenStore {
    state: RwLock<State>,
}

impl MemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held, live or not
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Raw record lookup by id
    pub async fn record(&self, id: u64) -> Option<TokenRecord> {
        self.state.read().await.records.get(&id).cloned()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn insert(&self, record: NewTokenRecord) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.ensure_open()?;

        for (kind, value) in record.keys() {
            if state.index(kind).contains_key(value) {
                return Err(StoreError::conflict(kind.column()));
            }
        }

        state.next_id += 1;
        let id = state.next_id;
        for (kind, value) in record.keys() {
            let value = value.to_string();
            state.index_mut(kind).insert(value, id);
        }
        state.records.insert(id, record.into_record(id));

        Ok(())
    }

    async fn find_by(&self, kind: TokenKind, value: &str) -> StoreResult<Option<TokenRecord>> {
        let state = self.state.read().await;
        state.ensure_open()?;

        Ok(state
            .index(kind)
            .get(value)
            .and_then(|id| state.records.get(id))
            .cloned())
    }

    async fn clear_by(&self, kind: TokenKind, value: &str) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.ensure_open()?;

        if let Some(id) = state.index_mut(kind).remove(value) {
            if let Some(record) = state.records.get_mut(&id) {
                record.key_mut(kind).clear();
            }
        }

        Ok(())
    }

    async fn count_reclaimable(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let state = self.state.read().await;
        state.ensure_open()?;

        Ok(state
            .records
            .values()
            .filter(|record| record.is_reclaimable_at(now))
            .count() as u64)
    }

    async fn delete_reclaimable(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        state.ensure_open()?;

        let doomed: Vec<u64> = state
            .records
            .values()
            .filter(|record| record.is_reclaimable_at(now))
            .map(|record| record.id)
            .collect();

        for id in &doomed {
            state.remove_record(*id);
        }

        Ok(doomed.len() as u64)
    }

    async fn close(&self) {
        let mut state = self.state.write().await;
        state.closed = true;
        state.records.clear();
        state.code.clear();
        state.access.clear();
        state.refresh.clear();
    }
}
