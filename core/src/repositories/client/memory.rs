//! In-memory implementation of ClientStore

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::entities::client::ClientInfo;
use crate::errors::{StoreError, StoreResult};

use super::r#trait::ClientStore;

#[derive(Default)]
struct State {
    clients: BTreeMap<String, ClientInfo>,
    closed: bool,
}

/// Client store held entirely in process memory
#[derive(Default)]
pub struct MemoryClientStore {
    state: RwLock<State>,
}

impl MemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStore for MemoryClientStore {
    async fn insert(&self, client: &ClientInfo) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.closed {
            return Err(StoreError::closed());
        }
        if state.clients.contains_key(&client.id) {
            return Err(StoreError::conflict("id"));
        }

        state.clients.insert(client.id.clone(), client.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<ClientInfo>> {
        let state = self.state.read().await;
        if state.closed {
            return Err(StoreError::closed());
        }
        Ok(state.clients.get(id).cloned())
    }

    async fn find_by_domain(&self, host: &str) -> StoreResult<Option<ClientInfo>> {
        let state = self.state.read().await;
        if state.closed {
            return Err(StoreError::closed());
        }
        // Lowest id wins when several clients share a host
        Ok(state.clients.values().find(|c| c.host() == host).cloned())
    }

    async fn close(&self) {
        let mut state = self.state.write().await;
        state.closed = true;
        state.clients.clear();
    }
}
