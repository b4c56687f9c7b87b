//! Client store trait for registered OAuth2 clients.

use async_trait::async_trait;

use crate::domain::entities::client::ClientInfo;
use crate::domain::value_objects::Lookup;
use crate::errors::StoreResult;

/// Persistence contract for registered clients.
///
/// Clients never expire, so there is nothing to reclaim. Engines implement the
/// `insert`/`find_*` primitives; the provided methods validate input and
/// short-circuit empty keys.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Persist a validated client. An existing id is a conflict.
    async fn insert(&self, client: &ClientInfo) -> StoreResult<()>;

    /// Find a client by id. `id` is never empty.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<ClientInfo>>;

    /// Find a client by its domain host. `host` is never empty.
    async fn find_by_domain(&self, host: &str) -> StoreResult<Option<ClientInfo>>;

    /// Release the underlying storage
    async fn close(&self);

    /// Create a new storage record for client information
    ///
    /// # Arguments
    /// * `client` - Client with `id`, `secret` and `domain` set
    ///
    /// # Returns
    /// * `Ok(())` - The client was stored
    /// * `Err(StoreError::Validation)` - A required field is empty
    /// * `Err(StoreError::Conflict)` - The id is already registered
    /// * `Err(StoreError::Storage)` - Storage failure
    async fn create(&self, client: &ClientInfo) -> StoreResult<()> {
        client.validate()?;
        self.insert(client).await
    }

    /// Get client information by the id
    async fn get_by_id(&self, id: &str) -> StoreResult<Lookup<ClientInfo>> {
        if id.is_empty() {
            return Ok(Lookup::Skipped);
        }
        Ok(match self.find_by_id(id).await? {
            Some(client) => Lookup::Found(client),
            None => Lookup::NotFound,
        })
    }

    /// Get client information by the domain; scheme and path are ignored
    async fn get_by_domain(&self, domain: &str) -> StoreResult<Lookup<ClientInfo>> {
        let host = crate::domain::entities::client::parse_domain(domain);
        if host.is_empty() {
            return Ok(Lookup::Skipped);
        }
        Ok(match self.find_by_domain(host).await? {
            Some(client) => Lookup::Found(client),
            None => Lookup::NotFound,
        })
    }
}
