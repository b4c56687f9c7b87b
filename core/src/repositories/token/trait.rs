//! Token store trait defining the contract every engine implements.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::token::{NewTokenRecord, TokenInfo, TokenKind, TokenRecord};
use crate::domain::value_objects::Lookup;
use crate::errors::StoreResult;

/// Persistence contract for token records.
///
/// Engines implement the `insert`/`find_by`/`clear_by` primitives and the two
/// reclamation queries. Callers use the provided `create`, `get_by_*` and
/// `remove_by_*` methods, which carry the validation, expiry derivation,
/// empty-key short-circuit and payload decoding shared by all engines.
///
/// # Guarantees expected from an engine
/// - `insert` rejects any non-empty key already present on a live record with
///   [`StoreError::Conflict`](crate::errors::StoreError::Conflict)
/// - keys match byte for byte, with no case folding or padding
/// - `find_by` does not filter on expiry
/// - `clear_by` only ever empties one key and never deletes a row
/// - every method fails with a storage error once `close` has run
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persist a new record, assigning its id
    async fn insert(&self, record: NewTokenRecord) -> StoreResult<()>;

    /// Find the record whose `kind` key equals `value`. `value` is never empty.
    async fn find_by(&self, kind: TokenKind, value: &str) -> StoreResult<Option<TokenRecord>>;

    /// Empty the `kind` key of the record where it equals `value`.
    /// `value` is never empty. A miss is not an error.
    async fn clear_by(&self, kind: TokenKind, value: &str) -> StoreResult<()>;

    /// Count records that are expired at `now` or have no keys left
    async fn count_reclaimable(&self, now: DateTime<Utc>) -> StoreResult<u64>;

    /// Delete records that are expired at `now` or have no keys left,
    /// returning the number of rows removed
    async fn delete_reclaimable(&self, now: DateTime<Utc>) -> StoreResult<u64>;

    /// Release the underlying storage. Later calls fail instead of hanging,
    /// except that empty-key lookups and removals still short-circuit to
    /// `Skipped` and `Ok(())` without touching storage.
    async fn close(&self);

    /// Create and store the record for `info`
    ///
    /// # Arguments
    /// * `info` - Token information carrying a code, an access token or both
    ///
    /// # Returns
    /// * `Ok(())` - The record was stored
    /// * `Err(StoreError::Validation)` - Neither a code nor an access token, or
    ///   an expiry that cannot be represented
    /// * `Err(StoreError::Conflict)` - One of the non-empty keys is taken
    /// * `Err(StoreError::Storage)` - Storage failure or closed store
    ///
    /// # Example
    /// ```no_run
    /// # use std::time::Duration;
    /// # use chrono::Utc;
    /// # use o2s_core::{TokenInfo, TokenStore};
    /// # async fn example(store: &impl TokenStore) -> Result<(), Box<dyn std::error::Error>> {
    /// let info = TokenInfo::new("client-1", "user-1")
    ///     .with_code("C1", Utc::now(), Duration::from_secs(600));
    ///
    /// store.create(&info).await?;
    /// # Ok(())
    /// # }
    /// ```
    async fn create(&self, info: &TokenInfo) -> StoreResult<()> {
        let record = NewTokenRecord::from_info(info, Utc::now())?;
        self.insert(record).await
    }

    /// Look up a record by one of its keys and decode its payload
    ///
    /// # Arguments
    /// * `kind` - Which key to match
    /// * `value` - Key value; empty skips the lookup
    ///
    /// # Returns
    /// * `Ok(Lookup::Found(TokenInfo))` - A record carries this key
    /// * `Ok(Lookup::NotFound)` - No record carries this key
    /// * `Ok(Lookup::Skipped)` - `value` was empty
    /// * `Err(StoreError::Storage)` - Storage or payload decoding failure
    ///
    /// Expired records are still returned; the caller checks expiry.
    async fn get_by(&self, kind: TokenKind, value: &str) -> StoreResult<Lookup<TokenInfo>> {
        if value.is_empty() {
            return Ok(Lookup::Skipped);
        }

        match self.find_by(kind, value).await? {
            Some(record) => Ok(Lookup::Found(record.info()?)),
            None => Ok(Lookup::NotFound),
        }
    }

    /// Stop a key from resolving, leaving the rest of its record intact
    ///
    /// # Arguments
    /// * `kind` - Which key to clear
    /// * `value` - Key value; empty is a no-op
    ///
    /// # Returns
    /// * `Ok(())` - The key no longer resolves, including when it never did
    /// * `Err(StoreError::Storage)` - Storage failure or closed store
    async fn remove_by(&self, kind: TokenKind, value: &str) -> StoreResult<()> {
        if value.is_empty() {
            return Ok(());
        }
        self.clear_by(kind, value).await
    }

    /// Use the authorization code for token information data
    ///
    /// # Example
    /// ```no_run
    /// # use o2s_core::{Lookup, TokenStore};
    /// # async fn example(store: &impl TokenStore) -> Result<(), Box<dyn std::error::Error>> {
    /// match store.get_by_code("C1").await? {
    ///     Lookup::Found(info) => println!("code issued to {}", info.client_id),
    ///     Lookup::NotFound | Lookup::Skipped => println!("unknown code"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn get_by_code(&self, code: &str) -> StoreResult<Lookup<TokenInfo>> {
        self.get_by(TokenKind::Code, code).await
    }

    /// Use the access token for token information data
    async fn get_by_access(&self, access: &str) -> StoreResult<Lookup<TokenInfo>> {
        self.get_by(TokenKind::Access, access).await
    }

    /// Use the refresh token for token information data
    async fn get_by_refresh(&self, refresh: &str) -> StoreResult<Lookup<TokenInfo>> {
        self.get_by(TokenKind::Refresh, refresh).await
    }

    /// Invalidate an authorization code after its single use
    ///
    /// # Example
    /// ```no_run
    /// # use o2s_core::TokenStore;
    /// # async fn example(store: &impl TokenStore) -> Result<(), Box<dyn std::error::Error>> {
    /// store.remove_by_code("C1").await?;
    /// assert!(store.get_by_code("C1").await?.is_not_found());
    /// # Ok(())
    /// # }
    /// ```
    async fn remove_by_code(&self, code: &str) -> StoreResult<()> {
        self.remove_by(TokenKind::Code, code).await
    }

    /// Invalidate an access token
    async fn remove_by_access(&self, access: &str) -> StoreResult<()> {
        self.remove_by(TokenKind::Access, access).await
    }

    /// Invalidate a refresh token
    async fn remove_by_refresh(&self, refresh: &str) -> StoreResult<()> {
        self.remove_by(TokenKind::Refresh, refresh).await
    }
}
