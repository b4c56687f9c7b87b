//! MySQL implementation of the ClientStore trait.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use o2s_core::domain::entities::client::ClientInfo;
use o2s_core::errors::{StoreError, StoreResult};
use o2s_core::repositories::ClientStore;

use super::error_mapping::{is_unique_violation, storage_error};
use crate::database::connection::DatabasePool;
use crate::database::schema::{client_table_ddl, validate_table_name};
use crate::InfrastructureError;

/// Client store backed by a MySQL table
pub struct MySqlClientStore {
    /// Database connection pool
    pool: DatabasePool,
    table: String,
}

impl MySqlClientStore {
    /// Create a store on `table`. The table name is validated but the table
    /// itself is not touched; see [`MySqlClientStore::ensure_schema`].
    pub fn new(pool: DatabasePool, table: &str) -> Result<Self, InfrastructureError> {
        validate_table_name(table)?;

        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    /// Create the table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), InfrastructureError> {
        sqlx::query(&client_table_ddl(&self.table))
            .execute(self.pool.pool())
            .await?;

        tracing::info!(table = %self.table, "Client table ready");
        Ok(())
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    async fn find_one(&self, column: &str, value: &str) -> StoreResult<Option<ClientInfo>> {
        // Lowest id wins when several clients share a host
        let query = format!(
            "SELECT payload FROM `{}` WHERE {} = ? ORDER BY id LIMIT 1",
            self.table, column
        );

        // Bytes compare exactly, as the in-memory engine does
        let row = sqlx::query(&query)
            .bind(value.as_bytes())
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| storage_error("Failed to find client", e))?;

        match row {
            Some(row) => {
                let payload: String = row
                    .try_get("payload")
                    .map_err(|e| StoreError::storage(format!("Failed to get payload: {}", e)))?;
                Ok(Some(ClientInfo::from_payload(&payload)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ClientStore for MySqlClientStore {
    async fn insert(&self, client: &ClientInfo) -> StoreResult<()> {
        let query = format!(
            "INSERT INTO `{}` (id, secret, domain, payload, created_at) VALUES (?, ?, ?, ?, ?)",
            self.table
        );

        sqlx::query(&query)
            .bind(client.id.as_bytes())
            .bind(&client.secret)
            .bind(client.host())
            .bind(client.to_payload()?)
            .bind(Utc::now())
            .execute(self.pool.pool())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::conflict("id")
                } else {
                    storage_error("Failed to insert client", e)
                }
            })?;

        tracing::debug!(table = %self.table, client_id = %client.id, "Stored client");
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<ClientInfo>> {
        self.find_one("id", id).await
    }

    async fn find_by_domain(&self, host: &str) -> StoreResult<Option<ClientInfo>> {
        self.find_one("domain", host).await
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
