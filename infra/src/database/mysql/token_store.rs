//! MySQL implementation of the TokenStore trait.
//!
//! One row per grant. Empty keys are written as NULL so the unique indexes on
//! `code`, `access` and `refresh` only constrain keys that are in use, and a
//! removed key is set back to NULL so it can never match again. Keys are bound
//! and read as raw bytes to match the `VARBINARY` columns exactly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::Row;

use o2s_core::domain::entities::token::{NewTokenRecord, TokenKind, TokenRecord};
use o2s_core::errors::{StoreError, StoreResult};
use o2s_core::repositories::TokenStore;

use super::error_mapping::{storage_error, token_insert_error};
use crate::database::connection::DatabasePool;
use crate::database::schema::{token_table_ddl, validate_table_name};
use crate::InfrastructureError;

/// Rows that are expired or whose keys have all been removed
const RECLAIMABLE: &str =
    "expires_at <= ? OR (code IS NULL AND access IS NULL AND refresh IS NULL)";

/// Statements for one token table, rendered once at construction
struct TokenQueries {
    insert: String,
    find_by_code: String,
    find_by_access: String,
    find_by_refresh: String,
    clear_code: String,
    clear_access: String,
    clear_refresh: String,
    count_reclaimable: String,
    delete_reclaimable: String,
}

impl TokenQueries {
    fn new(table: &str) -> Self {
        let select = |column: &str| {
            format!(
                "SELECT id, created_at, expires_at, code, access, refresh, payload \
                 FROM `{table}` WHERE {column} = ? LIMIT 1"
            )
        };
        let clear = |column: &str| {
            format!("UPDATE `{table}` SET {column} = NULL WHERE {column} = ?")
        };

        Self {
            insert: format!(
                "INSERT INTO `{table}` (created_at, expires_at, code, access, refresh, payload) \
                 VALUES (?, ?, ?, ?, ?, ?)"
            ),
            find_by_code: select("code"),
            find_by_access: select("access"),
            find_by_refresh: select("refresh"),
            clear_code: clear("code"),
            clear_access: clear("access"),
            clear_refresh: clear("refresh"),
            count_reclaimable: format!(
                "SELECT COUNT(*) FROM `{table}` WHERE {RECLAIMABLE}"
            ),
            delete_reclaimable: format!("DELETE FROM `{table}` WHERE {RECLAIMABLE}"),
        }
    }

    fn find_by(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Code => &self.find_by_code,
            TokenKind::Access => &self.find_by_access,
            TokenKind::Refresh => &self.find_by_refresh,
        }
    }

    fn clear_by(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Code => &self.clear_code,
            TokenKind::Access => &self.clear_access,
            TokenKind::Refresh => &self.clear_refresh,
        }
    }
}

/// Token store backed by a MySQL table
///
/// Usually obtained through [`open_token_store`](crate::open_token_store),
/// which also starts the reclaimer.
pub struct MySqlTokenStore {
    /// Database connection pool
    pool: DatabasePool,
    table: String,
    queries: TokenQueries,
}

impl MySqlTokenStore {
    /// Create a store on `table`
    ///
    /// The table name is validated but the table itself is not touched; see
    /// [`MySqlTokenStore::ensure_schema`].
    ///
    /// # Arguments
    /// * `pool` - Connection pool the store runs its queries on
    /// * `table` - Table name; ASCII letters, digits and underscores only
    ///
    /// # Returns
    /// * `Ok(MySqlTokenStore)` - Store ready for use once the table exists
    /// * `Err(InfrastructureError::Config)` - `table` is not a plain identifier
    ///
    /// # Example
    /// ```no_run
    /// use o2s_infra::{DatabasePool, MySqlTokenStore};
    /// use o2s_shared::config::DatabaseConfig;
    ///
    /// async fn engine() -> Result<MySqlTokenStore, Box<dyn std::error::Error>> {
    ///     let pool = DatabasePool::connect(&DatabaseConfig::from_env()).await?;
    ///     let store = MySqlTokenStore::new(pool, "oauth2_token")?;
    ///     store.ensure_schema().await?;
    ///     Ok(store)
    /// }
    /// ```
    pub fn new(pool: DatabasePool, table: &str) -> Result<Self, InfrastructureError> {
        validate_table_name(table)?;

        Ok(Self {
            pool,
            table: table.to_string(),
            queries: TokenQueries::new(table),
        })
    }

    /// Create the table and its indexes if they do not exist yet
    ///
    /// # Returns
    /// * `Ok(())` - The table exists
    /// * `Err(InfrastructureError::Database)` - The DDL statement failed
    pub async fn ensure_schema(&self) -> Result<(), InfrastructureError> {
        sqlx::query(&token_table_ddl(&self.table))
            .execute(self.pool.pool())
            .await?;

        tracing::info!(table = %self.table, "Token table ready");
        Ok(())
    }

    /// Name of the backing table
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Map a database row to a TokenRecord. NULL keys become empty strings.
    fn row_to_record(row: &MySqlRow) -> StoreResult<TokenRecord> {
        let column = |name: &str, e: sqlx::Error| {
            StoreError::storage(format!("Failed to get {}: {}", name, e))
        };
        let key = |name: &str| -> StoreResult<String> {
            let bytes = row
                .try_get::<Option<Vec<u8>>, _>(name)
                .map_err(|e| column(name, e))?;
            String::from_utf8(bytes.unwrap_or_default())
                .map_err(|e| StoreError::storage(format!("Invalid {} key: {}", name, e)))
        };

        Ok(TokenRecord {
            id: row.try_get("id").map_err(|e| column("id", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| column("created_at", e))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| column("expires_at", e))?,
            code: key("code")?,
            access: key("access")?,
            refresh: key("refresh")?,
            payload: row.try_get("payload").map_err(|e| column("payload", e))?,
        })
    }
}

/// Bind value for a key column: NULL when the key is absent
fn key_param(value: &str) -> Option<&[u8]> {
    (!value.is_empty()).then_some(value.as_bytes())
}

#[async_trait]
impl TokenStore for MySqlTokenStore {
    async fn insert(&self, record: NewTokenRecord) -> StoreResult<()> {
        let result = sqlx::query(&self.queries.insert)
            .bind(record.created_at)
            .bind(record.expires_at)
            .bind(key_param(&record.code))
            .bind(key_param(&record.access))
            .bind(key_param(&record.refresh))
            .bind(&record.payload)
            .execute(self.pool.pool())
            .await
            .map_err(token_insert_error)?;

        tracing::debug!(
            table = %self.table,
            id = result.last_insert_id(),
            "Stored token record"
        );
        Ok(())
    }

    async fn find_by(&self, kind: TokenKind, value: &str) -> StoreResult<Option<TokenRecord>> {
        let row = sqlx::query(self.queries.find_by(kind))
            .bind(value.as_bytes())
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| storage_error("Failed to find token record", e))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn clear_by(&self, kind: TokenKind, value: &str) -> StoreResult<()> {
        let result = sqlx::query(self.queries.clear_by(kind))
            .bind(value.as_bytes())
            .execute(self.pool.pool())
            .await
            .map_err(|e| storage_error("Failed to remove token key", e))?;

        tracing::debug!(
            table = %self.table,
            kind = %kind,
            rows = result.rows_affected(),
            "Removed token key"
        );
        Ok(())
    }

    async fn count_reclaimable(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar(&self.queries.count_reclaimable)
            .bind(now)
            .fetch_one(self.pool.pool())
            .await
            .map_err(|e| storage_error("Failed to count reclaimable token records", e))?;

        Ok(count.max(0) as u64)
    }

    async fn delete_reclaimable(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query(&self.queries.delete_reclaimable)
            .bind(now)
            .execute(self.pool.pool())
            .await
            .map_err(|e| storage_error("Failed to delete reclaimable token records", e))?;

        Ok(result.rows_affected())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
