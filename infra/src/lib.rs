//! # Infrastructure Layer
//!
//! MySQL engines for the OAuth2 token and client stores, built on SQLx.
//!
//! [`open_token_store`] is the usual entry point: it connects, makes sure the
//! table exists and starts the background reclaimer configured in
//! [`TokenStoreConfig`].
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

use std::sync::Arc;

use o2s_core::errors::StoreError;
use o2s_core::services::ManagedTokenStore;
use o2s_shared::config::{ClientStoreConfig, TokenStoreConfig};

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

#[cfg(feature = "mysql")]
pub use database::{DatabasePool, MySqlClientStore, MySqlTokenStore, PoolStatistics};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for StoreError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Database(sqlx::Error::PoolClosed) => StoreError::closed(),
            InfrastructureError::Config(message) => StoreError::Validation { message },
            other => StoreError::storage(other.to_string()),
        }
    }
}

/// Open a MySQL token store and start its reclaimer.
///
/// Connects, creates the table when missing and, unless reclamation is
/// disabled, schedules the first sweep one interval from now. Must be called
/// from within a Tokio runtime.
#[cfg(feature = "mysql")]
pub async fn open_token_store(
    config: &TokenStoreConfig,
) -> Result<ManagedTokenStore<MySqlTokenStore>, InfrastructureError> {
    let table = config.table_name();
    let pool = DatabasePool::connect(&config.database).await?;

    let store = match MySqlTokenStore::new(pool.clone(), table) {
        Ok(store) => store,
        Err(e) => {
            pool.close().await;
            return Err(e);
        }
    };
    if let Err(e) = store.ensure_schema().await {
        pool.close().await;
        return Err(e);
    }

    tracing::info!(
        table,
        database = %config.database.database,
        "Token store opened"
    );

    Ok(ManagedTokenStore::start(Arc::new(store), table, &config.reclaim))
}

/// Open a MySQL client store, creating its table when missing
#[cfg(feature = "mysql")]
pub async fn open_client_store(
    config: &ClientStoreConfig,
) -> Result<MySqlClientStore, InfrastructureError> {
    let table = config.table_name();
    let pool = DatabasePool::connect(&config.database).await?;

    let store = match MySqlClientStore::new(pool.clone(), table) {
        Ok(store) => store,
        Err(e) => {
            pool.close().await;
            return Err(e);
        }
    };
    if let Err(e) = store.ensure_schema().await {
        pool.close().await;
        return Err(e);
    }

    tracing::info!(table, "Client store opened");
    Ok(store)
}
