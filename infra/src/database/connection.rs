//! Database connection pool management
//!
//! Builds the SQLx MySQL pool a store runs on from a [`DatabaseConfig`], with
//! statement logging, health checks and pool statistics.

use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    ConnectOptions, MySqlPool,
};
use std::time::Duration;
use log::LevelFilter;

use o2s_shared::config::DatabaseConfig;

use crate::InfrastructureError;

/// Database connection pool wrapper
///
/// Cheap to clone; every clone shares the same underlying pool.
#[derive(Clone)]
pub struct DatabasePool {
    /// SQLx MySQL connection pool
    pool: MySqlPool,
    /// Configuration used to create this pool
    config: DatabaseConfig,
}

impl DatabasePool {
    /// Connect to the database described by `config`
    ///
    /// # Example
    /// ```no_run
    /// use o2s_infra::database::DatabasePool;
    /// use o2s_shared::config::DatabaseConfig;
    ///
    /// async fn create_pool() -> Result<DatabasePool, Box<dyn std::error::Error>> {
    ///     let config = DatabaseConfig::new("127.0.0.1:3306", "oauth2")
    ///         .with_credentials("root", "secret");
    ///     let pool = DatabasePool::connect(&config).await?;
    ///     Ok(pool)
    /// }
    /// ```
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, InfrastructureError> {
        if config.addr.is_empty() {
            return Err(InfrastructureError::Config(
                "database address is required".to_string(),
            ));
        }
        if config.database.is_empty() {
            return Err(InfrastructureError::Config(
                "database name is required".to_string(),
            ));
        }

        tracing::info!(
            url = %config.redacted_url(),
            max_connections = config.max_connections,
            "Creating database connection pool"
        );

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(600)) // 10 minutes
            .max_lifetime(Duration::from_secs(1800)) // 30 minutes
            .test_before_acquire(true)
            .connect_with(Self::connect_options(config))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to create database pool");
                InfrastructureError::Database(e)
            })?;

        tracing::info!("Database connection pool created successfully");

        Ok(Self {
            pool,
            config: config.clone(),
        })
    }

    fn connect_options(config: &DatabaseConfig) -> MySqlConnectOptions {
        let (host, port) = config.host_port();

        MySqlConnectOptions::new()
            .host(host)
            .port(port)
            .username(&config.user_name)
            .password(&config.password)
            .database(&config.database)
            .charset("utf8mb4")
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(
                LevelFilter::Warn,
                Duration::from_millis(config.slow_statement_threshold),
            )
    }

    /// The underlying SQLx pool
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Configuration the pool was created from
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Run `SELECT 1` to verify connectivity
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        tracing::debug!("Performing database health check");

        let value: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Database health check failed");
                InfrastructureError::Database(e)
            })?;

        if value == 1 {
            Ok(true)
        } else {
            tracing::warn!(value, "Database health check returned unexpected value");
            Ok(false)
        }
    }

    /// Current state of the pool
    pub fn statistics(&self) -> PoolStatistics {
        PoolStatistics {
            connections: self.pool.size(),
            idle_connections: self.pool.num_idle(),
            max_connections: self.pool.options().get_max_connections(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Close every connection. Queries issued afterwards fail immediately.
    pub async fn close(&self) {
        if self.pool.is_closed() {
            return;
        }
        tracing::info!(database = %self.config.database, "Closing database connection pool");
        self.pool.close().await;
    }
}

/// Connection pool statistics
#[derive(Debug, Clone)]
pub struct PoolStatistics {
    /// Total number of connections in the pool
    pub connections: u32,
    /// Number of idle connections
    pub idle_connections: usize,
    /// Maximum allowed connections
    pub max_connections: u32,
}

impl std::fmt::Display for PoolStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} connections ({} idle)",
            self.connections, self.max_connections, self.idle_connections
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_missing_address() {
        let config = DatabaseConfig::new("", "oauth2");

        let result = DatabasePool::connect(&config).await;
        assert!(matches!(result, Err(InfrastructureError::Config(_))));
    }

    #[tokio::test]
    async fn test_connect_rejects_missing_database() {
        let config = DatabaseConfig::new("127.0.0.1:3306", "");

        let result = DatabasePool::connect(&config).await;
        assert!(matches!(result, Err(InfrastructureError::Config(_))));
    }

    #[tokio::test]
    #[ignore] // Requires actual database
    async fn test_pool_health_check() {
        let config = DatabaseConfig::from_env().with_max_connections(2);

        let pool = DatabasePool::connect(&config).await.unwrap();
        assert!(pool.health_check().await.unwrap());

        pool.close().await;
        assert!(pool.is_closed());
        assert!(pool.health_check().await.is_err());
    }

    #[test]
    fn test_pool_statistics_display() {
        let stats = PoolStatistics {
            connections: 5,
            idle_connections: 3,
            max_connections: 10,
        };

        assert_eq!(stats.to_string(), "5/10 connections (3 idle)");
    }
}
