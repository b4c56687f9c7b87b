//! Configuration module
//!
//! - `database` - MySQL connection settings
//! - `store` - token store, client store and reclamation settings
//! - `logging` - log level and format

pub mod database;
pub mod logging;
pub mod store;

use serde::{Deserialize, Serialize};

pub use database::DatabaseConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use store::{
    ClientStoreConfig, ReclaimConfig, TokenStoreConfig, DEFAULT_CLIENT_TABLE,
    DEFAULT_RECLAIM_INTERVAL_SECS, DEFAULT_TOKEN_TABLE,
};

/// Prefix for layered environment overrides, e.g. `O2S__TOKEN_STORE__TABLE`
pub const ENV_PREFIX: &str = "O2S";

/// Complete configuration for a process hosting the stores
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Token store configuration
    #[serde(default)]
    pub token_store: TokenStoreConfig,

    /// Client store configuration
    #[serde(default)]
    pub client_store: ClientStoreConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from flat environment variables (`O2S_DB_ADDR`,
    /// `O2S_TOKEN_TABLE`, ...). A `.env` file is read first when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            token_store: TokenStoreConfig::from_env(),
            client_store: ClientStoreConfig::from_env(),
            logging: LoggingConfig::from_env(),
        }
    }

    /// Load configuration from an optional TOML file layered under
    /// `O2S__`-prefixed environment variables.
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }
}
