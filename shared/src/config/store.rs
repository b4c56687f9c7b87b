//! Token and client store configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::database::DatabaseConfig;

/// Table used by the token store when none is configured
pub const DEFAULT_TOKEN_TABLE: &str = "oauth2_token";

/// Table used by the client store when none is configured
pub const DEFAULT_CLIENT_TABLE: &str = "oauth2_client";

/// Sweep interval used when none (or a non-positive one) is configured
pub const DEFAULT_RECLAIM_INTERVAL_SECS: i64 = 30 * 60;

/// Background reclamation settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReclaimConfig {
    /// Seconds between sweeps; zero or negative selects the default
    #[serde(default = "default_interval_secs")]
    pub interval_secs: i64,

    /// Suppress the sweep entirely
    #[serde(default)]
    pub disabled: bool,
}

impl Default for ReclaimConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_RECLAIM_INTERVAL_SECS,
            disabled: false,
        }
    }
}

impl ReclaimConfig {
    /// A configuration that never sweeps
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Default::default()
        }
    }

    /// A configuration sweeping every `secs` seconds
    pub fn every_secs(secs: i64) -> Self {
        Self {
            interval_secs: secs,
            disabled: false,
        }
    }

    /// Interval actually used by the reclaimer
    pub fn interval(&self) -> Duration {
        let secs = if self.interval_secs > 0 {
            self.interval_secs
        } else {
            DEFAULT_RECLAIM_INTERVAL_SECS
        };
        Duration::from_secs(secs as u64)
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            interval_secs: std::env::var("O2S_RECLAIM_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RECLAIM_INTERVAL_SECS),
            disabled: std::env::var("O2S_RECLAIM_DISABLED")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}

/// Configuration for the token store
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenStoreConfig {
    /// Backing database
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Table name; empty selects [`DEFAULT_TOKEN_TABLE`]
    #[serde(default)]
    pub table: String,

    /// Reclamation settings
    #[serde(default)]
    pub reclaim: ReclaimConfig,
}

impl TokenStoreConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig::from_env(),
            table: std::env::var("O2S_TOKEN_TABLE").unwrap_or_default(),
            reclaim: ReclaimConfig::from_env(),
        }
    }

    /// Table name actually used by the store
    pub fn table_name(&self) -> &str {
        if self.table.is_empty() {
            DEFAULT_TOKEN_TABLE
        } else {
            &self.table
        }
    }
}

/// Configuration for the client store
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientStoreConfig {
    /// Backing database
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Table name; empty selects [`DEFAULT_CLIENT_TABLE`]
    #[serde(default)]
    pub table: String,
}

impl ClientStoreConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig::from_env(),
            table: std::env::var("O2S_CLIENT_TABLE").unwrap_or_default(),
        }
    }

    /// Table name actually used by the store
    pub fn table_name(&self) -> &str {
        if self.table.is_empty() {
            DEFAULT_CLIENT_TABLE
        } else {
            &self.table
        }
    }
}

fn default_interval_secs() -> i64 {
    DEFAULT_RECLAIM_INTERVAL_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_defaults_to_thirty_minutes() {
        assert_eq!(ReclaimConfig::default().interval(), Duration::from_secs(1800));
    }

    #[test]
    fn test_non_positive_interval_falls_back_to_default() {
        assert_eq!(ReclaimConfig::every_secs(0).interval(), Duration::from_secs(1800));
        assert_eq!(ReclaimConfig::every_secs(-5).interval(), Duration::from_secs(1800));
        assert_eq!(ReclaimConfig::every_secs(90).interval(), Duration::from_secs(90));
    }

    #[test]
    fn test_table_name_defaults() {
        let token = TokenStoreConfig::default();
        assert_eq!(token.table_name(), "oauth2_token");

        let token = TokenStoreConfig {
            table: "grants".to_string(),
            ..Default::default()
        };
        assert_eq!(token.table_name(), "grants");

        assert_eq!(ClientStoreConfig::default().table_name(), "oauth2_client");
    }

    #[test]
    fn test_disabled_constructor() {
        let config = ReclaimConfig::disabled();
        assert!(config.disabled);
        assert_eq!(config.interval_secs, DEFAULT_RECLAIM_INTERVAL_SECS);
    }
}
