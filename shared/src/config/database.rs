//! Database configuration module

use serde::{Deserialize, Serialize};

/// Connection settings for the MySQL instance backing a store.
///
/// Missing fields take their [`Default`] values, so a layered source may
/// override any subset of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Server address as `host:port`
    pub addr: String,

    /// Login user name
    pub user_name: String,

    /// Login password
    pub password: String,

    /// Database (schema) name
    pub database: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Slow statement threshold in milliseconds
    #[serde(default = "default_slow_statement_threshold")]
    pub slow_statement_threshold: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            addr: String::from("localhost:3306"),
            user_name: String::from("root"),
            password: String::from("root"),
            database: String::from("oauth2"),
            max_connections: default_max_connections(),
            connect_timeout: default_connect_timeout(),
            slow_statement_threshold: default_slow_statement_threshold(),
        }
    }
}

impl DatabaseConfig {
    /// Create from environment variables, falling back to the defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            addr: std::env::var("O2S_DB_ADDR").unwrap_or(defaults.addr),
            user_name: std::env::var("O2S_DB_USER").unwrap_or(defaults.user_name),
            password: std::env::var("O2S_DB_PASSWORD").unwrap_or(defaults.password),
            database: std::env::var("O2S_DB_NAME").unwrap_or(defaults.database),
            max_connections: std::env::var("O2S_DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_connections),
            connect_timeout: std::env::var("O2S_DB_CONNECT_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.connect_timeout),
            slow_statement_threshold: defaults.slow_statement_threshold,
        }
    }

    /// Create a configuration for the given address and database
    pub fn new(addr: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            database: database.into(),
            ..Default::default()
        }
    }

    /// Set the login credentials
    pub fn with_credentials(mut self, user_name: impl Into<String>, password: impl Into<String>) -> Self {
        self.user_name = user_name.into();
        self.password = password.into();
        self
    }

    /// Set the maximum number of connections
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Split `addr` into host and port. A missing or unparsable port means 3306.
    pub fn host_port(&self) -> (&str, u16) {
        match self.addr.rsplit_once(':') {
            Some((host, port)) => (host, port.parse().unwrap_or(DEFAULT_MYSQL_PORT)),
            None => (self.addr.as_str(), DEFAULT_MYSQL_PORT),
        }
    }

    /// Connection URL without the password, safe for logs
    pub fn redacted_url(&self) -> String {
        format!("mysql://{}:***@{}/{}", self.user_name, self.addr, self.database)
    }
}

/// Port used when `addr` does not carry one
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

fn default_max_connections() -> u32 {
    10
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_slow_statement_threshold() -> u64 {
    1000 // 1 second
}
