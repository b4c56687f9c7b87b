//! Registered OAuth2 client entity.

use serde::{Deserialize, Serialize};

use crate::errors::{StoreError, StoreResult};

/// A registered OAuth2 client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client identifier
    pub id: String,
    /// Client secret
    pub secret: String,
    /// Redirect domain; may be given as a full URL
    pub domain: String,
    /// Owning user, if any
    #[serde(default)]
    pub user_id: String,
    /// Public clients cannot keep a secret
    #[serde(default)]
    pub public: bool,
}

impl ClientInfo {
    pub fn new(id: impl Into<String>, secret: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
            domain: domain.into(),
            user_id: String::new(),
            public: false,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Check the fields every stored client must carry
    pub fn validate(&self) -> StoreResult<()> {
        let missing: Vec<&str> = [
            ("id", &self.id),
            ("secret", &self.secret),
            ("domain", &self.domain),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation {
                message: format!("client {} required", missing.join(", ")),
            })
        }
    }

    /// Host part of the configured domain, used as the lookup key
    pub fn host(&self) -> &str {
        parse_domain(&self.domain)
    }

    pub fn to_payload(&self) -> StoreResult<String> {
        serde_json::to_string(self).map_err(|e| StoreError::Storage {
            message: format!("Failed to encode client payload: {}", e),
        })
    }

    pub fn from_payload(payload: &str) -> StoreResult<Self> {
        serde_json::from_str(payload).map_err(|e| StoreError::Storage {
            message: format!("Failed to decode client payload: {}", e),
        })
    }
}

/// Strip an optional scheme and any path from a domain or URL.
///
/// `https://www.example.com/cb` and `www.example.com/cb` both yield
/// `www.example.com`.
pub fn parse_domain(url: &str) -> &str {
    let rest = match url.split_once("//") {
        Some((_, rest)) => rest,
        None => url,
    };
    rest.split('/').next().unwrap_or(rest)
}
