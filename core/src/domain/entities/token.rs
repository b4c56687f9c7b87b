//! Token entities for the OAuth2 grant store.
//!
//! A [`TokenInfo`] is what the protocol layer hands to the store; a
//! [`TokenRecord`] is the persisted row derived from it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration as StdDuration;

use crate::errors::{StoreError, StoreResult};

/// The three token kinds a record can be addressed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Authorization code
    Code,
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

impl TokenKind {
    /// All kinds, in lifecycle order
    pub const ALL: [TokenKind; 3] = [TokenKind::Code, TokenKind::Access, TokenKind::Refresh];

    /// Column holding this kind in the token table
    pub fn column(&self) -> &'static str {
        match self {
            TokenKind::Code => "code",
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Token information for one grant, as issued by the protocol layer.
///
/// This is the payload stored with every record. The store only reads the
/// token strings and their timing to derive the record's keys and expiry;
/// everything else travels through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub client_id: String,
    pub user_id: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default)]
    pub scope: String,

    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub code_challenge: String,
    #[serde(default)]
    pub code_challenge_method: String,
    #[serde(default = "epoch")]
    pub code_create_at: DateTime<Utc>,
    #[serde(default)]
    pub code_expires_in: StdDuration,

    #[serde(default)]
    pub access: String,
    #[serde(default = "epoch")]
    pub access_create_at: DateTime<Utc>,
    #[serde(default)]
    pub access_expires_in: StdDuration,

    #[serde(default)]
    pub refresh: String,
    #[serde(default = "epoch")]
    pub refresh_create_at: DateTime<Utc>,
    #[serde(default)]
    pub refresh_expires_in: StdDuration,
}

impl TokenInfo {
    /// Creates token information for a client and user with no tokens yet
    pub fn new(client_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            user_id: user_id.into(),
            redirect_uri: String::new(),
            scope: String::new(),
            code: String::new(),
            code_challenge: String::new(),
            code_challenge_method: String::new(),
            code_create_at: epoch(),
            code_expires_in: StdDuration::ZERO,
            access: String::new(),
            access_create_at: epoch(),
            access_expires_in: StdDuration::ZERO,
            refresh: String::new(),
            refresh_create_at: epoch(),
            refresh_expires_in: StdDuration::ZERO,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    /// Attach an authorization code issued at `created_at`
    pub fn with_code(
        mut self,
        code: impl Into<String>,
        created_at: DateTime<Utc>,
        expires_in: StdDuration,
    ) -> Self {
        self.code = code.into();
        self.code_create_at = created_at;
        self.code_expires_in = expires_in;
        self
    }

    /// Attach an access token issued at `created_at`
    pub fn with_access(
        mut self,
        access: impl Into<String>,
        created_at: DateTime<Utc>,
        expires_in: StdDuration,
    ) -> Self {
        self.access = access.into();
        self.access_create_at = created_at;
        self.access_expires_in = expires_in;
        self
    }

    /// Attach a refresh token issued at `created_at`
    pub fn with_refresh(
        mut self,
        refresh: impl Into<String>,
        created_at: DateTime<Utc>,
        expires_in: StdDuration,
    ) -> Self {
        self.refresh = refresh.into();
        self.refresh_create_at = created_at;
        self.refresh_expires_in = expires_in;
        self
    }

    /// Attach a PKCE challenge to the authorization code
    pub fn with_code_challenge(
        mut self,
        challenge: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        self.code_challenge = challenge.into();
        self.code_challenge_method = method.into();
        self
    }

    /// Token string of the given kind; empty when absent
    pub fn token(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Code => &self.code,
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Absolute expiry of the given token kind
    pub fn expires_at(&self, kind: TokenKind) -> StoreResult<DateTime<Utc>> {
        let (created_at, expires_in) = match kind {
            TokenKind::Code => (self.code_create_at, self.code_expires_in),
            TokenKind::Access => (self.access_create_at, self.access_expires_in),
            TokenKind::Refresh => (self.refresh_create_at, self.refresh_expires_in),
        };

        Duration::from_std(expires_in)
            .ok()
            .and_then(|d| created_at.checked_add_signed(d))
            .ok_or_else(|| StoreError::Validation {
                message: format!("{} expiry is out of range", kind),
            })
    }

    /// The kind whose expiry governs the whole record.
    ///
    /// A code takes precedence over an access token; a refresh token never
    /// governs. `None` when neither a code nor an access token is present.
    pub fn active_kind(&self) -> Option<TokenKind> {
        if !self.code.is_empty() {
            Some(TokenKind::Code)
        } else if !self.access.is_empty() {
            Some(TokenKind::Access)
        } else {
            None
        }
    }

    /// Encode as the opaque payload stored with a record
    pub fn to_payload(&self) -> StoreResult<String> {
        serde_json::to_string(self).map_err(|e| StoreError::Storage {
            message: format!("Failed to encode token payload: {}", e),
        })
    }

    /// Decode a payload previously produced by [`TokenInfo::to_payload`]
    pub fn from_payload(payload: &str) -> StoreResult<Self> {
        serde_json::from_str(payload).map_err(|e| StoreError::Storage {
            message: format!("Failed to decode token payload: {}", e),
        })
    }
}

/// A persisted token record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    /// Surrogate key assigned by the store
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Authorization code; empty once removed or when never issued
    pub code: String,
    /// Access token; empty once removed or when never issued
    pub access: String,
    /// Refresh token; empty once removed or when never issued
    pub refresh: String,
    /// Opaque serialized [`TokenInfo`]
    pub payload: String,
}

impl TokenRecord {
    /// Key value of the given kind
    pub fn key(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Code => &self.code,
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Mutable key value of the given kind
    pub fn key_mut(&mut self, kind: TokenKind) -> &mut String {
        match kind {
            TokenKind::Code => &mut self.code,
            TokenKind::Access => &mut self.access,
            TokenKind::Refresh => &mut self.refresh,
        }
    }

    /// All three keys are empty; the record can no longer be looked up
    pub fn is_dead(&self) -> bool {
        self.code.is_empty() && self.access.is_empty() && self.refresh.is_empty()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether a sweep at `now` deletes this record
    pub fn is_reclaimable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_expired_at(now) || self.is_dead()
    }

    /// Decode the payload
    pub fn info(&self) -> StoreResult<TokenInfo> {
        TokenInfo::from_payload(&self.payload)
    }
}

/// A record about to be inserted; everything but the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTokenRecord {
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub code: String,
    pub access: String,
    pub refresh: String,
    pub payload: String,
}

impl NewTokenRecord {
    /// Derive the record for `info`, created at `now`.
    ///
    /// Fails with a validation error when neither a code nor an access token
    /// is present, or when the governing expiry cannot be represented.
    pub fn from_info(info: &TokenInfo, now: DateTime<Utc>) -> StoreResult<Self> {
        let kind = info.active_kind().ok_or_else(|| StoreError::Validation {
            message: "a code or an access token is required".to_string(),
        })?;

        Ok(Self {
            created_at: now,
            expires_at: info.expires_at(kind)?,
            code: info.code.clone(),
            access: info.access.clone(),
            refresh: info.refresh.clone(),
            payload: info.to_payload()?,
        })
    }

    /// Non-empty keys carried by this record
    pub fn keys(&self) -> impl Iterator<Item = (TokenKind, &str)> {
        TokenKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.key(kind)))
            .filter(|(_, value)| !value.is_empty())
    }

    pub fn key(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Code => &self.code,
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Attach the id assigned by the store
    pub fn into_record(self, id: u64) -> TokenRecord {
        TokenRecord {
            id,
            created_at: self.created_at,
            expires_at: self.expires_at,
            code: self.code,
            access: self.access,
            refresh: self.refresh,
            payload: self.payload,
        }
    }
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}
