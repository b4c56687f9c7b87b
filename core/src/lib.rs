//! # OAuth2 Store Core
//!
//! Domain model and store contracts for persisting OAuth2 grants.
//! This crate contains the token and client entities, the error taxonomy,
//! the [`TokenStore`] and [`ClientStore`] contracts with in-memory engines,
//! and the background reclaimer that prunes dead token records.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{parse_domain, ClientInfo, Lookup, NewTokenRecord, TokenInfo, TokenKind, TokenRecord};
pub use errors::{StoreError, StoreResult};
pub use repositories::{ClientStore, MemoryClientStore, MemoryTokenStore, TokenStore};
pub use services::{ManagedTokenStore, Reclaimer, ReclaimerHandle, SweepOutcome};
