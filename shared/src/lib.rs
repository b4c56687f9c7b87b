//! Shared configuration and telemetry for the OAuth2 store crates
//!
//! - Configuration types and loaders
//! - Tracing subscriber setup

pub mod config;
pub mod telemetry;

pub use config::{
    AppConfig, ClientStoreConfig, DatabaseConfig, LogFormat, LoggingConfig, ReclaimConfig,
    TokenStoreConfig,
};
pub use telemetry::init_tracing;
