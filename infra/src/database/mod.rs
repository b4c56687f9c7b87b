//! Database module - MySQL implementations using SQLx
//!
//! - Connection pool management
//! - Table layouts
//! - Token and client store engines

pub mod connection;
pub mod mysql;
pub mod schema;

// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{MySqlClientStore, MySqlTokenStore};
