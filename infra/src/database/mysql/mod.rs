//! MySQL store engines

mod error_mapping;

pub mod client_store;
pub mod token_store;

pub use client_store::MySqlClientStore;
pub use token_store::MySqlTokenStore;
