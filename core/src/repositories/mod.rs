//! Store contracts and the in-memory engines.

pub mod client;
pub mod token;

pub use client::{ClientStore, MemoryClientStore};
pub use token::{MemoryTokenStore, TokenStore};
