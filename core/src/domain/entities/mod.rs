//! Domain entities persisted by the stores.

pub mod client;
pub mod token;

#[cfg(test)]
mod tests;

pub use client::{parse_domain, ClientInfo};
pub use token::{NewTokenRecord, TokenInfo, TokenKind, TokenRecord};
