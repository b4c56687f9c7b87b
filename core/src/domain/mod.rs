//! Domain layer containing the token and client entities.

pub mod entities;
pub mod value_objects;

pub use entities::{parse_domain, ClientInfo, NewTokenRecord, TokenInfo, TokenKind, TokenRecord};
pub use value_objects::Lookup;
