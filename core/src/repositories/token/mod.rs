//! Token record persistence.

mod r#trait;
pub use r#trait::TokenStore;

mod memory;
pub use memory::MemoryTokenStore;

#[cfg(test)]
mod tests;
