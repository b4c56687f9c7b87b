//! Registered client persistence.

mod r#trait;
pub use r#trait::ClientStore;

mod memory;
pub use memory::MemoryClientStore;
