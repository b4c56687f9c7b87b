//! Services built on top of the store contracts.

pub mod managed;
pub mod reclaim;

pub use managed::ManagedTokenStore;
pub use reclaim::{Reclaimer, ReclaimerHandle, SweepOutcome};
