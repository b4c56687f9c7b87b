//! Value objects returned by the stores.

pub mod lookup;

pub use lookup::Lookup;
