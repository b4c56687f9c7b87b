//! Background reclamation for token stores
//!
//! A sweep deletes every record that is expired or whose three keys have all
//! been removed. Sweeps run on a fixed interval in one task per store; a
//! failed sweep is logged and the schedule carries on.

mod reclaimer;


pub use reclaimer::{Reclaimer, ReclaimerHandle, SweepOutcome};
