//! Unit release policies
//!
//! A release policy decides, at the start of each tick, which busy units
//! return to service before the dispatch checks run. Units carry no
//! per-incident timer; the policy is the only way they become free again.
//!
//! # Policy Interface
//!
//! ```rust
//! use emergency_dispatch_core_rs::policy::ReleasePolicy;
//! use emergency_dispatch_core_rs::{SimClock, UnitRegistry};
//!
//! struct ReleaseEverything;
//!
//! impl ReleasePolicy for ReleaseEverything {
//!     fn units_to_release(&mut self, _clock: &SimClock, units: &UnitRegistry) -> Vec<u32> {
//!         units.busy_units()
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "release_everything"
//!     }
//! }
//! ```
//!
//! Available policies:
//! 1. **PeriodicRelease**: frees every busy unit on ticks that are a
//!    multiple of the period (the built-in city uses 3)
//! 2. **NoRelease**: units stay busy forever once dispatched

mod periodic;

pub use periodic::{NoRelease, PeriodicRelease};

use crate::core::time::SimClock;
use crate::models::registry::UnitRegistry;

/// Decides which busy units return to service on the current tick
pub trait ReleasePolicy: Send {
    /// Ids of the units to mark available before this tick's dispatches
    fn units_to_release(&mut self, clock: &SimClock, units: &UnitRegistry) -> Vec<u32>;

    /// Short policy name for logs and snapshots
    fn name(&self) -> &'static str;
}

/// Policy matching a configured release period (0 disables releases)
pub fn policy_for_period(period: u32) -> Box<dyn ReleasePolicy> {
    if period == 0 {
        Box::new(NoRelease)
    } else {
        Box::new(PeriodicRelease::new(period))
    }
}
