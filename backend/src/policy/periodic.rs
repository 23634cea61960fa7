//! Clock-driven release policies

use super::ReleasePolicy;
use crate::core::time::SimClock;
use crate::models::registry::UnitRegistry;

/// Free every busy unit whenever the tick is a multiple of `period`
///
/// # Example
///
/// ```
/// use emergency_dispatch_core_rs::policy::{PeriodicRelease, ReleasePolicy};
/// use emergency_dispatch_core_rs::{ServiceCategory, SimClock, Unit, UnitRegistry};
///
/// let mut units = UnitRegistry::new();
/// units.register(Unit::new(101, ServiceCategory::Medical, "AMB-01")).unwrap();
/// units.set_available(101, false);
///
/// let mut policy = PeriodicRelease::new(3);
/// let mut clock = SimClock::new();
/// clock.advance_tick();
/// assert!(policy.units_to_release(&clock, &units).is_empty());
///
/// clock.advance_tick();
/// clock.advance_tick();
/// assert_eq!(policy.units_to_release(&clock, &units), vec![101]);
/// ```
#[derive(Debug, Clone)]
pub struct PeriodicRelease {
    period: u32,
}

impl PeriodicRelease {
    pub fn new(period: u32) -> Self {
        Self { period }
    }

    pub fn period(&self) -> u32 {
        self.period
    }
}

impl ReleasePolicy for PeriodicRelease {
    fn units_to_release(&mut self, clock: &SimClock, units: &UnitRegistry) -> Vec<u32> {
        if clock.is_multiple_of(self.period) {
            units.busy_units()
        } else {
            Vec::new()
        }
    }

    fn name(&self) -> &'static str {
        "periodic"
    }
}

/// Never release anything
#[derive(Debug, Clone, Default)]
pub struct NoRelease;

impl ReleasePolicy for NoRelease {
    fn units_to_release(&mut self, _clock: &SimClock, _units: &UnitRegistry) -> Vec<u32> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
