//! Simulated time for the dispatch engine
//!
//! The simulation advances in discrete ticks driven only by explicit
//! caller requests. There is no wall clock anywhere in the engine.

use serde::{Deserialize, Serialize};

/// Discrete simulation clock owned by a single engine instance
///
/// # Example
/// ```
/// use emergency_dispatch_core_rs::SimClock;
///
/// let mut clock = SimClock::new();
/// assert_eq!(clock.current_tick(), 0);
///
/// clock.advance_tick();
/// assert_eq!(clock.current_tick(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    /// Ticks elapsed since the engine was created
    current_tick: i32,
}

impl SimClock {
    /// Create a clock at tick 0
    pub fn new() -> Self {
        Self { current_tick: 0 }
    }

    /// Advance time by one tick and return the new tick
    ///
    /// # Example
    /// ```
    /// use emergency_dispatch_core_rs::SimClock;
    ///
    /// let mut clock = SimClock::new();
    /// assert_eq!(clock.advance_tick(), 1);
    /// assert_eq!(clock.advance_tick(), 2);
    /// ```
    pub fn advance_tick(&mut self) -> i32 {
        self.current_tick = self.current_tick.saturating_add(1);
        self.current_tick
    }

    /// Current tick (total ticks since start)
    pub fn current_tick(&self) -> i32 {
        self.current_tick
    }

    /// Whether the current tick falls on a multiple of `period`
    ///
    /// A period of 0 never matches. Tick 0 never matches either, since
    /// nothing has happened before the first advance.
    ///
    /// # Example
    /// ```
    /// use emergency_dispatch_core_rs::SimClock;
    ///
    /// let mut clock = SimClock::new();
    /// for _ in 0..3 {
    ///     clock.advance_tick();
    /// }
    /// assert!(clock.is_multiple_of(3));
    /// assert!(!clock.is_multiple_of(2));
    /// ```
    pub fn is_multiple_of(&self, period: u32) -> bool {
        if period == 0 || self.current_tick <= 0 {
            return false;
        }
        i64::from(self.current_tick) % i64::from(period) == 0
    }
}
