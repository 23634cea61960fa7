//! City service map
//!
//! Neighborhood to per-category available-unit counters. Purely
//! informational: dispatch decisions never read it.

use crate::models::incident::ServiceCategory;
use std::collections::BTreeMap;

/// Available-unit counters per neighborhood
#[derive(Debug, Clone, Default)]
pub struct ServiceMap {
    counters: BTreeMap<i32, BTreeMap<ServiceCategory, u32>>,
}

impl ServiceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a neighborhood with no services; returns false if already present
    pub fn add_neighborhood(&mut self, neighborhood_id: i32) -> bool {
        if self.counters.contains_key(&neighborhood_id) {
            return false;
        }
        self.counters.insert(neighborhood_id, BTreeMap::new());
        true
    }

    /// Add one unit of `category` to a neighborhood
    ///
    /// Creates the category entry on first use. Returns false if the
    /// neighborhood is not on the map.
    pub fn add_service(&mut self, neighborhood_id: i32, category: ServiceCategory) -> bool {
        match self.counters.get_mut(&neighborhood_id) {
            Some(services) => {
                *services.entry(category).or_insert(0) += 1;
                true
            }
            None => false,
        }
    }

    /// Shift a counter by `delta`, clamping at zero
    ///
    /// Returns false if the neighborhood or the category is missing.
    pub fn adjust(&mut self, neighborhood_id: i32, category: ServiceCategory, delta: i32) -> bool {
        let Some(count) = self
            .counters
            .get_mut(&neighborhood_id)
            .and_then(|services| services.get_mut(&category))
        else {
            return false;
        };
        let updated = i64::from(*count) + i64::from(delta);
        *count = u32::try_from(updated.max(0)).unwrap_or(u32::MAX);
        true
    }

    pub fn available(&self, neighborhood_id: i32, category: ServiceCategory) -> Option<u32> {
        self.counters
            .get(&neighborhood_id)
            .and_then(|services| services.get(&category))
            .copied()
    }

    /// Neighborhoods in id order with their counters
    pub fn iter(&self) -> impl Iterator<Item = (i32, &BTreeMap<ServiceCategory, u32>)> + '_ {
        self.counters.iter().map(|(id, services)| (*id, services))
    }
}
