//! Service unit registry
//!
//! Units are kept in registration order and searched linearly. Registries are
//! small (a handful of vehicles per category), so no index is maintained.

use crate::models::incident::ServiceCategory;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the unit registry and the neighborhood directory
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("Unit {0} is already registered")]
    DuplicateUnit(u32),

    #[error("Neighborhood {0} is already registered")]
    DuplicateNeighborhood(i32),

    #[error("Neighborhood {0} is not registered")]
    UnknownNeighborhood(i32),
}

/// A service unit (ambulance, fire truck, patrol car)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    id: u32,
    category: ServiceCategory,
    label: String,
    available: bool,
}

impl Unit {
    /// Create a unit; new units start available
    pub fn new(id: u32, category: ServiceCategory, label: impl Into<String>) -> Self {
        Self {
            id,
            category,
            label: label.into(),
            available: true,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn category(&self) -> ServiceCategory {
        self.category
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_available(&self) -> bool {
        self.available
    }
}

/// All registered units, in registration order
///
/// # Example
/// ```
/// use emergency_dispatch_core_rs::{ServiceCategory, Unit, UnitRegistry};
///
/// let mut registry = UnitRegistry::new();
/// registry.register(Unit::new(101, ServiceCategory::Medical, "AMB-01")).unwrap();
/// registry.register(Unit::new(102, ServiceCategory::Medical, "AMB-02")).unwrap();
///
/// registry.set_available(101, false);
/// let unit = registry.find_available(ServiceCategory::Medical).unwrap();
/// assert_eq!(unit.label(), "AMB-02");
/// ```
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    units: Vec<Unit>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self { units: Vec::new() }
    }

    /// Register a unit; fails if its id is already taken
    pub fn register(&mut self, unit: Unit) -> Result<(), RegistryError> {
        if self.get(unit.id).is_some() {
            return Err(RegistryError::DuplicateUnit(unit.id));
        }
        self.units.push(unit);
        Ok(())
    }

    /// First unit (registration order) of `category` that is available
    pub fn find_available(&self, category: ServiceCategory) -> Option<&Unit> {
        self.units
            .iter()
            .find(|unit| unit.category == category && unit.available)
    }

    /// Flip a unit's availability
    ///
    /// Unknown ids are ignored. Returns whether the flag actually changed.
    pub fn set_available(&mut self, unit_id: u32, available: bool) -> bool {
        match self.units.iter_mut().find(|unit| unit.id == unit_id) {
            Some(unit) if unit.available != available => {
                unit.available = available;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, unit_id: u32) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.id == unit_id)
    }

    /// Ids of every unit currently marked busy
    pub fn busy_units(&self) -> Vec<u32> {
        self.units
            .iter()
            .filter(|unit| !unit.available)
            .map(Unit::id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
