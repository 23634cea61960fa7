//! Engine configuration
//!
//! Everything needed to set up a city before the first incident arrives:
//! neighborhoods, service units and the unit release cadence.

use crate::dispatch::DispatchError;
use crate::models::incident::ServiceCategory;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Release period used when none is configured
pub const DEFAULT_RELEASE_PERIOD: u32 = 3;

/// Neighborhood credited on the service map when a unit returns
pub const DEFAULT_HOME_NEIGHBORHOOD: i32 = 1;

fn default_release_period() -> u32 {
    DEFAULT_RELEASE_PERIOD
}

fn default_home_neighborhood() -> i32 {
    DEFAULT_HOME_NEIGHBORHOOD
}

/// Complete engine configuration
///
/// # Example
///
/// ```
/// use emergency_dispatch_core_rs::DispatchConfig;
///
/// let config: DispatchConfig = serde_json::from_str(r#"{
///     "neighborhoods": [{ "id": 1, "name": "Centro" }],
///     "units": [{ "id": 101, "category": "medical", "label": "AMB-01" }]
/// }"#).unwrap();
///
/// assert_eq!(config.release_period, 3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Neighborhoods incidents may be reported in
    #[serde(default)]
    pub neighborhoods: Vec<NeighborhoodConfig>,

    /// Service units, in registration order
    #[serde(default)]
    pub units: Vec<UnitConfig>,

    /// Ticks between unit release sweeps (0 = units are never released)
    #[serde(default = "default_release_period")]
    pub release_period: u32,

    /// Neighborhood credited on the service map when a unit is released
    #[serde(default = "default_home_neighborhood")]
    pub home_neighborhood: i32,
}

/// One neighborhood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodConfig {
    pub id: i32,
    pub name: String,

    /// Categories to seed on the service map, one unit each
    #[serde(default)]
    pub services: Vec<ServiceCategory>,
}

/// One service unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConfig {
    pub id: u32,
    pub category: ServiceCategory,
    pub label: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            neighborhoods: Vec::new(),
            units: Vec::new(),
            release_period: DEFAULT_RELEASE_PERIOD,
            home_neighborhood: DEFAULT_HOME_NEIGHBORHOOD,
        }
    }
}

impl DispatchConfig {
    /// The built-in demo city: five neighborhoods, two units per category
    pub fn city_default() -> Self {
        let neighborhoods = [
            (1, "Centro"),
            (2, "Jardim Bongiovani"),
            (3, "Jardim das Rosas"),
            (4, "Ana Jacinta"),
            (5, "Alto da Boa Vista"),
        ]
        .into_iter()
        .map(|(id, name)| NeighborhoodConfig {
            id,
            name: name.to_string(),
            services: ServiceCategory::ALL.to_vec(),
        })
        .collect();

        let units = [
            (101, ServiceCategory::Medical, "AMB-01"),
            (102, ServiceCategory::Medical, "AMB-02"),
            (201, ServiceCategory::Fire, "BOMB-01"),
            (202, ServiceCategory::Fire, "BOMB-02"),
            (301, ServiceCategory::Police, "POL-01"),
            (302, ServiceCategory::Police, "POL-02"),
        ]
        .into_iter()
        .map(|(id, category, label)| UnitConfig {
            id,
            category,
            label: label.to_string(),
        })
        .collect();

        Self {
            neighborhoods,
            units,
            ..Self::default()
        }
    }

    /// Reject duplicate neighborhood or unit ids
    pub fn validate(&self) -> Result<(), DispatchError> {
        let mut neighborhood_ids = HashSet::new();
        for neighborhood in &self.neighborhoods {
            if !neighborhood_ids.insert(neighborhood.id) {
                return Err(DispatchError::InvalidConfig(format!(
                    "duplicate neighborhood id {}",
                    neighborhood.id
                )));
            }
        }

        let mut unit_ids = HashSet::new();
        for unit in &self.units {
            if !unit_ids.insert(unit.id) {
                return Err(DispatchError::InvalidConfig(format!(
                    "duplicate unit id {}",
                    unit.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_default_is_valid() {
        let config = DispatchConfig::city_default();
        assert!(config.validate().is_ok());
        assert_eq!(config.neighborhoods.len(), 5);
        assert_eq!(config.units.len(), 6);
        assert_eq!(config.release_period, DEFAULT_RELEASE_PERIOD);
    }

    #[test]
    fn test_duplicate_unit_rejected() {
        let mut config = DispatchConfig::city_default();
        config.units.push(UnitConfig {
            id: 101,
            category: ServiceCategory::Police,
            label: "POL-99".to_string(),
        });

        assert_eq!(
            config.validate(),
            Err(DispatchError::InvalidConfig("duplicate unit id 101".to_string()))
        );
    }

    #[test]
    fn test_duplicate_neighborhood_rejected() {
        let mut config = DispatchConfig::default();
        for _ in 0..2 {
            config.neighborhoods.push(NeighborhoodConfig {
                id: 7,
                name: "Vila Nova".to_string(),
                services: Vec::new(),
            });
        }
        assert!(matches!(
            config.validate(),
            Err(DispatchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_json_round_trip_keeps_defaults() {
        let config: DispatchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DispatchConfig::default());
    }
}
