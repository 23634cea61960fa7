//! Incident model
//!
//! An incident is a reported emergency with:
//! - A unique, sequentially assigned identifier
//! - The neighborhood where it happened
//! - The service category that must respond (Medical, Fire, Police)
//! - A severity from 1 (low) to 3 (high)
//! - The tick at which it arrived
//!
//! Incidents are plain values. The dispatch queue and both tree indices each
//! hold their own copy; none of them observes mutations made through another.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier assigned to incidents by the dispatch engine
pub type IncidentId = u32;

/// Errors raised while building incident fields from raw input
#[derive(Debug, Error, PartialEq)]
pub enum IncidentError {
    #[error("Severity must be 1, 2 or 3, got {0}")]
    InvalidSeverity(u8),

    #[error("Unknown service category: {0}")]
    InvalidCategory(String),
}

/// Service category of an incident or unit
///
/// Categories partition the dispatch queues, the unit pool and the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Medical,
    Fire,
    Police,
}

impl ServiceCategory {
    /// All categories in the order the engine checks them each tick
    pub const ALL: [ServiceCategory; 3] = [
        ServiceCategory::Medical,
        ServiceCategory::Fire,
        ServiceCategory::Police,
    ];

    /// Position of this category in [`ServiceCategory::ALL`]
    pub fn index(self) -> usize {
        match self {
            ServiceCategory::Medical => 0,
            ServiceCategory::Fire => 1,
            ServiceCategory::Police => 2,
        }
    }

    /// Upper-case label used in reports
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceCategory::Medical => "MEDICAL",
            ServiceCategory::Fire => "FIRE",
            ServiceCategory::Police => "POLICE",
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ServiceCategory {
    type Err = IncidentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "medical" | "ambulance" => Ok(ServiceCategory::Medical),
            "fire" => Ok(ServiceCategory::Fire),
            "police" => Ok(ServiceCategory::Police),
            other => Err(IncidentError::InvalidCategory(other.to_string())),
        }
    }
}

/// Severity of an incident, 1 (low) to 3 (high)
///
/// Serialized as its numeric rank.
///
/// # Example
/// ```
/// use emergency_dispatch_core_rs::Severity;
///
/// assert_eq!(Severity::try_from(3), Ok(Severity::High));
/// assert!(Severity::try_from(4).is_err());
/// assert!(Severity::High > Severity::Low);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Severity {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Severity {
    /// Numeric rank (1..=3)
    pub fn rank(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Severity {
    type Error = IncidentError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Severity::Low),
            2 => Ok(Severity::Medium),
            3 => Ok(Severity::High),
            other => Err(IncidentError::InvalidSeverity(other)),
        }
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.rank()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rank())
    }
}

/// A reported emergency
///
/// # Example
/// ```
/// use emergency_dispatch_core_rs::{Incident, ServiceCategory, Severity};
///
/// let incident = Incident::new(1, 4, ServiceCategory::Fire, Severity::High, 0);
/// assert_eq!(incident.id(), 1);
/// assert_eq!(incident.category(), ServiceCategory::Fire);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Incident {
    id: IncidentId,
    neighborhood_id: i32,
    category: ServiceCategory,
    severity: Severity,
    arrival_tick: i32,
}

impl Incident {
    /// Create a new incident value
    pub fn new(
        id: IncidentId,
        neighborhood_id: i32,
        category: ServiceCategory,
        severity: Severity,
        arrival_tick: i32,
    ) -> Self {
        Self {
            id,
            neighborhood_id,
            category,
            severity,
            arrival_tick,
        }
    }

    pub fn id(&self) -> IncidentId {
        self.id
    }

    pub fn neighborhood_id(&self) -> i32 {
        self.neighborhood_id
    }

    pub fn category(&self) -> ServiceCategory {
        self.category
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn arrival_tick(&self) -> i32 {
        self.arrival_tick
    }
}

impl fmt::Display for Incident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} neighborhood {} severity {} (arrived t={})",
            self.id, self.category, self.neighborhood_id, self.severity, self.arrival_tick
        )
    }
}
