//! Dispatch engine
//!
//! Wires the clock, registries, queues and indices together:
//! - `config`: city setup (neighborhoods, units, release cadence)
//! - `engine`: arrivals, the tick loop and index queries
//! - `snapshot`: serializable state views and config hashing

pub mod config;
pub mod engine;
pub mod snapshot;

pub use config::{DispatchConfig, NeighborhoodConfig, UnitConfig};
pub use engine::{Dispatch, DispatchEngine, IndexSizes, TickResult};
pub use snapshot::{compute_config_hash, validate_snapshot, SystemSnapshot};

use crate::models::incident::IncidentId;
use crate::models::registry::RegistryError;
use thiserror::Error;

/// Errors surfaced by the engine
#[derive(Debug, Error, PartialEq)]
pub enum DispatchError {
    #[error("Unknown neighborhood: {0}")]
    UnknownNeighborhood(i32),

    #[error("Incident not found: {0}")]
    NotFound(IncidentId),

    #[error("Incident already indexed: {0}")]
    DuplicateIncident(IncidentId),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
