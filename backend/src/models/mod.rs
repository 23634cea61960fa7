//! Domain models for the dispatch simulator

pub mod dispatch_queue;
pub mod event;
pub mod history;
pub mod incident;
pub mod neighborhood;
pub mod registry;
pub mod service_map;

// Re-exports
pub use dispatch_queue::{DispatchQueue, QueueError};
pub use event::{Event, EventLog};
pub use history::{DispatchHistory, DispatchRecord};
pub use incident::{Incident, IncidentError, IncidentId, ServiceCategory, Severity};
pub use neighborhood::NeighborhoodDirectory;
pub use registry::{RegistryError, Unit, UnitRegistry};
pub use service_map::ServiceMap;
