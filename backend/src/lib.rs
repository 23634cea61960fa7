//! Emergency Dispatch Core - Rust Engine
//!
//! Discrete-time emergency dispatch simulator with deterministic execution.
//!
//! # Architecture
//!
//! - **core**: Simulation clock
//! - **models**: Domain types (Incident, DispatchQueue, Unit, history, events)
//! - **index**: Identifier BST and severity-ordered AVL index
//! - **policy**: Unit release policies
//! - **dispatch**: Engine, configuration and snapshots
//! - **scenario**: Scripted runs (config plus a list of steps)
//!
//! # Critical Invariants
//!
//! 1. Incident ids are assigned sequentially from 1 and never reused
//! 2. Each category's queue is strictly FIFO; severity never reorders it
//! 3. Both indices hold the same set of incidents at all times
//! 4. A tick dispatches at most one incident per category

// Module declarations
pub mod core;
pub mod dispatch;
pub mod index;
pub mod models;
pub mod policy;
pub mod scenario;

// Re-exports for convenience
pub use core::time::SimClock;
pub use dispatch::{
    Dispatch, DispatchConfig, DispatchEngine, DispatchError, IndexSizes, SystemSnapshot,
    TickResult,
};
pub use index::{IdentifierIndex, IndexError, PriorityIndex, PriorityKey, TraversalOrder};
pub use models::{
    dispatch_queue::{DispatchQueue, QueueError},
    incident::{Incident, IncidentError, IncidentId, ServiceCategory, Severity},
    registry::{RegistryError, Unit, UnitRegistry},
};
pub use scenario::{Scenario, ScenarioStep};
