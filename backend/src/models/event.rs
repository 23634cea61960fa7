//! Event logging for dispatch runs
//!
//! Every state change the engine makes is recorded as an [`Event`] stamped
//! with the tick it happened on. The log lets callers audit a run after the
//! fact without reading the tracing output.
//!
//! # Example
//!
//! ```rust
//! use emergency_dispatch_core_rs::models::event::{Event, EventLog};
//! use emergency_dispatch_core_rs::ServiceCategory;
//!
//! let mut log = EventLog::new();
//! log.log(Event::UnitReleased {
//!     tick: 3,
//!     unit_id: 101,
//!     category: ServiceCategory::Medical,
//! });
//!
//! assert_eq!(log.events_at_tick(3).len(), 1);
//! ```

use crate::models::incident::{IncidentId, ServiceCategory, Severity};
use serde::{Deserialize, Serialize};

/// Dispatch state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Incident accepted and queued
    IncidentReceived {
        tick: i32,
        incident_id: IncidentId,
        neighborhood_id: i32,
        category: ServiceCategory,
        severity: Severity,
    },

    /// Queued incident matched to a unit
    IncidentDispatched {
        tick: i32,
        incident_id: IncidentId,
        unit_id: u32,
        category: ServiceCategory,
    },

    /// Busy unit returned to service by the release sweep
    UnitReleased {
        tick: i32,
        unit_id: u32,
        category: ServiceCategory,
    },

    /// Incident deleted from the indices by an explicit removal
    IncidentRemoved { tick: i32, incident_id: IncidentId },
}

impl Event {
    /// Tick at which the event happened
    pub fn tick(&self) -> i32 {
        match self {
            Event::IncidentReceived { tick, .. }
            | Event::IncidentDispatched { tick, .. }
            | Event::UnitReleased { tick, .. }
            | Event::IncidentRemoved { tick, .. } => *tick,
        }
    }

    /// Short name of the event kind
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::IncidentReceived { .. } => "IncidentReceived",
            Event::IncidentDispatched { .. } => "IncidentDispatched",
            Event::UnitReleased { .. } => "UnitReleased",
            Event::IncidentRemoved { .. } => "IncidentRemoved",
        }
    }

    /// Incident the event refers to, if any
    pub fn incident_id(&self) -> Option<IncidentId> {
        match self {
            Event::IncidentReceived { incident_id, .. }
            | Event::IncidentDispatched { incident_id, .. }
            | Event::IncidentRemoved { incident_id, .. } => Some(*incident_id),
            Event::UnitReleased { .. } => None,
        }
    }
}

/// Append-only list of events in the order they happened
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_at_tick(&self, tick: i32) -> Vec<&Event> {
        self.events.iter().filter(|e| e.tick() == tick).collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Full lifecycle of one incident
    pub fn events_for_incident(&self, incident_id: IncidentId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.incident_id() == Some(incident_id))
            .collect()
    }
}
