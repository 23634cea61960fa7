//! Dispatch Engine
//!
//! Owns every structure of a run and drives the two transitions:
//!
//! ```text
//! Arrival (neighborhood, category, severity):
//!   1. Check the neighborhood exists
//!   2. Assign the next sequential id, stamp the current tick
//!   3. Insert into the identifier index and the priority index
//!   4. Push onto the category's dispatch queue
//!
//! Tick:
//!   1. Advance the clock
//!   2. Release sweep (policy decides which busy units return)
//!   3. For each category independently: if its queue is non-empty and a
//!      unit is free, pop the head, mark the unit busy, record history
//! ```
//!
//! Dispatch never touches the indices: they are a permanent log of every
//! incident received. Only [`DispatchEngine::remove_by_id`] deletes from them.
//!
//! # Example
//!
//! ```rust
//! use emergency_dispatch_core_rs::{DispatchConfig, DispatchEngine, ServiceCategory, Severity};
//!
//! let mut engine = DispatchEngine::new(DispatchConfig::city_default()).unwrap();
//!
//! let id = engine.receive_incident(1, ServiceCategory::Medical, Severity::High).unwrap();
//! let results = engine.advance_time(1);
//!
//! assert_eq!(results[0].dispatched[0].incident_id, id);
//! assert!(engine.queue(ServiceCategory::Medical).is_empty());
//! ```

use crate::core::time::SimClock;
use crate::dispatch::config::DispatchConfig;
use crate::dispatch::snapshot::{
    compute_config_hash, IndexSnapshot, QueueSnapshot, ServiceMapEntry, SystemSnapshot,
};
use crate::dispatch::DispatchError;
use crate::index::identifier::IdNode;
use crate::index::priority::PriorityNode;
use crate::index::{IdentifierIndex, IndexError, PriorityIndex, Traversal, TraversalOrder};
use crate::models::dispatch_queue::DispatchQueue;
use crate::models::event::{Event, EventLog};
use crate::models::history::{DispatchHistory, DispatchRecord};
use crate::models::incident::{Incident, IncidentId, ServiceCategory, Severity};
use crate::models::neighborhood::NeighborhoodDirectory;
use crate::models::registry::{Unit, UnitRegistry};
use crate::models::service_map::ServiceMap;
use crate::policy::{policy_for_period, ReleasePolicy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One incident matched to one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
    pub tick: i32,
    pub incident_id: IncidentId,
    pub category: ServiceCategory,
    pub unit_id: u32,
    pub unit_label: String,
}

/// Result of a single tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickResult {
    /// Tick number after advancing
    pub tick: i32,

    /// Units returned to service by the release sweep
    pub released: Vec<u32>,

    /// At most one dispatch per category
    pub dispatched: Vec<Dispatch>,
}

/// Number of incidents held by each index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSizes {
    pub identifier: usize,
    pub priority: usize,
}

/// Main engine managing the dispatch state and the tick loop
///
/// Single-threaded by construction: every mutating call takes `&mut self`
/// and completes before the next one starts. Callers that want concurrent
/// arrivals must serialize access (e.g. a `Mutex<DispatchEngine>`), since an
/// arrival and a tick would otherwise race on the same queue and on the id
/// counter.
pub struct DispatchEngine {
    clock: SimClock,
    next_incident_id: IncidentId,
    neighborhoods: NeighborhoodDirectory,
    units: UnitRegistry,
    /// Indexed by `ServiceCategory::index`
    queues: [DispatchQueue; 3],
    identifier_index: IdentifierIndex,
    priority_index: PriorityIndex,
    history: DispatchHistory,
    service_map: ServiceMap,
    release_policy: Box<dyn ReleasePolicy>,
    home_neighborhood: i32,
    event_log: EventLog,
    config_hash: String,
}

impl DispatchEngine {
    /// Create a new engine from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(DispatchEngine)` - engine at tick 0 with everything registered
    /// * `Err(DispatchError::InvalidConfig)` - duplicate ids in the config
    pub fn new(config: DispatchConfig) -> Result<Self, DispatchError> {
        config.validate()?;
        let config_hash = compute_config_hash(&config)?;

        let mut engine = Self {
            clock: SimClock::new(),
            next_incident_id: 1,
            neighborhoods: NeighborhoodDirectory::new(),
            units: UnitRegistry::new(),
            queues: ServiceCategory::ALL.map(DispatchQueue::new),
            identifier_index: IdentifierIndex::new(),
            priority_index: PriorityIndex::new(),
            history: DispatchHistory::new(),
            service_map: ServiceMap::new(),
            release_policy: policy_for_period(config.release_period),
            home_neighborhood: config.home_neighborhood,
            event_log: EventLog::new(),
            config_hash,
        };

        for neighborhood in config.neighborhoods {
            engine.register_neighborhood(neighborhood.id, neighborhood.name)?;
            for category in neighborhood.services {
                engine.service_map.add_service(neighborhood.id, category);
            }
        }
        for unit in config.units {
            engine.register_unit(Unit::new(unit.id, unit.category, unit.label))?;
        }

        info!(
            neighborhoods = engine.neighborhoods.len(),
            units = engine.units.len(),
            release_policy = engine.release_policy.name(),
            "Dispatch engine initialized"
        );
        Ok(engine)
    }

    /// Replace the release policy chosen from the config
    pub fn with_release_policy(mut self, policy: Box<dyn ReleasePolicy>) -> Self {
        self.release_policy = policy;
        self
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a neighborhood and put it on the service map
    pub fn register_neighborhood(
        &mut self,
        id: i32,
        name: impl Into<String>,
    ) -> Result<(), DispatchError> {
        self.neighborhoods.register(id, name)?;
        self.service_map.add_neighborhood(id);
        Ok(())
    }

    pub fn register_unit(&mut self, unit: Unit) -> Result<(), DispatchError> {
        debug!(unit_id = unit.id(), category = %unit.category(), "Registering unit");
        self.units.register(unit)?;
        Ok(())
    }

    /// Flip a unit's availability by hand; unknown ids are ignored
    pub fn set_unit_available(&mut self, unit_id: u32, available: bool) -> bool {
        self.units.set_available(unit_id, available)
    }

    // ========================================================================
    // Arrival
    // ========================================================================

    /// Accept a new incident
    ///
    /// On success the incident is in both indices and at the tail of its
    /// category's queue. On failure nothing changed, not even the id counter.
    pub fn receive_incident(
        &mut self,
        neighborhood_id: i32,
        category: ServiceCategory,
        severity: Severity,
    ) -> Result<IncidentId, DispatchError> {
        if !self.neighborhoods.contains(neighborhood_id) {
            warn!(neighborhood_id, %category, "Rejected incident for unknown neighborhood");
            return Err(DispatchError::UnknownNeighborhood(neighborhood_id));
        }

        let id = self.next_incident_id;
        let tick = self.clock.current_tick();
        let incident = Incident::new(id, neighborhood_id, category, severity, tick);

        self.identifier_index.insert(incident)?;
        if let Err(err) = self.priority_index.insert(incident) {
            // keep the two indices in agreement
            self.identifier_index.remove(id)?;
            return Err(err.into());
        }
        self.queues[category.index()].push(incident);
        self.next_incident_id = self.next_incident_id.saturating_add(1);

        self.event_log.log(Event::IncidentReceived {
            tick,
            incident_id: id,
            neighborhood_id,
            category,
            severity,
        });
        debug!(incident_id = id, neighborhood_id, %category, %severity, tick, "Incident received");
        Ok(id)
    }

    // ========================================================================
    // Tick Loop
    // ========================================================================

    /// Execute one simulation tick
    ///
    /// Advances the clock, runs the release sweep, then one matching round.
    pub fn tick(&mut self) -> TickResult {
        let tick = self.clock.advance_tick();
        let released = self.release_units();
        let dispatched = self.process_dispatches();

        info!(
            tick,
            released = released.len(),
            dispatched = dispatched.len(),
            queued = self.queues.iter().map(DispatchQueue::len).sum::<usize>(),
            "Tick complete"
        );
        TickResult {
            tick,
            released,
            dispatched,
        }
    }

    /// Run `ticks` sequential ticks
    pub fn advance_time(&mut self, ticks: u32) -> Vec<TickResult> {
        (0..ticks).map(|_| self.tick()).collect()
    }

    /// One matching round at the current tick, without advancing time
    ///
    /// Categories are checked independently; each dispatches at most one
    /// incident, always the head of its queue.
    pub fn process_dispatches(&mut self) -> Vec<Dispatch> {
        ServiceCategory::ALL
            .into_iter()
            .filter_map(|category| self.dispatch_category(category))
            .collect()
    }

    fn dispatch_category(&mut self, category: ServiceCategory) -> Option<Dispatch> {
        if self.queues[category.index()].is_empty() {
            return None;
        }
        let unit = self.units.find_available(category)?;
        let (unit_id, unit_label) = (unit.id(), unit.label().to_string());

        let incident = match self.queues[category.index()].pop() {
            Ok(incident) => incident,
            Err(err) => {
                debug!(%err, "Nothing to dispatch");
                return None;
            }
        };
        let tick = self.clock.current_tick();

        self.units.set_available(unit_id, false);
        self.history.push(DispatchRecord::for_incident(&incident, tick));
        self.service_map.adjust(incident.neighborhood_id(), category, -1);
        self.event_log.log(Event::IncidentDispatched {
            tick,
            incident_id: incident.id(),
            unit_id,
            category,
        });
        debug!(
            incident_id = incident.id(),
            unit = %unit_label,
            neighborhood_id = incident.neighborhood_id(),
            tick,
            "Unit dispatched"
        );

        Some(Dispatch {
            tick,
            incident_id: incident.id(),
            category,
            unit_id,
            unit_label,
        })
    }

    fn release_units(&mut self) -> Vec<u32> {
        let candidates = self.release_policy.units_to_release(&self.clock, &self.units);
        let tick = self.clock.current_tick();

        let mut released = Vec::new();
        for unit_id in candidates {
            if !self.units.set_available(unit_id, true) {
                continue;
            }
            let Some(category) = self.units.get(unit_id).map(Unit::category) else {
                continue;
            };
            self.service_map.add_service(self.home_neighborhood, category);
            self.event_log.log(Event::UnitReleased {
                tick,
                unit_id,
                category,
            });
            info!(unit_id, %category, tick, "Unit released");
            released.push(unit_id);
        }
        released
    }

    // ========================================================================
    // Index Queries
    // ========================================================================

    /// Stored copy of incident `id` from the identifier index
    pub fn find_by_id(&self, id: IncidentId) -> Result<Incident, DispatchError> {
        Ok(*self.identifier_index.find(id)?)
    }

    /// Every incident received, highest severity first, ties by id
    pub fn priority_order(&self) -> Traversal<'_, PriorityNode> {
        self.priority_index.traverse_by_priority()
    }

    /// Every incident received, walked over the identifier index
    pub fn identifier_traversal(&self, order: TraversalOrder) -> Traversal<'_, IdNode> {
        self.identifier_index.traverse(order)
    }

    /// See [`PriorityIndex::find_by_severity`]
    pub fn find_by_severity(&self, severity: Severity) -> Option<&Incident> {
        self.priority_index.find_by_severity(severity)
    }

    /// Delete incident `id` from both indices
    ///
    /// Queues and history are left alone: a removed incident that is still
    /// queued will still be dispatched.
    pub fn remove_by_id(&mut self, id: IncidentId) -> Result<Incident, DispatchError> {
        let severity = self.identifier_index.find(id)?.severity();
        // priority index first: a miss there leaves both indices untouched
        self.priority_index.remove(severity, id)?;
        let removed = self.identifier_index.remove(id)?;
        self.event_log.log(Event::IncidentRemoved {
            tick: self.clock.current_tick(),
            incident_id: id,
        });
        debug!(incident_id = id, "Incident removed from indices");
        Ok(removed)
    }

    pub fn identifier_index(&self) -> &IdentifierIndex {
        &self.identifier_index
    }

    pub fn priority_index(&self) -> &PriorityIndex {
        &self.priority_index
    }

    pub fn index_sizes(&self) -> IndexSizes {
        IndexSizes {
            identifier: self.identifier_index.len(),
            priority: self.priority_index.len(),
        }
    }

    // ========================================================================
    // State Access
    // ========================================================================

    pub fn current_tick(&self) -> i32 {
        self.clock.current_tick()
    }

    pub fn queue(&self, category: ServiceCategory) -> &DispatchQueue {
        &self.queues[category.index()]
    }

    pub fn queue_len(&self, category: ServiceCategory) -> usize {
        self.queues[category.index()].len()
    }

    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    pub fn neighborhoods(&self) -> &NeighborhoodDirectory {
        &self.neighborhoods
    }

    pub fn history(&self) -> &DispatchHistory {
        &self.history
    }

    pub fn service_map(&self) -> &ServiceMap {
        &self.service_map
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Read-only, serializable view of the whole engine
    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            current_tick: self.clock.current_tick(),
            next_incident_id: self.next_incident_id,
            release_policy: self.release_policy.name().to_string(),
            units: self.units.iter().cloned().collect(),
            queues: self
                .queues
                .iter()
                .map(|queue| QueueSnapshot {
                    category: queue.category(),
                    incidents: queue.peek_all().copied().collect(),
                })
                .collect(),
            history: ServiceCategory::ALL
                .into_iter()
                .flat_map(|category| self.history.peek_all(category).cloned())
                .collect(),
            service_map: self
                .service_map
                .iter()
                .map(|(neighborhood_id, services)| ServiceMapEntry {
                    neighborhood_id,
                    services: services.clone(),
                })
                .collect(),
            identifier_index: IndexSnapshot {
                len: self.identifier_index.len(),
                height: self.identifier_index.height(),
                in_order: self
                    .identifier_index
                    .traverse(TraversalOrder::InOrder)
                    .map(Incident::id)
                    .collect(),
            },
            priority_index: IndexSnapshot {
                len: self.priority_index.len(),
                height: self.priority_index.height(),
                in_order: self.priority_order().map(Incident::id).collect(),
            },
            events_logged: self.event_log.len(),
            config_hash: self.config_hash.clone(),
        }
    }
}

impl From<IndexError> for DispatchError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::NotFound(id) => DispatchError::NotFound(id),
            IndexError::Duplicate(id) => DispatchError::DuplicateIncident(id),
        }
    }
}
