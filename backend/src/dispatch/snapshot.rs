//! Snapshot - Read-only view of engine state
//!
//! A [`SystemSnapshot`] is what the CLI prints with `--json` and what tests
//! compare between runs. It carries a hash of the config the engine was
//! built from so two snapshots can be checked for comparability.
//!
//! # Invariants checked by [`validate_snapshot`]
//!
//! - **Index agreement**: both indices hold the same incident count
//! - **Queue typing**: every queued incident sits in its own category's queue
//! - **Queue uniqueness**: no incident is queued twice

use crate::dispatch::DispatchError;
use crate::models::history::DispatchRecord;
use crate::models::incident::{Incident, IncidentId, ServiceCategory};
use crate::models::registry::Unit;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Complete engine state at one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub current_tick: i32,

    /// Id the next accepted incident will receive
    pub next_incident_id: IncidentId,

    /// Name of the active release policy
    pub release_policy: String,

    /// Units in registration order
    pub units: Vec<Unit>,

    /// One entry per category, head first
    pub queues: Vec<QueueSnapshot>,

    /// Dispatch records, grouped by category, most recent first
    pub history: Vec<DispatchRecord>,

    pub service_map: Vec<ServiceMapEntry>,

    pub identifier_index: IndexSnapshot,
    pub priority_index: IndexSnapshot,

    pub events_logged: usize,

    /// SHA256 of the canonical config JSON
    pub config_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub category: ServiceCategory,
    pub incidents: Vec<Incident>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceMapEntry {
    pub neighborhood_id: i32,
    pub services: BTreeMap<ServiceCategory, u32>,
}

/// Shape of one index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub len: usize,
    pub height: usize,

    /// Ids in the index's sorted order
    pub in_order: Vec<IncidentId>,
}

impl SystemSnapshot {
    /// Total incidents waiting across all queues
    pub fn queued(&self) -> usize {
        self.queues.iter().map(|q| q.incidents.len()).sum()
    }

    pub fn busy_units(&self) -> Vec<u32> {
        self.units
            .iter()
            .filter(|u| !u.is_available())
            .map(Unit::id)
            .collect()
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Deterministic SHA256 of any serializable config
///
/// Object keys are sorted recursively before hashing so map ordering
/// never changes the digest.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, DispatchError> {
    use serde_json::Value;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let value = serde_json::to_value(config)
        .map_err(|e| DispatchError::Serialization(format!("config to JSON: {}", e)))?;
    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| DispatchError::Serialization(format!("canonical config: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Validation
// ============================================================================

/// Check a snapshot's structural invariants
pub fn validate_snapshot(snapshot: &SystemSnapshot) -> Result<(), DispatchError> {
    if snapshot.identifier_index.len != snapshot.priority_index.len {
        return Err(DispatchError::InvalidSnapshot(format!(
            "index sizes disagree: identifier {} vs priority {}",
            snapshot.identifier_index.len, snapshot.priority_index.len
        )));
    }

    let mut seen = HashSet::new();
    for queue in &snapshot.queues {
        for incident in &queue.incidents {
            if incident.category() != queue.category {
                return Err(DispatchError::InvalidSnapshot(format!(
                    "incident {} ({}) queued under {}",
                    incident.id(),
                    incident.category(),
                    queue.category
                )));
            }
            if !seen.insert(incident.id()) {
                return Err(DispatchError::InvalidSnapshot(format!(
                    "incident {} queued more than once",
                    incident.id()
                )));
            }
        }
    }

    Ok(())
}
