//! Completed dispatch history
//!
//! One LIFO stack per service category. Each dispatch pushes a record; the
//! most recent dispatch is always on top.

use crate::models::incident::{Incident, IncidentId, ServiceCategory, Severity};
use serde::{Deserialize, Serialize};

/// Longest note kept on a record, in characters
pub const MAX_NOTES_LEN: usize = 200;

/// Ticks a unit of `category` spends on one incident
pub fn service_duration(category: ServiceCategory) -> i32 {
    match category {
        ServiceCategory::Medical => 2,
        ServiceCategory::Fire => 3,
        ServiceCategory::Police => 1,
    }
}

/// Default note recorded for a dispatch of `category`
pub fn default_notes(category: ServiceCategory) -> &'static str {
    match category {
        ServiceCategory::Medical => "Medical response",
        ServiceCategory::Fire => "Fire suppression",
        ServiceCategory::Police => "Police response",
    }
}

/// One completed dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub incident_id: IncidentId,
    pub neighborhood_id: i32,
    pub category: ServiceCategory,
    pub severity: Severity,
    pub start_tick: i32,
    pub end_tick: i32,
    pub notes: String,
}

impl DispatchRecord {
    /// Build the record for `incident` dispatched at `start_tick`
    pub fn for_incident(incident: &Incident, start_tick: i32) -> Self {
        let category = incident.category();
        Self {
            incident_id: incident.id(),
            neighborhood_id: incident.neighborhood_id(),
            category,
            severity: incident.severity(),
            start_tick,
            end_tick: start_tick.saturating_add(service_duration(category)),
            notes: default_notes(category).to_string(),
        }
    }

    /// Replace the notes, truncated to [`MAX_NOTES_LEN`] characters
    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = notes.chars().take(MAX_NOTES_LEN).collect();
        self
    }
}

/// Per-category history stacks
#[derive(Debug, Clone, Default)]
pub struct DispatchHistory {
    stacks: [Vec<DispatchRecord>; 3],
}

impl DispatchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a record onto its category's stack
    pub fn push(&mut self, record: DispatchRecord) {
        self.stacks[record.category.index()].push(record);
    }

    /// Pop the most recent record of `category`
    pub fn pop(&mut self, category: ServiceCategory) -> Option<DispatchRecord> {
        self.stacks[category.index()].pop()
    }

    /// Records of `category`, most recent first
    pub fn peek_all(&self, category: ServiceCategory) -> impl Iterator<Item = &DispatchRecord> + '_ {
        self.stacks[category.index()].iter().rev()
    }

    pub fn len(&self, category: ServiceCategory) -> usize {
        self.stacks[category.index()].len()
    }

    /// Records across all categories
    pub fn total(&self) -> usize {
        self.stacks.iter().map(Vec::len).sum()
    }
}
