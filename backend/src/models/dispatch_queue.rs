//! Per-category dispatch queue
//!
//! Incidents wait here, strictly first-in first-out, until a unit of the
//! matching category becomes free. Severity plays no part in queue order;
//! the priority index is where severity ordering lives.

use crate::models::incident::{Incident, ServiceCategory};
use std::collections::VecDeque;
use thiserror::Error;

/// Errors raised by queue operations
#[derive(Debug, Error, PartialEq)]
pub enum QueueError {
    #[error("{0} queue is empty")]
    Empty(ServiceCategory),
}

/// FIFO queue of incidents awaiting a unit of one category
///
/// # Example
/// ```
/// use emergency_dispatch_core_rs::{DispatchQueue, Incident, ServiceCategory, Severity};
///
/// let mut queue = DispatchQueue::new(ServiceCategory::Police);
/// queue.push(Incident::new(1, 1, ServiceCategory::Police, Severity::Low, 0));
/// queue.push(Incident::new(2, 1, ServiceCategory::Police, Severity::High, 0));
///
/// // Arrival order wins over severity
/// assert_eq!(queue.pop().unwrap().id(), 1);
/// assert_eq!(queue.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DispatchQueue {
    category: ServiceCategory,
    incidents: VecDeque<Incident>,
}

impl DispatchQueue {
    /// Create an empty queue for `category`
    pub fn new(category: ServiceCategory) -> Self {
        Self {
            category,
            incidents: VecDeque::new(),
        }
    }

    /// Category served by this queue
    pub fn category(&self) -> ServiceCategory {
        self.category
    }

    /// Append an incident at the tail
    pub fn push(&mut self, incident: Incident) {
        self.incidents.push_back(incident);
    }

    /// Remove and return the head
    pub fn pop(&mut self) -> Result<Incident, QueueError> {
        self.incidents
            .pop_front()
            .ok_or(QueueError::Empty(self.category))
    }

    /// Head of the queue without removing it
    pub fn front(&self) -> Option<&Incident> {
        self.incidents.front()
    }

    /// Current contents, head first
    ///
    /// The iterator borrows the queue; calling this again restarts from the head.
    pub fn peek_all(&self) -> impl Iterator<Item = &Incident> + '_ {
        self.incidents.iter()
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }
}
