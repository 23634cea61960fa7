//! Incident indices
//!
//! Two independent trees track every incident the engine has received:
//!
//! - [`IdentifierIndex`]: plain binary search tree keyed by incident id.
//!   Never rebalanced, so sequential ids degrade it to a linked list.
//! - [`PriorityIndex`]: AVL tree keyed by severity (descending) then id
//!   (ascending). Height stays logarithmic after every mutation.
//!
//! Each tree owns its own copy of every incident it stores.

pub mod identifier;
pub mod priority;
pub mod traversal;

pub use identifier::IdentifierIndex;
pub use priority::{PriorityIndex, PriorityKey};
pub use traversal::{Traversal, TraversalOrder};

use crate::models::incident::IncidentId;
use thiserror::Error;

/// Errors raised by index operations
///
/// Neither is fatal: the operation that raised it left the tree untouched.
#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    #[error("Incident {0} is already indexed")]
    Duplicate(IncidentId),

    #[error("Incident {0} not found")]
    NotFound(IncidentId),
}
