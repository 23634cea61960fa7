//! Identifier index
//!
//! Binary search tree keyed by incident id.
//!
//! # Unbounded height
//!
//! The tree is never rebalanced. Ids are assigned in strictly increasing
//! order, so under normal engine use every insert goes to the right and the
//! tree degenerates into a list with O(n) height and O(n) lookups. All walks
//! here are iterative so that shape cannot exhaust the call stack.

use crate::index::traversal::{Traversal, TraversalOrder, TreeNode};
use crate::index::IndexError;
use crate::models::incident::{Incident, IncidentId};
use std::cmp::Ordering;
use std::fmt;

type Link = Option<Box<IdNode>>;

/// Tree node owning a copy of one incident
pub struct IdNode {
    incident: Incident,
    left: Link,
    right: Link,
}

impl IdNode {
    fn leaf(incident: Incident) -> Self {
        Self {
            incident,
            left: None,
            right: None,
        }
    }
}

impl TreeNode for IdNode {
    fn incident(&self) -> &Incident {
        &self.incident
    }

    fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }
}

/// Every incident ever received, ordered by id
///
/// # Example
/// ```
/// use emergency_dispatch_core_rs::{Incident, IdentifierIndex, ServiceCategory, Severity, TraversalOrder};
///
/// let mut index = IdentifierIndex::new();
/// for id in [5, 3, 8] {
///     index.insert(Incident::new(id, 1, ServiceCategory::Fire, Severity::Low, 0)).unwrap();
/// }
///
/// let ids: Vec<u32> = index.traverse(TraversalOrder::InOrder).map(|i| i.id()).collect();
/// assert_eq!(ids, vec![3, 5, 8]);
/// assert!(index.find(8).is_ok());
/// ```
#[derive(Default)]
pub struct IdentifierIndex {
    root: Link,
    len: usize,
}

impl IdentifierIndex {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Insert a copy of `incident` keyed by its id
    ///
    /// An id that is already present leaves the tree unchanged.
    pub fn insert(&mut self, incident: Incident) -> Result<(), IndexError> {
        let id = incident.id();
        let mut link = &mut self.root;
        while let Some(node) = link {
            link = match id.cmp(&node.incident.id()) {
                Ordering::Less => &mut node.left,
                Ordering::Greater => &mut node.right,
                Ordering::Equal => return Err(IndexError::Duplicate(id)),
            };
        }
        *link = Some(Box::new(IdNode::leaf(incident)));
        self.len += 1;
        Ok(())
    }

    /// Stored copy of incident `id`
    pub fn find(&self, id: IncidentId) -> Result<&Incident, IndexError> {
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match id.cmp(&node.incident.id()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Ok(&node.incident),
            };
        }
        Err(IndexError::NotFound(id))
    }

    pub fn contains(&self, id: IncidentId) -> bool {
        self.find(id).is_ok()
    }

    /// Delete incident `id` and return the stored copy
    ///
    /// Leaves and single-child nodes are spliced out. A node with two
    /// children takes its in-order successor's incident, and the successor
    /// node is then spliced out of the right subtree.
    pub fn remove(&mut self, id: IncidentId) -> Result<Incident, IndexError> {
        let mut link = &mut self.root;
        loop {
            let go_left = match link.as_deref() {
                None => return Err(IndexError::NotFound(id)),
                Some(node) => match id.cmp(&node.incident.id()) {
                    Ordering::Equal => break,
                    Ordering::Less => true,
                    Ordering::Greater => false,
                },
            };
            let Some(node) = link else {
                return Err(IndexError::NotFound(id));
            };
            link = if go_left { &mut node.left } else { &mut node.right };
        }

        let Some(mut node) = link.take() else {
            return Err(IndexError::NotFound(id));
        };
        let removed = node.incident;
        *link = match (node.left.take(), node.right.take()) {
            (None, None) => None,
            (Some(child), None) | (None, Some(child)) => Some(child),
            (Some(left), Some(right)) => {
                node.left = Some(left);
                node.right = Some(right);
                if let Some(successor) = take_leftmost(&mut node.right) {
                    node.incident = successor;
                }
                Some(node)
            }
        };
        self.len -= 1;
        Ok(removed)
    }

    /// Walk the tree in `order`
    pub fn traverse(&self, order: TraversalOrder) -> Traversal<'_, IdNode> {
        Traversal::new(self.root.as_deref(), order)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of levels (0 for an empty tree)
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut level: Vec<&IdNode> = self.root.as_deref().into_iter().collect();
        while !level.is_empty() {
            height += 1;
            level = level
                .iter()
                .flat_map(|node| [node.left.as_deref(), node.right.as_deref()])
                .flatten()
                .collect();
        }
        height
    }
}

/// Detach the leftmost node under `link` and return its incident
fn take_leftmost(mut link: &mut Link) -> Option<Incident> {
    while link.as_ref().is_some_and(|node| node.left.is_some()) {
        let Some(node) = link else {
            return None;
        };
        link = &mut node.left;
    }
    let mut node = link.take()?;
    *link = node.right.take();
    Some(node.incident)
}

impl Drop for IdentifierIndex {
    // Box drop glue recurses once per level; unwind by hand instead.
    fn drop(&mut self) {
        let mut pending: Vec<Box<IdNode>> = self.root.take().into_iter().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
    }
}

impl fmt::Debug for IdentifierIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifierIndex")
            .field("len", &self.len)
            .field("height", &self.height())
            .finish()
    }
}
