//! Priority index
//!
//! AVL tree over every incident received, ordered by [`PriorityKey`]:
//! higher severity first, ties broken by lower id. An in-order walk is the
//! authoritative priority order.
//!
//! # Rebalancing
//!
//! Every node caches its height and its balance factor
//! (`height(left) - height(right)`). After any mutation completes, every
//! balance factor is in `{-1, 0, 1}`.
//!
//! - **Insert** picks one of the four classic cases by comparing the new key
//!   with the unbalanced node's child. The first rotation restores the
//!   subtree's previous height, so one insert triggers at most one single
//!   or double rotation.
//! - **Remove** picks the case from the heavy child's balance factor and may
//!   rotate at every ancestor on the way back up.

use crate::index::traversal::{Traversal, TraversalOrder, TreeNode};
use crate::index::IndexError;
use crate::models::incident::{Incident, IncidentId, Severity};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Composite ordering key: severity descending, then id ascending
///
/// # Example
/// ```
/// use emergency_dispatch_core_rs::{PriorityKey, Severity};
///
/// let urgent = PriorityKey::new(Severity::High, 9);
/// let minor = PriorityKey::new(Severity::Low, 1);
/// assert!(urgent < minor);
/// assert!(PriorityKey::new(Severity::Low, 1) < PriorityKey::new(Severity::Low, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriorityKey {
    pub severity: Severity,
    pub id: IncidentId,
}

impl PriorityKey {
    pub fn new(severity: Severity, id: IncidentId) -> Self {
        Self { severity, id }
    }

    pub fn of(incident: &Incident) -> Self {
        Self::new(incident.severity(), incident.id())
    }
}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .severity
            .cmp(&self.severity)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

type Link = Option<Box<PriorityNode>>;

/// AVL node owning a copy of one incident
pub struct PriorityNode {
    incident: Incident,
    height: i32,
    balance: i32,
    left: Link,
    right: Link,
}

impl PriorityNode {
    fn leaf(incident: Incident) -> Self {
        Self {
            incident,
            height: 1,
            balance: 0,
            left: None,
            right: None,
        }
    }

    fn key(&self) -> PriorityKey {
        PriorityKey::of(&self.incident)
    }

    /// Recompute cached height and balance factor from the children
    fn refresh(&mut self) {
        let left = height(&self.left);
        let right = height(&self.right);
        self.height = 1 + left.max(right);
        self.balance = left - right;
    }

    fn is_unbalanced(&self) -> bool {
        self.balance.abs() > 1
    }
}

impl TreeNode for PriorityNode {
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

fn height(link: &Link) -> i32 {
    link.as_ref().map_or(0, |node| node.height)
}

/// Rotate right around `node`; its left child becomes the subtree root
fn rotate_right(mut node: Box<PriorityNode>) -> Box<PriorityNode> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.refresh();
    pivot.right = Some(node);
    pivot.refresh();
    pivot
}

/// Rotate left around `node`; its right child becomes the subtree root
fn rotate_left(mut node: Box<PriorityNode>) -> Box<PriorityNode> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.refresh();
    pivot.left = Some(node);
    pivot.refresh();
    pivot
}

/// Restore balance at `node` after inserting `key` somewhere below it
fn fix_after_insert(mut node: Box<PriorityNode>, key: PriorityKey) -> Box<PriorityNode> {
    if node.balance > 1 {
        // Left-Right: new key landed in the left child's right subtree
        if node.left.as_ref().is_some_and(|left| key > left.key()) {
            node.left = node.left.take().map(rotate_left);
        }
        rotate_right(node)
    } else if node.balance < -1 {
        // Right-Left: new key landed in the right child's left subtree
        if node.right.as_ref().is_some_and(|right| key < right.key()) {
            node.right = node.right.take().map(rotate_right);
        }
        rotate_left(node)
    } else {
        node
    }
}

/// Restore balance at `node` after a removal below it
fn fix_after_remove(mut node: Box<PriorityNode>) -> Box<PriorityNode> {
    if node.balance > 1 {
        if node.left.as_ref().is_some_and(|left| left.balance < 0) {
            node.left = node.left.take().map(rotate_left);
        }
        rotate_right(node)
    } else if node.balance < -1 {
        if node.right.as_ref().is_some_and(|right| right.balance > 0) {
            node.right = node.right.take().map(rotate_right);
        }
        rotate_left(node)
    } else {
        node
    }
}

/// Every incident ever received, in priority order
///
/// # Example
/// ```
/// use emergency_dispatch_core_rs::{Incident, PriorityIndex, ServiceCategory, Severity};
///
/// let mut index = PriorityIndex::new();
/// index.insert(Incident::new(1, 1, ServiceCategory::Police, Severity::Low, 0)).unwrap();
/// index.insert(Incident::new(2, 1, ServiceCategory::Fire, Severity::High, 0)).unwrap();
/// index.insert(Incident::new(3, 1, ServiceCategory::Medical, Severity::High, 0)).unwrap();
///
/// let order: Vec<u32> = index.traverse_by_priority().map(|i| i.id()).collect();
/// assert_eq!(order, vec![2, 3, 1]);
/// ```
#[derive(Default)]
pub struct PriorityIndex {
    root: Link,
    len: usize,
    rebalances: usize,
}

impl PriorityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a copy of `incident` under its composite key
    ///
    /// A key that is already present leaves the tree unchanged.
    pub fn insert(&mut self, incident: Incident) -> Result<(), IndexError> {
        let id = incident.id();
        if !insert_into(&mut self.root, incident, &mut self.rebalances) {
            return Err(IndexError::Duplicate(id));
        }
        self.len += 1;
        Ok(())
    }

    /// Delete the incident stored under `(severity, id)` and return it
    pub fn remove(&mut self, severity: Severity, id: IncidentId) -> Result<Incident, IndexError> {
        let key = PriorityKey::new(severity, id);
        let removed = remove_from(&mut self.root, key, &mut self.rebalances)
            .ok_or(IndexError::NotFound(id))?;
        self.len -= 1;
        Ok(removed)
    }

    /// Incident stored under exactly `key`
    pub fn find(&self, key: PriorityKey) -> Option<&Incident> {
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match key.cmp(&node.key()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.incident),
            };
        }
        None
    }

    /// Descend comparing severity only and return the first match met
    ///
    /// Ids are ignored on the way down, so when several incidents share a
    /// severity this returns whichever of them sits highest in the tree, not
    /// necessarily the one with the lowest id. Use
    /// [`PriorityIndex::first_of_severity`] for that.
    pub fn find_by_severity(&self, severity: Severity) -> Option<&Incident> {
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match severity.cmp(&node.incident.severity()) {
                Ordering::Equal => return Some(&node.incident),
                // higher severities sort to the left
                Ordering::Greater => node.left.as_deref(),
                Ordering::Less => node.right.as_deref(),
            };
        }
        None
    }

    /// Lowest-id incident with `severity`
    pub fn first_of_severity(&self, severity: Severity) -> Option<&Incident> {
        let mut best = None;
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match severity.cmp(&node.incident.severity()) {
                Ordering::Equal => {
                    best = Some(&node.incident);
                    node.left.as_deref()
                }
                Ordering::Greater => node.left.as_deref(),
                Ordering::Less => node.right.as_deref(),
            };
        }
        best
    }

    /// Highest-priority incident
    pub fn first(&self) -> Option<&Incident> {
        self.traverse_by_priority().next()
    }

    /// Incidents from highest to lowest severity, ties by ascending id
    pub fn traverse_by_priority(&self) -> Traversal<'_, PriorityNode> {
        self.traverse(TraversalOrder::InOrder)
    }

    /// Walk the tree in `order`
    pub fn traverse(&self, order: TraversalOrder) -> Traversal<'_, PriorityNode> {
        Traversal::new(self.root.as_deref(), order)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree (0 when empty)
    pub fn height(&self) -> usize {
        usize::try_from(height(&self.root)).unwrap_or(0)
    }

    /// Rebalancing operations (single or double rotation) performed so far
    pub fn rebalance_count(&self) -> usize {
        self.rebalances
    }

    /// Verify key order, cached heights and balance factors of every node
    ///
    /// Returns a description of the first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        check_subtree(self.root.as_deref(), None, None).map(|_| ())
    }
}

fn insert_into(link: &mut Link, incident: Incident, rebalances: &mut usize) -> bool {
    let key = PriorityKey::of(&incident);
    if link.is_none() {
        *link = Some(Box::new(PriorityNode::leaf(incident)));
        return true;
    }
    let Some(node) = link.as_deref_mut() else {
        return false;
    };
    let inserted = match key.cmp(&node.key()) {
        Ordering::Less => insert_into(&mut node.left, incident, rebalances),
        Ordering::Greater => insert_into(&mut node.right, incident, rebalances),
        Ordering::Equal => false,
    };
    if !inserted {
        return false;
    }
    node.refresh();
    if node.is_unbalanced() {
        if let Some(unbalanced) = link.take() {
            *link = Some(fix_after_insert(unbalanced, key));
            *rebalances += 1;
        }
    }
    true
}

fn remove_from(link: &mut Link, key: PriorityKey, rebalances: &mut usize) -> Option<Incident> {
    let node = link.as_deref_mut()?;
    let removed = match key.cmp(&node.key()) {
        Ordering::Less => remove_from(&mut node.left, key, rebalances)?,
        Ordering::Greater => remove_from(&mut node.right, key, rebalances)?,
        Ordering::Equal if node.left.is_some() && node.right.is_some() => {
            let successor = *leftmost(node.right.as_deref()?);
            remove_from(&mut node.right, PriorityKey::of(&successor), rebalances)?;
            std::mem::replace(&mut node.incident, successor)
        }
        Ordering::Equal => {
            let mut detached = link.take()?;
            *link = detached.left.take().or_else(|| detached.right.take());
            return Some(detached.incident);
        }
    };
    node.refresh();
    if node.is_unbalanced() {
        if let Some(unbalanced) = link.take() {
            *link = Some(fix_after_remove(unbalanced));
            *rebalances += 1;
        }
    }
    Some(removed)
}

fn leftmost(mut node: &PriorityNode) -> &Incident {
    while let Some(left) = node.left.as_deref() {
        node = left;
    }
    &node.incident
}

fn check_subtree(
    node: Option<&PriorityNode>,
    lower: Option<PriorityKey>,
    upper: Option<PriorityKey>,
) -> Result<i32, String> {
    let Some(node) = node else {
        return Ok(0);
    };
    let key = node.key();
    if lower.is_some_and(|bound| key <= bound) || upper.is_some_and(|bound| key >= bound) {
        return Err(format!("incident {} is out of key order", key.id));
    }
    let left = check_subtree(node.left.as_deref(), lower, Some(key))?;
    let right = check_subtree(node.right.as_deref(), Some(key), upper)?;
    if node.height != 1 + left.max(right) {
        return Err(format!(
            "incident {} caches height {} but subtrees give {}",
            key.id,
            node.height,
            1 + left.max(right)
        ));
    }
    if node.balance != left - right {
        return Err(format!(
            "incident {} caches balance {} but subtrees give {}",
            key.id,
            node.balance,
            left - right
        ));
    }
    if node.is_unbalanced() {
        return Err(format!(
            "incident {} has balance factor {}",
            key.id, node.balance
        ));
    }
    Ok(node.height)
}

impl fmt::Debug for PriorityIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityIndex")
            .field("len", &self.len)
            .field("height", &self.height())
            .field("rebalances", &self.rebalances)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::incident::ServiceCategory;
    use proptest::prelude::*;

    fn incident(id: u32, severity: Severity) -> Incident {
        Incident::new(id, 1, ServiceCategory::Fire, severity, 0)
    }

    fn low(id: u32) -> Incident {
        incident(id, Severity::Low)
    }

    fn pre_order(index: &PriorityIndex) -> Vec<u32> {
        index
            .traverse(TraversalOrder::PreOrder)
            .map(Incident::id)
            .collect()
    }

    fn root_balance(index: &PriorityIndex) -> i32 {
        index.root.as_ref().map_or(0, |node| node.balance)
    }

    #[test]
    fn test_left_left_single_right_rotation() {
        // with equal severity, lower ids sort left
        let mut index = PriorityIndex::new();
        for id in [3, 2, 1] {
            index.insert(low(id)).unwrap();
        }
        assert_eq!(pre_order(&index), vec![2, 1, 3]);
        assert_eq!(index.rebalance_count(), 1);
        assert_eq!(index.height(), 2);
    }

    #[test]
    fn test_right_right_single_left_rotation() {
        let mut index = PriorityIndex::new();
        for id in [1, 2, 3] {
            index.insert(low(id)).unwrap();
        }
        assert_eq!(pre_order(&index), vec![2, 1, 3]);
        assert_eq!(index.rebalance_count(), 1);
    }

    #[test]
    fn test_left_right_double_rotation() {
        let mut index = PriorityIndex::new();
        for id in [3, 1, 2] {
            index.insert(low(id)).unwrap();
        }
        assert_eq!(pre_order(&index), vec![2, 1, 3]);
        assert_eq!(index.rebalance_count(), 1);
    }

    #[test]
    fn test_right_left_double_rotation() {
        let mut index = PriorityIndex::new();
        for id in [1, 3, 2] {
            index.insert(low(id)).unwrap();
        }
        assert_eq!(pre_order(&index), vec![2, 1, 3]);
        assert_eq!(index.rebalance_count(), 1);
    }

    #[test]
    fn test_severity_dominates_id() {
        let mut index = PriorityIndex::new();
        index.insert(incident(1, Severity::Low)).unwrap();
        index.insert(incident(2, Severity::High)).unwrap();
        index.insert(incident(3, Severity::Medium)).unwrap();
        index.insert(incident(4, Severity::High)).unwrap();

        let order: Vec<u32> = index.traverse_by_priority().map(Incident::id).collect();
        assert_eq!(order, vec![2, 4, 3, 1]);
        assert_eq!(index.first().map(Incident::id), Some(2));
    }

    #[test]
    fn test_duplicate_key_is_noop() {
        let mut index = PriorityIndex::new();
        index.insert(low(1)).unwrap();

        assert_eq!(index.insert(low(1)), Err(IndexError::Duplicate(1)));
        assert_eq!(index.len(), 1);
        // same id with another severity is a different composite key
        assert!(index.insert(incident(1, Severity::High)).is_ok());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_remove_missing_key() {
        let mut index = PriorityIndex::new();
        index.insert(low(1)).unwrap();

        assert_eq!(
            index.remove(Severity::High, 1),
            Err(IndexError::NotFound(1))
        );
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_remove_two_child_root_uses_successor() {
        let mut index = PriorityIndex::new();
        for id in [2, 1, 3] {
            index.insert(low(id)).unwrap();
        }

        assert_eq!(index.remove(Severity::Low, 2).map(|i| i.id()), Ok(2));
        assert_eq!(pre_order(&index), vec![3, 1]);
        assert!(index.check_invariants().is_ok());
    }

    #[test]
    fn test_remove_can_rebalance_more_than_once() {
        // Fibonacci-shaped tree: removing the shallowest leaf forces a
        // rotation at two different ancestors
        let mut index = PriorityIndex::new();
        for id in [8, 5, 11, 3, 7, 10, 12, 2, 4, 6, 9, 1] {
            index.insert(low(id)).unwrap();
        }
        assert!(index.check_invariants().is_ok());
        let before = index.rebalance_count();

        index.remove(Severity::Low, 12).unwrap();

        assert!(index.check_invariants().is_ok());
        assert_eq!(index.rebalance_count() - before, 2);
        let order: Vec<u32> = index.traverse_by_priority().map(Incident::id).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_find_by_severity_returns_shallowest_match() {
        let mut index = PriorityIndex::new();
        for id in 1..=7 {
            index.insert(low(id)).unwrap();
        }
        // perfectly balanced: 4 is the root
        assert_eq!(index.find_by_severity(Severity::Low).map(Incident::id), Some(4));
        assert_eq!(
            index.first_of_severity(Severity::Low).map(Incident::id),
            Some(1)
        );
        assert!(index.find_by_severity(Severity::High).is_none());
        assert!(index.first_of_severity(Severity::High).is_none());
    }

    #[test]
    fn test_first_of_severity_across_bands() {
        let mut index = PriorityIndex::new();
        for (id, severity) in [
            (1, Severity::Low),
            (2, Severity::High),
            (3, Severity::Medium),
            (4, Severity::Medium),
            (5, Severity::High),
            (6, Severity::Low),
        ] {
            index.insert(incident(id, severity)).unwrap();
        }
        assert_eq!(index.first_of_severity(Severity::High).map(Incident::id), Some(2));
        assert_eq!(index.first_of_severity(Severity::Medium).map(Incident::id), Some(3));
        assert_eq!(index.first_of_severity(Severity::Low).map(Incident::id), Some(1));
    }

    #[test]
    fn test_sequential_inserts_stay_logarithmic() {
        let mut index = PriorityIndex::new();
        for id in 1..=1023 {
            index.insert(low(id)).unwrap();
        }
        assert_eq!(index.height(), 10);
        assert!(root_balance(&index).abs() <= 1);
        assert!(index.check_invariants().is_ok());
    }

    fn severity_strategy() -> impl Strategy<Value = Severity> {
        prop_oneof![Just(Severity::Low), Just(Severity::Medium), Just(Severity::High)]
    }

    proptest! {
        #[test]
        fn prop_inserts_keep_balance_and_order(
            entries in prop::collection::vec((1u32..500, severity_strategy()), 0..200)
        ) {
            let mut index = PriorityIndex::new();
            for (id, severity) in &entries {
                let before = index.rebalance_count();
                let _ = index.insert(incident(*id, *severity));
                prop_assert!(index.rebalance_count() - before <= 1);
                prop_assert_eq!(index.check_invariants(), Ok(()));
            }

            let keys: Vec<PriorityKey> = index.traverse_by_priority().map(PriorityKey::of).collect();
            prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
            prop_assert_eq!(keys.len(), index.len());
        }

        #[test]
        fn prop_removals_keep_balance(
            ids in prop::collection::btree_set(1u32..300, 1..120),
            remove_every in 1usize..4,
        ) {
            let mut index = PriorityIndex::new();
            let incidents: Vec<Incident> = ids
                .iter()
                .map(|id| incident(*id, Severity::try_from((id % 3 + 1) as u8).unwrap()))
                .collect();
            for item in &incidents {
                index.insert(*item).unwrap();
            }

            for (position, item) in incidents.iter().enumerate() {
                if position % remove_every != 0 {
                    continue;
                }
                let len = index.len();
                prop_assert_eq!(index.remove(item.severity(), item.id()), Ok(*item));
                prop_assert_eq!(index.len(), len - 1);
                prop_assert!(index.find(PriorityKey::of(item)).is_none());
                prop_assert_eq!(index.check_invariants(), Ok(()));
            }

            for (position, item) in incidents.iter().enumerate() {
                let expected = if position % remove_every == 0 { None } else { Some(item) };
                prop_assert_eq!(index.find(PriorityKey::of(item)), expected);
            }
        }
    }
}
