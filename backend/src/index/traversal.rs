//! Lazy depth-first walks shared by both indices
//!
//! Walks use an explicit stack, so a degenerate (list-shaped) identifier
//! tree can be traversed without deep recursion.

use crate::models::incident::Incident;
use serde::{Deserialize, Serialize};

/// Depth-first visiting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    /// Left subtree, node, right subtree (ascending key order)
    InOrder,
    /// Node, left subtree, right subtree
    PreOrder,
    /// Left subtree, right subtree, node
    PostOrder,
}

/// Read access to a binary tree node holding an incident
pub trait TreeNode {
    fn incident(&self) -> &Incident;
    fn left(&self) -> Option<&Self>;
    fn right(&self) -> Option<&Self>;
}

/// Iterator over a tree in a given [`TraversalOrder`]
///
/// Borrows the tree. Each call to the owning index's `traverse` starts a
/// fresh walk from the root.
pub struct Traversal<'a, N> {
    order: TraversalOrder,
    // (node, expanded): expanded nodes are emitted when popped
    stack: Vec<(&'a N, bool)>,
}

impl<'a, N: TreeNode> Traversal<'a, N> {
    pub(crate) fn new(root: Option<&'a N>, order: TraversalOrder) -> Self {
        Self {
            order,
            stack: root.map(|node| (node, false)).into_iter().collect(),
        }
    }

    fn push_child(&mut self, child: Option<&'a N>) {
        if let Some(child) = child {
            self.stack.push((child, false));
        }
    }
}

impl<'a, N: TreeNode> Iterator for Traversal<'a, N> {
    type Item = &'a Incident;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node, expanded) = self.stack.pop()?;
            if expanded {
                return Some(node.incident());
            }
            match self.order {
                TraversalOrder::PreOrder => {
                    self.push_child(node.right());
                    self.push_child(node.left());
                    return Some(node.incident());
                }
                TraversalOrder::InOrder => {
                    self.push_child(node.right());
                    self.stack.push((node, true));
                    self.push_child(node.left());
                }
                TraversalOrder::PostOrder => {
                    self.stack.push((node, true));
                    self.push_child(node.right());
                    self.push_child(node.left());
                }
            }
        }
    }
}
