//! Depth-first traversal of category trees.
//!
//! Trees are walked with an explicit stack, never by recursion, so deep or
//! hostile payloads cannot exhaust the call stack. Two guards reject bad
//! input with a [`TreeError`]:
//!
//! - a depth bound (roots are depth 0; a node at `max_depth` is rejected)
//! - an ancestor-id set: a node whose id already appears on its own path
//!   from the root closes a cycle
//!
//! The same id may appear in unrelated branches; only ancestry matters.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::models::{format_date, CategoryNode};
use crate::wire::HeaderMode;

/// Number of distinct depth styles cycled through by renderers.
pub const PALETTE_LEVELS: usize = 8;

/// Depth bound used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Label used for nodes without an id in error messages.
const UNNAMED_NODE: &str = "<unnamed>";

/// Structural problems in a category tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("tree exceeds maximum depth {max_depth} at node {node}")]
    TooDeep { max_depth: usize, node: String },

    #[error("tree cycles back to entity {0}")]
    Cycle(String),
}

/// How a node hangs off its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// A root or an entry of `children`.
    Child,
    /// An entry of `attributes`.
    Attribute,
}

enum Step<'a> {
    Enter {
        node: &'a CategoryNode,
        depth: usize,
        role: NodeRole,
    },
    Leave(&'a str),
}

/// Bounded, cycle-safe depth-first walker.
#[derive(Debug, Clone, Copy)]
pub struct CategoryTreeWalker {
    max_depth: usize,
}

impl Default for CategoryTreeWalker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl CategoryTreeWalker {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Visits every node in pre-order: a node, then its attributes, then its
    /// children, each subtree fully before the next sibling.
    ///
    /// Returns the number of visited nodes. Stops at the first structural
    /// error; nodes visited before it have already been passed to `visit`.
    pub fn walk<'a, F>(&self, roots: &'a [CategoryNode], mut visit: F) -> Result<usize, TreeError>
    where
        F: FnMut(&'a CategoryNode, usize, NodeRole),
    {
        let mut stack: Vec<Step<'a>> = roots
            .iter()
            .rev()
            .map(|node| Step::Enter {
                node,
                depth: 0,
                role: NodeRole::Child,
            })
            .collect();
        let mut ancestors: HashSet<&'a str> = HashSet::new();
        let mut visited = 0;

        while let Some(step) = stack.pop() {
            let (node, depth, role) = match step {
                Step::Leave(id) => {
                    ancestors.remove(id);
                    continue;
                }
                Step::Enter { node, depth, role } => (node, depth, role),
            };

            if depth >= self.max_depth {
                return Err(TreeError::TooDeep {
                    max_depth: self.max_depth,
                    node: node.id().unwrap_or(UNNAMED_NODE).to_string(),
                });
            }
            if let Some(id) = node.id() {
                if !ancestors.insert(id) {
                    return Err(TreeError::Cycle(id.to_string()));
                }
                stack.push(Step::Leave(id));
            }

            visit(node, depth, role);
            visited += 1;

            // Pushed in reverse so attributes pop first, then children in order
            let children = node.children.iter().rev().map(|child| Step::Enter {
                node: child,
                depth: depth + 1,
                role: NodeRole::Child,
            });
            stack.extend(children);
            let attributes = node.attributes.iter().rev().map(|attr| Step::Enter {
                node: attr,
                depth: depth + 1,
                role: NodeRole::Attribute,
            });
            stack.extend(attributes);
        }

        Ok(visited)
    }

    /// Flattens the tree into display rows in traversal order.
    pub fn rows(
        &self,
        roots: &[CategoryNode],
        mode: HeaderMode,
    ) -> Result<Vec<CategoryRow>, TreeError> {
        let mut rows = Vec::new();
        self.walk(roots, |node, depth, role| {
            rows.push(CategoryRow::new(node, depth, role, mode));
        })?;
        Ok(rows)
    }
}

/// A category tree node ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRow {
    pub depth: usize,
    pub role: NodeRole,
    pub id: String,
    /// Decoded node name.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    pub start_time: String,
    /// End date, or `None` while the membership is ongoing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Style slot in `0..PALETTE_LEVELS`.
    pub palette: usize,
}

impl CategoryRow {
    fn new(node: &CategoryNode, depth: usize, role: NodeRole, mode: HeaderMode) -> Self {
        Self {
            depth,
            role,
            id: node.id().unwrap_or_default().to_string(),
            name: node.name.decode(mode).into_string(),
            direction: node.direction.clone(),
            start_time: format_date(node.start_time.as_deref()),
            end_time: node
                .end_time
                .as_deref()
                .map(|end| format_date(Some(end))),
            palette: depth % PALETTE_LEVELS,
        }
    }
}
