//! Category tree node model.

use serde::{Deserialize, Serialize};

use super::WireValue;

/// A node of the categorization tree returned by
/// `GET /entities/{id}/categories/tree`.
///
/// Nodes identify themselves through `entityId` at the root level and
/// `relatedEntityId` below it; [`CategoryNode::id`] resolves either.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_entity_id: Option<String>,
    #[serde(default)]
    pub name: WireValue,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    /// Attribute nodes, traversed like children but rendered differently.
    #[serde(default, deserialize_with = "super::nullable::or_default")]
    pub attributes: Vec<CategoryNode>,
    #[serde(default, deserialize_with = "super::nullable::or_default")]
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// The node's entity id, preferring `entityId` over `relatedEntityId`.
    /// Empty ids count as absent.
    pub fn id(&self) -> Option<&str> {
        [&self.entity_id, &self.related_entity_id]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|id| !id.is_empty())
    }
}

// Deep chains would otherwise be dropped recursively, one frame per level
impl Drop for CategoryNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        pending.append(&mut self.attributes);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
            pending.append(&mut node.attributes);
        }
    }
}
