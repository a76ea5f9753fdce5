//! Relation batch flattening and presentation rows.

use serde::Serialize;

use crate::models::{format_date, Relation, RelationBatch};
use crate::wire::HeaderMode;

/// Concatenates the bodies of all batches, batch order first, then order
/// within each batch.
pub fn flatten(batches: Vec<RelationBatch>) -> Vec<Relation> {
    batches.into_iter().flat_map(|batch| batch.body).collect()
}

/// A relation ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationRow {
    pub id: String,
    /// Decoded relation name.
    pub name: String,
    /// `major - minor`.
    pub kind: String,
    pub created: String,
    /// Termination date, or `Active`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

impl RelationRow {
    pub fn new(relation: &Relation, mode: HeaderMode) -> Self {
        Self {
            id: relation.id.clone(),
            name: relation.name.decode(mode).into_string(),
            kind: relation.kind.to_string(),
            created: format_date(relation.created.as_deref()),
            status: match relation.terminated.as_deref() {
                Some(terminated) => format_date(Some(terminated)),
                None => "Active".to_string(),
            },
            direction: relation.direction.clone(),
        }
    }
}
