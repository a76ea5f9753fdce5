//! Relation models for typed edges between entities.

use serde::{Deserialize, Serialize};

use super::{KindPair, WireValue};

/// A typed edge from the selected entity to another entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relation {
    #[serde(deserialize_with = "super::nullable::or_default")]
    pub id: String,
    pub name: WireValue,
    #[serde(deserialize_with = "super::nullable::or_default")]
    pub kind: KindPair,
    pub created: Option<String>,
    pub terminated: Option<String>,
    /// Edge direction relative to the selected entity (e.g. `OUTGOING`).
    pub direction: Option<String>,
}

/// One batch of relations as returned by `GET /entities/{id}/relations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationBatch {
    #[serde(deserialize_with = "super::nullable::or_default")]
    pub body: Vec<Relation>,
}
