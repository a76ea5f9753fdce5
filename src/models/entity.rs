//! Entity model representing nodes in the graph store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::WireValue;

/// A node in the graph store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entity {
    /// Store-assigned identifier.
    #[serde(deserialize_with = "super::nullable::or_default")]
    pub id: String,
    /// Wire-encoded display name.
    pub name: WireValue,
    /// Creation timestamp as sent by the store.
    pub created: Option<String>,
    /// Termination timestamp; `None` while the entity is active.
    pub terminated: Option<String>,
}

impl Entity {
    /// Entity known only by id, named by the id itself.
    pub fn with_id(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: WireValue::from(id),
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.terminated.is_none()
    }
}

/// Major/minor classification of an entity or relation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct KindPair {
    #[serde(deserialize_with = "super::nullable::or_default")]
    pub major: String,
    #[serde(deserialize_with = "super::nullable::or_default")]
    pub minor: String,
}

impl std::fmt::Display for KindPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.major, self.minor)
    }
}

/// One page of `GET /entities`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityPage {
    /// The kind this page was filtered by.
    #[serde(deserialize_with = "super::nullable::or_default")]
    pub pair: KindPair,
    /// Number of items on this page.
    #[serde(deserialize_with = "super::nullable::or_default")]
    pub count: u64,
    /// Total number of entities of this kind.
    #[serde(deserialize_with = "super::nullable::or_default")]
    pub total: u64,
    #[serde(deserialize_with = "super::nullable::or_default")]
    pub items: Vec<Entity>,
}

/// Formats a store timestamp as a calendar date.
///
/// Returns `N/A` for a missing value and the input unchanged when it is not
/// a recognizable timestamp.
pub fn format_date(timestamp: Option<&str>) -> String {
    let Some(raw) = timestamp.filter(|s| !s.is_empty()) else {
        return "N/A".to_string();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc).format("%Y-%m-%d").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}
