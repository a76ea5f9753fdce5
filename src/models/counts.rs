//! Entity count summary model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Response of the counts endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Counts {
    #[serde(deserialize_with = "super::nullable::or_default")]
    pub total_count: u64,
    /// Entity count per major kind.
    #[serde(deserialize_with = "super::nullable::or_default")]
    pub major_counts: BTreeMap<String, u64>,
    /// Entity count per minor kind, grouped by major kind.
    #[serde(deserialize_with = "super::nullable::or_default")]
    pub minor_counts: BTreeMap<String, BTreeMap<String, u64>>,
}
