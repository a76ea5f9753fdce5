//! Dashboard summary built from entity counts.

use serde::Serialize;

use crate::context::Context;
use crate::error::AppError;
use crate::models::Counts;

/// A labelled count for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountTile {
    pub title: String,
    pub value: u64,
    pub major: String,
    /// Set for minor-kind tiles, which link to the entity listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor: Option<String>,
}

/// Counts arranged for display.
#[derive(Debug, Clone, PartialEq)]
pub struct CountsSummary {
    counts: Counts,
}

impl CountsSummary {
    pub fn new(counts: Counts) -> Self {
        Self { counts }
    }

    /// Fetches counts from the store.
    pub async fn load(ctx: &Context) -> Result<Self, AppError> {
        let counts = ctx.store.fetch_counts().await?;
        tracing::debug!(total = counts.total_count, "loaded counts");
        Ok(Self::new(counts))
    }

    pub fn total(&self) -> u64 {
        self.counts.total_count
    }

    /// One tile per major kind.
    pub fn major_tiles(&self) -> Vec<CountTile> {
        self.counts
            .major_counts
            .iter()
            .map(|(major, &value)| CountTile {
                title: major_title(major, value),
                value,
                major: major.clone(),
                minor: None,
            })
            .collect()
    }

    /// One tile per minor kind, grouped by major kind.
    pub fn minor_tiles(&self) -> Vec<CountTile> {
        self.counts
            .minor_counts
            .iter()
            .flat_map(|(major, minors)| {
                minors.iter().map(move |(minor, &value)| CountTile {
                    title: capitalize(minor),
                    value,
                    major: major.clone(),
                    minor: Some(minor.clone()),
                })
            })
            .collect()
    }
}

fn major_title(major: &str, count: u64) -> String {
    match (major, count > 1) {
        ("Person", true) => "Total People".to_string(),
        ("Person", false) => "Total Person".to_string(),
        (_, true) => format!("Total {}s", major),
        (_, false) => format!("Total {}", major),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
