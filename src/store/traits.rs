//! Core trait for graph store access.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{CategoryNode, Counts, EntityPage, MetadataEntry, MetadataMap, RelationBatch};

/// Reads and writes entity data in the graph store.
///
/// Every method maps to one API call. Implementations must not retry: a
/// failed call surfaces its error and the caller decides whether to try again.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Entity counts for the dashboard.
    async fn fetch_counts(&self) -> Result<Counts, AppError>;

    /// One page of entities of the given kind.
    async fn fetch_entities(
        &self,
        major: &str,
        minor: &str,
        offset: u64,
        limit: u32,
    ) -> Result<EntityPage, AppError>;

    /// Metadata of one entity.
    async fn fetch_metadata(&self, entity_id: &str) -> Result<MetadataMap, AppError>;

    /// Replaces the metadata of one entity with the given entries.
    ///
    /// The response body carries no contract; only success matters.
    async fn save_metadata(&self, entity_id: &str, entries: &[MetadataEntry])
        -> Result<(), AppError>;

    /// Relation batches of one entity.
    async fn fetch_relations(&self, entity_id: &str) -> Result<Vec<RelationBatch>, AppError>;

    /// Root nodes of the category tree of one entity.
    async fn fetch_category_tree(&self, entity_id: &str) -> Result<Vec<CategoryNode>, AppError>;
}
