//! In-memory store for exercising the coordinators in tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::config::Config;
use crate::context::Context;
use crate::error::AppError;
use crate::models::{
    CategoryNode, Counts, EntityPage, MetadataEntry, MetadataMap, RelationBatch, WireValue,
};
use crate::store::EntityStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    Counts,
    Entities,
    Metadata,
    SaveMetadata,
    Relations,
    Tree,
}

#[derive(Default)]
struct Data {
    counts: Counts,
    pages: HashMap<u64, EntityPage>,
    metadata: HashMap<String, MetadataMap>,
    relations: HashMap<String, Vec<RelationBatch>>,
    trees: HashMap<String, Vec<CategoryNode>>,
    failing: HashSet<(Call, String)>,
    gates: HashMap<(Call, String), Arc<Notify>>,
    saved: Vec<(String, Vec<MetadataEntry>)>,
}

/// Store answering from maps. Calls can be made to fail, or held at a gate
/// until the test releases them with `notify_one`.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Data>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_counts(&self, counts: Counts) {
        self.data.lock().unwrap().counts = counts;
    }

    pub fn set_page(&self, offset: u64, page: EntityPage) {
        self.data.lock().unwrap().pages.insert(offset, page);
    }

    pub fn set_metadata(&self, id: &str, map: MetadataMap) {
        self.data.lock().unwrap().metadata.insert(id.to_string(), map);
    }

    pub fn set_relations(&self, id: &str, batches: Vec<RelationBatch>) {
        self.data.lock().unwrap().relations.insert(id.to_string(), batches);
    }

    pub fn set_tree(&self, id: &str, roots: Vec<CategoryNode>) {
        self.data.lock().unwrap().trees.insert(id.to_string(), roots);
    }

    /// Makes the call for `key` (entity id or page offset) answer HTTP 500.
    pub fn fail(&self, call: Call, key: &str) {
        self.data.lock().unwrap().failing.insert((call, key.to_string()));
    }

    /// Holds the call for `key` until the returned gate is notified.
    pub fn gate(&self, call: Call, key: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.data
            .lock()
            .unwrap()
            .gates
            .insert((call, key.to_string()), Arc::clone(&gate));
        gate
    }

    /// Every accepted save, in order.
    pub fn saved(&self) -> Vec<(String, Vec<MetadataEntry>)> {
        self.data.lock().unwrap().saved.clone()
    }

    async fn enter(&self, call: Call, key: &str) -> Result<(), AppError> {
        let gate = self
            .data
            .lock()
            .unwrap()
            .gates
            .get(&(call, key.to_string()))
            .cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self
            .data
            .lock()
            .unwrap()
            .failing
            .contains(&(call, key.to_string()))
        {
            return Err(AppError::Status {
                url: format!("memory://{:?}/{}", call, key),
                status: 500,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn fetch_counts(&self) -> Result<Counts, AppError> {
        self.enter(Call::Counts, "").await?;
        Ok(self.data.lock().unwrap().counts.clone())
    }

    async fn fetch_entities(
        &self,
        _major: &str,
        _minor: &str,
        offset: u64,
        _limit: u32,
    ) -> Result<EntityPage, AppError> {
        self.enter(Call::Entities, &offset.to_string()).await?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .pages
            .get(&offset)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_metadata(&self, entity_id: &str) -> Result<MetadataMap, AppError> {
        self.enter(Call::Metadata, entity_id).await?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .metadata
            .get(entity_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_metadata(
        &self,
        entity_id: &str,
        entries: &[MetadataEntry],
    ) -> Result<(), AppError> {
        self.enter(Call::SaveMetadata, entity_id).await?;
        let mut data = self.data.lock().unwrap();
        data.saved.push((entity_id.to_string(), entries.to_vec()));
        let stored: MetadataMap = entries
            .iter()
            .map(|e| (e.key.clone(), WireValue::encoded(&e.value)))
            .collect();
        data.metadata.insert(entity_id.to_string(), stored);
        Ok(())
    }

    async fn fetch_relations(&self, entity_id: &str) -> Result<Vec<RelationBatch>, AppError> {
        self.enter(Call::Relations, entity_id).await?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .relations
            .get(entity_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_category_tree(&self, entity_id: &str) -> Result<Vec<CategoryNode>, AppError> {
        self.enter(Call::Tree, entity_id).await?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .trees
            .get(entity_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Context over `store` with default configuration.
pub fn context(store: Arc<MemoryStore>) -> Context {
    context_with(store, Config::default())
}

pub fn context_with(store: Arc<MemoryStore>, config: Config) -> Context {
    Context::new(store, config)
}
