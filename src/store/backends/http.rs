//! HTTP backend for the graph store API.
//!
//! # Example
//!
//! ```ignore
//! use opengin_explorer::config::ApiConfig;
//! use opengin_explorer::store::backends::http::HttpStore;
//!
//! let store = HttpStore::new(&ApiConfig::default())?;
//! let counts = store.fetch_counts().await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::error::AppError;
use crate::models::{CategoryNode, Counts, EntityPage, MetadataEntry, MetadataMap, RelationBatch};
use crate::store::{Endpoints, EntityStore};

/// [`EntityStore`] over JSON-over-HTTP.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    endpoints: Endpoints,
}

impl HttpStore {
    /// Creates a store for the configured base URL.
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let endpoints = Endpoints::new(&config.base_url, &config.counts_path)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Client(e.to_string()))?;

        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// GETs `url` and parses the body. A `null` body reads as `T::default()`.
    async fn get_json<T>(&self, url: Url) -> Result<T, AppError>
    where
        T: DeserializeOwned + Default,
    {
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| AppError::Transport {
                url: url.to_string(),
                source,
            })?;

        let response = check_status(&url, response)?;
        let body = response
            .bytes()
            .await
            .map_err(|source| AppError::Transport {
                url: url.to_string(),
                source,
            })?;

        parse_body(&body).map_err(|e| AppError::Payload {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Parses a JSON body with no nesting limit.
///
/// Category trees may nest deeper than serde_json's default recursion limit;
/// the depth bound is enforced afterwards by the tree walker. Recursion runs
/// on a stack that `serde_stacker` grows on the heap as needed.
fn parse_body<T>(body: &[u8]) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    let mut de = serde_json::Deserializer::from_slice(body);
    de.disable_recursion_limit();
    let value = Option::<T>::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value.unwrap_or_default())
}

fn check_status(url: &Url, response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        tracing::warn!(%url, status = status.as_u16(), "store request failed");
        Err(AppError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl EntityStore for HttpStore {
    async fn fetch_counts(&self) -> Result<Counts, AppError> {
        self.get_json(self.endpoints.counts()).await
    }

    async fn fetch_entities(
        &self,
        major: &str,
        minor: &str,
        offset: u64,
        limit: u32,
    ) -> Result<EntityPage, AppError> {
        self.get_json(self.endpoints.entities(major, minor, offset, limit))
            .await
    }

    async fn fetch_metadata(&self, entity_id: &str) -> Result<MetadataMap, AppError> {
        self.get_json(self.endpoints.metadata(entity_id)).await
    }

    async fn save_metadata(
        &self,
        entity_id: &str,
        entries: &[MetadataEntry],
    ) -> Result<(), AppError> {
        let url = self.endpoints.metadata(entity_id);
        tracing::debug!(%url, entries = entries.len(), "POST");

        let response = self
            .client
            .post(url.clone())
            .json(entries)
            .send()
            .await
            .map_err(|source| AppError::Transport {
                url: url.to_string(),
                source,
            })?;

        check_status(&url, response)?;
        Ok(())
    }

    async fn fetch_relations(&self, entity_id: &str) -> Result<Vec<RelationBatch>, AppError> {
        self.get_json(self.endpoints.relations(entity_id)).await
    }

    async fn fetch_category_tree(&self, entity_id: &str) -> Result<Vec<CategoryNode>, AppError> {
        self.get_json(self.endpoints.category_tree(entity_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `[{"entityId":"n0","children":[{"entityId":"n1","children":[...]}]}]`
    fn chain_json(depth: usize) -> String {
        let mut json = String::from("[");
        for i in 0..depth {
            json.push_str(&format!(r#"{{"entityId":"n{}","children":["#, i));
        }
        json.push_str(&"]}".repeat(depth));
        json.push(']');
        json
    }

    #[test]
    fn test_parse_body_beyond_default_recursion_limit() {
        let roots: Vec<CategoryNode> = parse_body(chain_json(1000).as_bytes()).unwrap();

        let mut depth = 0;
        let mut node = &roots[0];
        while let Some(child) = node.children.first() {
            node = child;
            depth += 1;
        }
        assert_eq!(depth, 999);
        assert_eq!(node.id(), Some("n999"));
    }

    #[test]
    fn test_parse_body_null_and_trailing_data() {
        let batches: Vec<RelationBatch> = parse_body(b"null").unwrap();
        assert!(batches.is_empty());
        let counts: Counts = parse_body(b" null ").unwrap();
        assert_eq!(counts, Counts::default());

        assert!(parse_body::<Vec<RelationBatch>>(b"[] []").is_err());
        assert!(parse_body::<Vec<RelationBatch>>(b"<html>").is_err());
    }
}
