//! URL construction for the graph store API.

use reqwest::Url;

use crate::error::AppError;

/// Builds endpoint URLs from an explicit base URL.
///
/// Path segments and query values are percent-encoded, so entity ids and
/// kind names may contain spaces or slashes.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
    counts_path: String,
}

impl Endpoints {
    pub fn new(base_url: &str, counts_path: &str) -> Result<Self, AppError> {
        let base =
            Url::parse(base_url).map_err(|_| AppError::InvalidBaseUrl(base_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(AppError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            base,
            counts_path: counts_path.trim_matches('/').to_string(),
        })
    }

    /// `GET /counts` (or the configured counts path).
    pub fn counts(&self) -> Url {
        self.join(&[self.counts_path.as_str()])
    }

    /// `GET /entities?major&minor&offset&limit`
    pub fn entities(&self, major: &str, minor: &str, offset: u64, limit: u32) -> Url {
        let mut url = self.join(&["entities"]);
        url.query_pairs_mut()
            .append_pair("major", major)
            .append_pair("minor", minor)
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.to_string());
        url
    }

    /// `GET|POST /entities/{id}/metadata`
    pub fn metadata(&self, entity_id: &str) -> Url {
        self.join(&["entities", entity_id, "metadata"])
    }

    /// `GET /entities/{id}/relations`
    pub fn relations(&self, entity_id: &str) -> Url {
        self.join(&["entities", entity_id, "relations"])
    }

    /// `GET /entities/{id}/categories/tree`
    pub fn category_tree(&self, entity_id: &str) -> Url {
        self.join(&["entities", entity_id, "categories", "tree"])
    }

    fn join(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in `new`: the base can always take path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
