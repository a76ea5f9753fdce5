//! Data access layer for the graph store HTTP API.
//!
//! The store is reached through the [`EntityStore`] trait so coordinators can
//! be driven by any backend:
//!
//! - [`EntityStore`] - one async method per API endpoint
//! - [`Endpoints`] - URL construction from an explicit base URL
//! - [`backends::http::HttpStore`] - `reqwest` implementation
//!
//! # Usage
//!
//! ```ignore
//! use opengin_explorer::config::ApiConfig;
//! use opengin_explorer::store::{backends::http::HttpStore, EntityStore};
//!
//! let store = HttpStore::new(&ApiConfig::default())?;
//! let page = store.fetch_entities("Organisation", "minister", 0, 50).await?;
//! let metadata = store.fetch_metadata(&page.items[0].id).await?;
//! ```

mod endpoints;
mod traits;

pub mod backends;

pub use endpoints::Endpoints;
pub use traits::EntityStore;
