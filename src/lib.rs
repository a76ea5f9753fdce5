//! OpenGIN Explorer - entity, relation and metadata browsing core
//!
//! Recovers text from wire-encoded values, flattens relation batches and
//! category trees, validates metadata edits, and coordinates the per-entity
//! detail fetches against the graph store HTTP API.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod wire;
