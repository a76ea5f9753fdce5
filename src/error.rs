//! Application error types.

use thiserror::Error;

use crate::services::{MergeError, TreeError};

/// Application-level errors for the explorer.
#[derive(Error, Debug)]
pub enum AppError {
    // Network errors
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Malformed response from {url}: {message}")]
    Payload { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Invalid API base URL '{0}'")]
    InvalidBaseUrl(String),

    // Domain errors
    #[error("Metadata validation failed: {0}")]
    Validation(#[from] MergeError),

    #[error("Category tree rejected: {0}")]
    Structural(#[from] TreeError),

    #[error("A metadata save is already in progress")]
    SaveInProgress,

    #[error("No entity is selected")]
    NoSelection,

    #[error("Metadata for the selected entity has not loaded")]
    MetadataNotLoaded,

    #[error("Major and minor parameters are required")]
    MissingPageQuery,

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    /// Whether the error came from talking to the store: a transport
    /// failure, a non-success status, or an unreadable body.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            AppError::Transport { .. } | AppError::Status { .. } | AppError::Payload { .. }
        )
    }
}
