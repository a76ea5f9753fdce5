//! Application context holding shared dependencies.

use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::store::backends::http::HttpStore;
use crate::store::EntityStore;

/// Shared handle to the graph store.
pub type AppStore = Arc<dyn EntityStore>;

/// Root application context.
///
/// Services take their store and configuration from here at construction;
/// nothing reads ambient process state afterwards.
#[derive(Clone)]
pub struct Context {
    /// Graph store client.
    pub store: AppStore,
    /// Application configuration.
    pub config: Arc<Config>,
}

impl Context {
    /// Creates a new context with the given dependencies.
    pub fn new(store: AppStore, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Creates a context backed by the HTTP store at the configured base URL.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let store = HttpStore::new(&config.api)?;
        tracing::debug!(base_url = %config.api.base_url, "using HTTP store");
        Ok(Self::new(Arc::new(store), config))
    }
}
