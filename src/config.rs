//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/opengin-explorer/config.toml` (XDG) or platform config dir
//! 2. Project config: `.opengin.toml`
//! 3. Environment variables: `OPENGIN_*`, nested with `__`
//!    (e.g. `OPENGIN_API__BASE_URL`)
//!
//! Every section has defaults, so an empty environment yields a working
//! configuration pointed at `http://localhost:8000`.
//!
//! ```toml
//! [api]
//! base_url = "https://opengin.example.org/api"
//! timeout_secs = 30
//! counts_path = "counts"
//!
//! [browse]
//! page_size = 50
//!
//! [tree]
//! max_depth = 64
//!
//! [decoder]
//! header = "detect"   # detect | strip | keep
//! ```

use std::ops::Deref;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

use crate::services::DEFAULT_MAX_DEPTH;
use crate::wire::HeaderMode;

/// Project config file name, resolved against the working directory.
pub const PROJECT_CONFIG_FILE: &str = ".opengin.toml";

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub browse: BrowseConfig,
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
}

/// Graph store HTTP API configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint is resolved against.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Path of the counts endpoint. Deployments expose either `count` or `counts`.
    pub counts_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            counts_path: "counts".to_string(),
        }
    }
}

/// Entity listing configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    /// Entities requested per page.
    pub page_size: u32,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self { page_size: 50 }
    }
}

/// Category tree traversal limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Deepest level the walker descends to before rejecting the tree.
    pub max_depth: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Wire value decoding options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Treatment of the two-byte field header in front of payloads.
    pub header: HeaderMode,
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        let figment = Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(Self::user_config_path()))
            // Layers 2 and 3: project file, then environment
            .merge(Self::local_layers());
        Self::from_figment(&figment)
    }

    /// Extracts and validates a config from already merged layers.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings no component can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.browse.page_size == 0 {
            return Err(invalid("browse.page_size must be at least 1"));
        }
        if self.tree.max_depth == 0 {
            return Err(invalid("tree.max_depth must be at least 1"));
        }
        Ok(())
    }

    /// Project file and environment layers, without the user config.
    pub fn local_layers() -> Figment {
        Figment::new()
            .merge(Toml::file(PROJECT_CONFIG_FILE))
            .merge(Env::prefixed("OPENGIN_").split("__"))
    }

    /// User config path: ~/.config/opengin-explorer/config.toml (XDG) or platform config dir.
    fn user_config_path() -> std::path::PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home
                .join(".config")
                .join("opengin-explorer")
                .join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        dirs::config_dir()
            .map(|p| p.join("opengin-explorer").join("config.toml"))
            .unwrap_or_default()
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::from(figment::Error::from(message.to_string()))
}
