//! CLI module for the OpenGIN explorer.
//!
//! Subcommands:
//! - `counts`: Entity counts by kind
//! - `entities`: One page of entities of a kind
//! - `show`: Metadata, relations and categories of one entity
//! - `metadata`: Metadata editing
//! - `decode`: Decode a wire value

mod counts;
mod decode;
mod entities;
mod metadata;
mod show;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::context::Context;
use crate::wire::HeaderMode;

pub use metadata::MetadataCommand;

/// OpenGIN explorer - browse entities of an OpenGIN graph store
#[derive(Parser)]
#[command(name = "opengin-explorer")]
#[command(about = "Browse entities, relations and metadata of an OpenGIN graph store")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show entity counts by major and minor kind
    Counts,

    /// List one page of entities of a kind
    Entities {
        /// Major kind, e.g. Person
        #[arg(long)]
        major: String,

        /// Minor kind, e.g. citizen
        #[arg(long)]
        minor: String,

        /// Index of the first entity
        #[arg(long, default_value = "0")]
        offset: u64,

        /// Page size (defaults to browse.page_size)
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Load metadata, relations and categories of an entity
    Show {
        /// Entity id
        id: String,

        /// Display name of the entity
        #[arg(long)]
        name: Option<String>,
    },

    /// Entity metadata management
    Metadata {
        #[command(subcommand)]
        command: MetadataCommand,
    },

    /// Decode a wire value
    Decode {
        /// Raw value as stored, usually a JSON envelope
        value: String,

        /// Header treatment (defaults to decoder.header)
        #[arg(long)]
        header: Option<HeaderMode>,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Counts => self.run_counts().await,
            Command::Entities {
                ref major,
                ref minor,
                offset,
                limit,
            } => self.run_entities(major, minor, offset, limit).await,
            Command::Show { ref id, ref name } => self.run_show(id, name.as_deref()).await,
            Command::Metadata { ref command } => command.run().await,
            Command::Decode { ref value, header } => self.run_decode(value, header),
        }
    }
}

/// Loads configuration and builds the HTTP-backed context.
fn load_context() -> color_eyre::Result<Context> {
    let config = Config::load()?;
    tracing::debug!(base_url = %config.api.base_url, "loaded configuration");
    Ok(Context::from_config(config)?)
}
