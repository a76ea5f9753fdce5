//! Metadata management commands.

use clap::Subcommand;
use color_eyre::Result;

use crate::models::{Entity, MetadataCandidate};
use crate::services::EntityDetailOrchestrator;

use super::load_context;

/// Metadata management subcommands.
#[derive(Subcommand)]
pub enum MetadataCommand {
    /// Add new metadata keys to an entity
    Add {
        /// Entity id
        id: String,

        /// Entries as key=value
        #[arg(required = true)]
        pairs: Vec<MetadataCandidate>,
    },
}

impl MetadataCommand {
    /// Run the metadata subcommand.
    pub async fn run(&self) -> Result<()> {
        match self {
            MetadataCommand::Add { id, pairs } => run_add(id, pairs).await,
        }
    }
}

/// Validate new entries against the stored metadata, save and reload.
async fn run_add(id: &str, pairs: &[MetadataCandidate]) -> Result<()> {
    let ctx = load_context()?;
    let header = ctx.config.decoder.header;
    let orchestrator = EntityDetailOrchestrator::new(&ctx);

    orchestrator.select(Entity::with_id(id)).await.settled().await;
    if let Some(err) = orchestrator.view().await.metadata.error() {
        color_eyre::eyre::bail!("Failed to load metadata for {}: {}", id, err.message);
    }

    let saved = orchestrator.save_metadata(pairs).await?;

    println!("Saved metadata for {}", id);
    for (key, value) in saved.iter() {
        println!("  {}: {}", key, value.decode(header).as_str());
    }
    Ok(())
}
