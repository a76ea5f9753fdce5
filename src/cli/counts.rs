//! Counts command handler.

use color_eyre::Result;

use crate::services::CountsSummary;

use super::{load_context, App};

impl App {
    /// Print the dashboard counts.
    pub async fn run_counts(&self) -> Result<()> {
        let ctx = load_context()?;
        let summary = CountsSummary::load(&ctx).await?;

        println!("Total entities: {}", summary.total());
        println!();
        for tile in summary.major_tiles() {
            println!("{:<32} {:>8}", tile.title, tile.value);
        }

        let minor = summary.minor_tiles();
        if !minor.is_empty() {
            println!();
            for tile in minor {
                println!("{:<20} {:<32} {:>8}", tile.major, tile.title, tile.value);
            }
        }

        Ok(())
    }
}
