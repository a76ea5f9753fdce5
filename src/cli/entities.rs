//! Entities command handler.

use color_eyre::Result;

use crate::services::EntityPager;

use super::{load_context, App};

impl App {
    /// Print one page of entities of a kind.
    pub async fn run_entities(
        &self,
        major: &str,
        minor: &str,
        offset: u64,
        limit: Option<u32>,
    ) -> Result<()> {
        let ctx = load_context()?;
        let mut pager = EntityPager::new(&ctx, major, minor)?;
        if let Some(limit) = limit {
            pager = pager.with_limit(limit);
        }

        pager.load(offset).await?;
        let view = pager.view().await;
        let rows = view.rows.data().cloned().unwrap_or_default();

        println!("{} ({} total)", pager.kind(), view.total);
        if rows.is_empty() {
            println!("No entities found");
            return Ok(());
        }

        for row in &rows {
            println!(
                "{:<40} {:<40} {:<12} {}",
                row.id, row.name, row.created, row.status
            );
        }

        let first = view.offset.saturating_add(1);
        let last = view.offset.saturating_add(rows.len() as u64);
        println!();
        println!("Showing {}-{} of {}", first, last, view.total);
        if view.has_next() {
            let next = view.offset.saturating_add(u64::from(view.limit));
            println!("Next page: --offset {}", next);
        }

        Ok(())
    }
}
