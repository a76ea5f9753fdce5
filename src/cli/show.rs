//! Show command handler.

use color_eyre::Result;

use crate::models::{Entity, WireValue};
use crate::services::{EntityDetailOrchestrator, RelationRow, Slot, SlotError};

use super::{load_context, App};

impl App {
    /// Load and print the detail view of one entity.
    pub async fn run_show(&self, id: &str, name: Option<&str>) -> Result<()> {
        let ctx = load_context()?;
        let header = ctx.config.decoder.header;
        let orchestrator = EntityDetailOrchestrator::new(&ctx);

        let mut entity = Entity::with_id(id);
        if let Some(name) = name {
            entity.name = WireValue::from(name);
        }
        orchestrator.select(entity).await.settled().await;
        let view = orchestrator.view().await;

        println!("Entity {}", id);

        println!();
        println!("Metadata");
        match &view.metadata {
            Slot::Ready(map) if map.is_empty() => println!("  (none)"),
            Slot::Ready(map) => {
                for (key, value) in map.iter() {
                    println!("  {}: {}", key, value.decode(header).as_str());
                }
            }
            other => print_pending(other),
        }

        println!();
        println!("Relations");
        match &view.relations {
            Slot::Ready(relations) if relations.is_empty() => println!("  (none)"),
            Slot::Ready(relations) => {
                for row in relations.iter().map(|r| RelationRow::new(r, header)) {
                    println!(
                        "  {:<30} {:<30} {:<12} {}",
                        row.name, row.kind, row.created, row.status
                    );
                }
            }
            other => print_pending(other),
        }

        println!();
        println!("Categories");
        match &view.categories {
            Slot::Ready(categories) if categories.rows.is_empty() => println!("  (none)"),
            Slot::Ready(categories) => {
                for row in &categories.rows {
                    let end = row.end_time.as_deref().unwrap_or("present");
                    println!(
                        "  {}{} ({} to {})",
                        "  ".repeat(row.depth),
                        row.name,
                        row.start_time,
                        end
                    );
                }
            }
            other => print_pending(other),
        }

        Ok(())
    }
}

fn print_pending<T>(slot: &Slot<T>) {
    match slot.error() {
        Some(SlotError { kind, message }) => println!("  error ({:?}): {}", kind, message),
        None => println!("  {:?}", slot.status()),
    }
}
