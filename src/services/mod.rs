//! Explorer services.
//!
//! Pure transforms (relation flattening, tree walking, metadata merging) sit
//! next to the stateful coordinators that drive the store: the detail
//! orchestrator and the entity pager. Coordinators take their store and
//! configuration from a [`Context`](crate::context::Context).

mod category_tree;
mod counts;
mod detail;
mod metadata;
mod pager;
mod relations;

#[cfg(test)]
pub(crate) mod testing;

pub use category_tree::{
    CategoryRow, CategoryTreeWalker, NodeRole, TreeError, DEFAULT_MAX_DEPTH, PALETTE_LEVELS,
};
pub use counts::{CountTile, CountsSummary};
pub use detail::{
    CategoryView, DetailView, EntityDetailOrchestrator, Selection, SelectionToken, Slot,
    SlotError, SlotErrorKind, SlotStatus,
};
pub use metadata::{validate_and_merge, validate_and_merge_with, MergeError};
pub use pager::{has_next, previous_offset, EntityPager, EntityRow, PageView};
pub use relations::{flatten, RelationRow};
