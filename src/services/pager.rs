//! Paged listing of the entities of one kind.

use serde::Serialize;
use tokio::sync::RwLock;

use crate::context::{AppStore, Context};
use crate::error::AppError;
use crate::models::{format_date, Entity, EntityPage, KindPair};
use crate::services::detail::{Slot, SlotError};
use crate::wire::HeaderMode;

/// Whether a page follows the one at `offset`.
pub fn has_next(offset: u64, limit: u32, total: u64) -> bool {
    offset.saturating_add(u64::from(limit)) < total
}

/// Offset of the page before `offset`, clamped at 0.
pub fn previous_offset(offset: u64, limit: u32) -> u64 {
    offset.saturating_sub(u64::from(limit))
}

/// An entity ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRow {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub created: String,
    /// Termination date, or `Active`.
    pub status: String,
}

impl EntityRow {
    pub fn new(entity: &Entity, kind: &KindPair, mode: HeaderMode) -> Self {
        Self {
            id: entity.id.clone(),
            name: entity.name.decode(mode).into_string(),
            kind: kind.to_string(),
            created: format_date(entity.created.as_deref()),
            status: match entity.terminated.as_deref() {
                Some(terminated) => format_date(Some(terminated)),
                None => "Active".to_string(),
            },
        }
    }
}

/// Snapshot of the pager.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageView {
    pub token: u64,
    pub offset: u64,
    pub limit: u32,
    /// Total from the last page that loaded.
    pub total: u64,
    pub rows: Slot<Vec<EntityRow>>,
}

impl PageView {
    pub fn has_next(&self) -> bool {
        has_next(self.offset, self.limit, self.total)
    }

    pub fn has_previous(&self) -> bool {
        self.offset > 0
    }
}

/// Loads pages of `GET /entities` for one kind.
///
/// Each load takes a fresh page token; a response for an older token is
/// dropped so a slow page never replaces a newer one.
pub struct EntityPager {
    store: AppStore,
    kind: KindPair,
    header: HeaderMode,
    state: RwLock<PageView>,
}

impl EntityPager {
    pub fn new(ctx: &Context, major: &str, minor: &str) -> Result<Self, AppError> {
        let (major, minor) = (major.trim(), minor.trim());
        if major.is_empty() || minor.is_empty() {
            return Err(AppError::MissingPageQuery);
        }
        Ok(Self {
            store: ctx.store.clone(),
            kind: KindPair {
                major: major.to_string(),
                minor: minor.to_string(),
            },
            header: ctx.config.decoder.header,
            state: RwLock::new(PageView {
                limit: ctx.config.browse.page_size,
                ..PageView::default()
            }),
        })
    }

    /// Overrides the configured page size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.state.get_mut().limit = limit.max(1);
        self
    }

    pub fn kind(&self) -> &KindPair {
        &self.kind
    }

    pub async fn view(&self) -> PageView {
        self.state.read().await.clone()
    }

    /// Loads the page starting at `offset`.
    ///
    /// Returns `Ok(false)` when a newer load superseded this one before it
    /// finished, whatever its outcome.
    pub async fn load(&self, offset: u64) -> Result<bool, AppError> {
        let (token, limit) = {
            let mut view = self.state.write().await;
            view.token += 1;
            view.offset = offset;
            view.rows = Slot::Loading;
            (view.token, view.limit)
        };
        tracing::debug!(kind = %self.kind, offset, limit, token, "fetching entity page");

        let result = self
            .store
            .fetch_entities(&self.kind.major, &self.kind.minor, offset, limit)
            .await;

        let mut view = self.state.write().await;
        if view.token != token {
            tracing::debug!(token, current = view.token, "discarding stale page");
            return Ok(false);
        }
        match result {
            Ok(page) => {
                view.total = page.total;
                view.rows = Slot::Ready(self.rows(&page));
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(kind = %self.kind, offset, error = %e, "entity page failed");
                view.rows = Slot::Failed(SlotError::from(&e));
                Err(e)
            }
        }
    }

    /// Loads the following page. `Ok(false)` when already on the last page.
    pub async fn next(&self) -> Result<bool, AppError> {
        let view = self.view().await;
        if !view.has_next() {
            return Ok(false);
        }
        self.load(view.offset.saturating_add(u64::from(view.limit))).await
    }

    /// Loads the preceding page. `Ok(false)` when already at offset 0.
    pub async fn previous(&self) -> Result<bool, AppError> {
        let view = self.view().await;
        if !view.has_previous() {
            return Ok(false);
        }
        self.load(previous_offset(view.offset, view.limit)).await
    }

    fn rows(&self, page: &EntityPage) -> Vec<EntityRow> {
        page.items
            .iter()
            .map(|entity| EntityRow::new(entity, &self.kind, self.header))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::WireValue;
    use crate::services::detail::SlotStatus;
    use crate::services::testing::{context, Call, MemoryStore};

    fn page(offset: u64, len: u64, total: u64) -> EntityPage {
        EntityPage {
            count: len,
            total,
            items: (offset..offset + len)
                .map(|i| Entity {
                    id: format!("e{}", i),
                    name: WireValue::encoded(&format!("Entity {}", i)),
                    ..Entity::default()
                })
                .collect(),
            ..EntityPage::default()
        }
    }

    fn ids(view: &PageView) -> Vec<String> {
        view.rows
            .data()
            .map(|rows| rows.iter().map(|r| r.id.clone()).collect())
            .unwrap_or_default()
    }

    fn store_with_pages() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.set_page(0, page(0, 2, 5));
        store.set_page(2, page(2, 2, 5));
        store.set_page(4, page(4, 1, 5));
        store
    }

    #[test]
    fn test_paging_arithmetic() {
        assert!(has_next(0, 50, 51));
        assert!(!has_next(0, 50, 50));
        assert!(!has_next(100, 50, 120));
        assert_eq!(previous_offset(30, 50), 0);
        assert_eq!(previous_offset(100, 50), 50);
        assert!(!has_next(u64::MAX, 50, u64::MAX));
        assert!(!has_next(u64::MAX - 10, 50, u64::MAX));
    }

    #[tokio::test]
    async fn test_offset_at_upper_bound_does_not_overflow() {
        let store = Arc::new(MemoryStore::new());
        store.set_page(u64::MAX, page(0, 0, u64::MAX));
        let pager = EntityPager::new(&context(store), "Person", "citizen").unwrap();

        assert!(pager.load(u64::MAX).await.unwrap());
        let view = pager.view().await;
        assert!(!view.has_next());
        assert!(!pager.next().await.unwrap());
        assert!(pager.previous().await.unwrap());
        assert_eq!(pager.view().await.offset, u64::MAX - 50);
    }

    #[test]
    fn test_major_and_minor_are_required() {
        let ctx = context(Arc::new(MemoryStore::new()));
        assert!(matches!(
            EntityPager::new(&ctx, "", "minister"),
            Err(AppError::MissingPageQuery)
        ));
        assert!(matches!(
            EntityPager::new(&ctx, "Person", "  "),
            Err(AppError::MissingPageQuery)
        ));
    }

    #[tokio::test]
    async fn test_walks_pages_forward_and_back() {
        let ctx = context(store_with_pages());
        let pager = EntityPager::new(&ctx, "Person", "citizen").unwrap().with_limit(2);

        assert!(pager.load(0).await.unwrap());
        let first = pager.view().await;
        assert_eq!(ids(&first), vec!["e0", "e1"]);
        assert!(first.has_next());
        assert!(!first.has_previous());
        assert!(!pager.previous().await.unwrap());

        assert!(pager.next().await.unwrap());
        assert!(pager.next().await.unwrap());
        let last = pager.view().await;
        assert_eq!(last.offset, 4);
        assert_eq!(ids(&last), vec!["e4"]);
        assert!(!pager.next().await.unwrap());

        assert!(pager.previous().await.unwrap());
        assert_eq!(pager.view().await.offset, 2);
    }

    #[tokio::test]
    async fn test_rows_are_decoded() {
        let ctx = context(store_with_pages());
        let pager = EntityPager::new(&ctx, "Person", "citizen").unwrap();
        pager.load(0).await.unwrap();

        let view = pager.view().await;
        let row = &view.rows.data().unwrap()[0];
        assert_eq!(row.name, "Entity 0");
        assert_eq!(row.kind, "Person - citizen");
        assert_eq!(row.created, "N/A");
        assert_eq!(row.status, "Active");
        assert_eq!(view.limit, 50);
    }

    #[tokio::test]
    async fn test_stale_page_is_discarded() {
        let store = store_with_pages();
        let slow_first = store.gate(Call::Entities, "0");
        let pager = Arc::new(
            EntityPager::new(&context(store), "Person", "citizen")
                .unwrap()
                .with_limit(2),
        );

        let first = {
            let pager = Arc::clone(&pager);
            tokio::spawn(async move { pager.load(0).await })
        };
        while pager.view().await.token == 0 {
            tokio::task::yield_now().await;
        }

        assert!(pager.load(2).await.unwrap());
        slow_first.notify_one();
        assert!(!first.await.unwrap().unwrap());

        let view = pager.view().await;
        assert_eq!(view.offset, 2);
        assert_eq!(ids(&view), vec!["e2", "e3"]);
    }

    #[tokio::test]
    async fn test_failed_page_sets_error() {
        let store = store_with_pages();
        store.fail(Call::Entities, "0");
        let pager = EntityPager::new(&context(store), "Person", "citizen").unwrap();

        let err = pager.load(0).await.unwrap_err();
        assert!(err.is_network());
        let view = pager.view().await;
        assert_eq!(view.rows.status(), SlotStatus::Error);
    }
}
