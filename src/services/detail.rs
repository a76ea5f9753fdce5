//! Coordination of the per-entity detail view.
//!
//! Selecting an entity starts three independent fetches: metadata, relations
//! and the category tree. Each lands in its own [`Slot`], so a failure in one
//! stream never touches the other two.
//!
//! Every selection bumps a [`SelectionToken`]. Fetches carry the token they
//! were started under and only write their slot while it is still current;
//! results for a superseded selection are dropped. In-flight requests are not
//! aborted, only ignored.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::context::{AppStore, Context};
use crate::error::AppError;
use crate::models::{CategoryNode, Entity, MetadataCandidate, MetadataMap, Relation};
use crate::services::category_tree::{CategoryRow, CategoryTreeWalker};
use crate::services::metadata::validate_and_merge_with;
use crate::services::relations::flatten;
use crate::wire::HeaderMode;

/// Monotonic id of the current selection.
pub type SelectionToken = u64;

/// Lifecycle of one detail stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

/// Origin of a slot error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotErrorKind {
    /// The request failed or the response was unusable.
    Network,
    /// The data arrived but violates the tree bounds.
    Structural,
}

/// Error shown in a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotError {
    pub kind: SlotErrorKind,
    pub message: String,
}

impl From<&AppError> for SlotError {
    fn from(err: &AppError) -> Self {
        let kind = match err {
            AppError::Structural(_) => SlotErrorKind::Structural,
            _ => SlotErrorKind::Network,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// State of one detail stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(SlotError),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Idle
    }
}

impl<T> Slot<T> {
    pub fn status(&self) -> SlotStatus {
        match self {
            Slot::Idle => SlotStatus::Idle,
            Slot::Loading => SlotStatus::Loading,
            Slot::Ready(_) => SlotStatus::Ready,
            Slot::Failed(_) => SlotStatus::Error,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Slot::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&SlotError> {
        match self {
            Slot::Failed(err) => Some(err),
            _ => None,
        }
    }

    fn settle(result: Result<T, AppError>) -> Self {
        match result {
            Ok(data) => Slot::Ready(data),
            Err(err) => Slot::Failed(SlotError::from(&err)),
        }
    }
}

/// The category tree as fetched, plus its display rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryView {
    pub roots: Vec<CategoryNode>,
    pub rows: Vec<CategoryRow>,
}

/// Snapshot of the detail view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailView {
    pub token: SelectionToken,
    /// The selected entity, `None` when closed.
    pub entity: Option<Entity>,
    pub metadata: Slot<MetadataMap>,
    pub relations: Slot<Vec<Relation>>,
    pub categories: Slot<CategoryView>,
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Metadata,
    Relations,
    Categories,
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stream::Metadata => write!(f, "metadata"),
            Stream::Relations => write!(f, "relations"),
            Stream::Categories => write!(f, "categories"),
        }
    }
}

/// Handle to the fetches started by one selection.
#[must_use = "dropping the handle detaches the fetches; await `settled` to wait for them"]
pub struct Selection {
    token: SelectionToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Selection {
    pub fn token(&self) -> SelectionToken {
        self.token
    }

    /// Waits until all three fetches have finished, applied or discarded.
    pub async fn settled(self) {
        for result in join_all(self.tasks).await {
            if let Err(e) = result {
                tracing::error!(token = self.token, error = %e, "detail fetch task failed");
            }
        }
    }
}

/// Resets the `saving` flag when a save ends, however it ends.
struct SavingGuard<'a>(&'a AtomicBool);

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives the detail view of the selected entity.
pub struct EntityDetailOrchestrator {
    store: AppStore,
    walker: CategoryTreeWalker,
    header: HeaderMode,
    state: Arc<RwLock<DetailView>>,
    saving: AtomicBool,
}

impl EntityDetailOrchestrator {
    pub fn new(ctx: &Context) -> Self {
        Self {
            store: Arc::clone(&ctx.store),
            walker: CategoryTreeWalker::new(ctx.config.tree.max_depth),
            header: ctx.config.decoder.header,
            state: Arc::default(),
            saving: AtomicBool::new(false),
        }
    }

    /// Selects `entity`, resets all slots to loading and starts the fetches.
    pub async fn select(&self, entity: Entity) -> Selection {
        let entity_id = entity.id.clone();
        let token = {
            let mut view = self.state.write().await;
            view.token += 1;
            view.entity = Some(entity);
            view.metadata = Slot::Loading;
            view.relations = Slot::Loading;
            view.categories = Slot::Loading;
            view.token
        };
        tracing::info!(entity_id = %entity_id, token, "selected entity");

        let metadata = {
            let store = Arc::clone(&self.store);
            let id = entity_id.clone();
            self.spawn_stream(
                token,
                Stream::Metadata,
                async move { store.fetch_metadata(&id).await },
                |view, slot| view.metadata = slot,
            )
        };

        let relations = {
            let store = Arc::clone(&self.store);
            let id = entity_id.clone();
            self.spawn_stream(
                token,
                Stream::Relations,
                async move { Ok::<_, AppError>(flatten(store.fetch_relations(&id).await?)) },
                |view, slot| view.relations = slot,
            )
        };

        let categories = {
            let store = Arc::clone(&self.store);
            let id = entity_id;
            let walker = self.walker;
            let header = self.header;
            self.spawn_stream(
                token,
                Stream::Categories,
                async move {
                    let roots = store.fetch_category_tree(&id).await?;
                    let rows = walker.rows(&roots, header)?;
                    Ok::<_, AppError>(CategoryView { roots, rows })
                },
                |view, slot| view.categories = slot,
            )
        };

        Selection {
            token,
            tasks: vec![metadata, relations, categories],
        }
    }

    /// Clears the selection and returns every slot to idle.
    ///
    /// Fetches still in flight are discarded when they finish.
    pub async fn close(&self) {
        let mut view = self.state.write().await;
        let token = view.token + 1;
        *view = DetailView {
            token,
            ..DetailView::default()
        };
        tracing::info!(token, "closed entity detail");
    }

    /// Snapshot of the current view.
    pub async fn view(&self) -> DetailView {
        self.state.read().await.clone()
    }

    /// Whether a metadata save is outstanding.
    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Validates `candidates` against the loaded metadata, saves the merged
    /// map, then reloads the metadata slot from the store.
    ///
    /// Returns the reloaded metadata. Only one save runs at a time; a second
    /// call while one is outstanding fails with [`AppError::SaveInProgress`].
    /// Validation errors are returned before anything is sent. If the save
    /// succeeds but the reload fails, the slot shows the reload error and so
    /// does the result.
    pub async fn save_metadata(
        &self,
        candidates: &[MetadataCandidate],
    ) -> Result<MetadataMap, AppError> {
        if self.saving.swap(true, Ordering::AcqRel) {
            return Err(AppError::SaveInProgress);
        }
        let _guard = SavingGuard(&self.saving);

        let (token, entity_id, existing) = {
            let view = self.state.read().await;
            let entity = view.entity.as_ref().ok_or(AppError::NoSelection)?;
            let existing = view.metadata.data().ok_or(AppError::MetadataNotLoaded)?;
            (view.token, entity.id.clone(), existing.clone())
        };

        let payload = validate_and_merge_with(&existing, candidates, self.header)?;
        tracing::info!(entity_id = %entity_id, entries = payload.len(), "saving metadata");
        self.store.save_metadata(&entity_id, &payload).await?;

        // Re-read rather than trusting the merged payload
        let refreshed = self.store.fetch_metadata(&entity_id).await;
        let slot = match &refreshed {
            Ok(map) => Slot::Ready(map.clone()),
            Err(e) => {
                tracing::warn!(entity_id = %entity_id, error = %e, "metadata reload failed");
                Slot::Failed(SlotError::from(e))
            }
        };
        apply(&self.state, token, Stream::Metadata, |view| view.metadata = slot).await;
        refreshed
    }

    fn spawn_stream<T, Fut>(
        &self,
        token: SelectionToken,
        stream: Stream,
        fetch: Fut,
        place: fn(&mut DetailView, Slot<T>),
    ) -> JoinHandle<()>
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        tracing::debug!(%stream, token, "fetching");
        tokio::spawn(async move {
            let result = fetch.await;
            if let Err(e) = &result {
                tracing::warn!(%stream, token, error = %e, "detail stream failed");
            }
            apply(&state, token, stream, |view| place(view, Slot::settle(result))).await;
        })
    }
}

/// Runs `update` only while `token` is the current selection.
async fn apply<F>(
    state: &RwLock<DetailView>,
    token: SelectionToken,
    stream: Stream,
    update: F,
) -> bool
where
    F: FnOnce(&mut DetailView),
{
    let mut view = state.write().await;
    if view.token != token {
        tracing::debug!(%stream, token, current = view.token, "discarding stale response");
        return false;
    }
    update(&mut view);
    true
}
