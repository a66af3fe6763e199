//! Per-resource entity store.
//!
//! State lives in a `tokio::sync::watch` channel: each transition replaces
//! the whole [`StoreState`] atomically and wakes every subscriber, so view
//! consumers always observe a consistent snapshot.
//!
//! # Failure semantics
//!
//! API failures are caught here, recorded in `error_message` and returned
//! to the caller for inspection; no retry is attempted. Cached `entities`
//! and `entity` are never cleared by a failure.
//!
//! # Ordering
//!
//! There is no cancellation and no request sequencing. When two fetches
//! race, whichever response arrives last is applied last.

use motorpool_domain::{sort_entities, Entity, EntityId, SortSpec};
use std::future::Future;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ResourceApi;
use crate::error::{StoreError, StoreResult};
use crate::reconcile::{patch_deleted, patch_saved, Reconcile};
use crate::state::{Operation, StoreState};

/// State container plus operations for resource `E`.
pub struct EntityStore<E: Entity> {
    api: ResourceApi<E>,
    state: watch::Sender<StoreState<E>>,
    reconcile: Reconcile,
}

impl<E: Entity> EntityStore<E> {
    /// Store with empty defaults, refetching after mutations.
    pub fn new(api: ResourceApi<E>) -> Self {
        Self::with_reconcile(api, Reconcile::default())
    }

    /// Store with an explicit reconciliation strategy.
    pub fn with_reconcile(api: ResourceApi<E>, reconcile: Reconcile) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            api,
            state,
            reconcile,
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> StoreState<E> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every transition.
    pub fn subscribe(&self) -> watch::Receiver<StoreState<E>> {
        self.state.subscribe()
    }

    /// Reconciliation strategy in use.
    pub fn reconcile(&self) -> Reconcile {
        self.reconcile
    }

    /// Return to the empty defaults.
    pub fn reset(&self) {
        self.state.send_modify(StoreState::reset);
    }

    /// Fetch the collection, re-sorting locally when `sort` is given.
    pub async fn list(&self, sort: Option<SortSpec>) -> StoreResult<Vec<E>> {
        self.begin(Operation::FetchList);

        match self.api.list(sort.as_ref()).await {
            Ok(fetched) => {
                let entities = sort_entities(fetched, sort.as_ref());
                debug!(
                    resource = E::RESOURCE,
                    count = entities.len(),
                    sort = ?sort.as_ref().map(ToString::to_string),
                    "List fetched"
                );
                let snapshot = entities.clone();
                self.state.send_modify(|s| s.list_fulfilled(snapshot));
                Ok(entities)
            }
            Err(err) => Err(self.fail(Operation::FetchList, err)),
        }
    }

    /// Fetch one entity into `entity`.
    pub async fn get(&self, id: EntityId) -> StoreResult<E> {
        self.begin(Operation::FetchOne);

        match self.api.get(id).await {
            Ok(entity) => {
                debug!(resource = E::RESOURCE, id = %id, "Entity fetched");
                let snapshot = entity.clone();
                self.state.send_modify(|s| s.fetch_fulfilled(snapshot));
                Ok(entity)
            }
            Err(err) => Err(self.fail(Operation::FetchOne, err)),
        }
    }

    /// POST a new entity; `entity` becomes the server's representation.
    pub async fn create(&self, entity: &E) -> StoreResult<E> {
        self.save(Operation::Create, self.api.create(entity)).await
    }

    /// PUT an existing entity (full replace).
    pub async fn update(&self, entity: &E) -> StoreResult<E> {
        self.save(Operation::Update, self.api.update(entity)).await
    }

    /// PATCH an existing entity (merge write).
    pub async fn partial_update(&self, entity: &E) -> StoreResult<E> {
        self.save(Operation::PartialUpdate, self.api.partial_update(entity))
            .await
    }

    /// DELETE an entity; `entity` is cleared on success.
    pub async fn delete(&self, id: EntityId) -> StoreResult<()> {
        self.begin(Operation::Delete);

        if let Err(err) = self.api.delete(id).await {
            return Err(self.fail(Operation::Delete, err));
        }

        match self.reconcile {
            Reconcile::Refetch => {
                self.refresh().await;
                self.state.send_modify(StoreState::delete_fulfilled);
            }
            Reconcile::LocalPatch => self.state.send_modify(|s| {
                patch_deleted(&mut s.entities, id);
                s.delete_fulfilled();
            }),
        }

        info!(resource = E::RESOURCE, id = %id, op = %Operation::Delete, "Entity deleted");
        Ok(())
    }

    async fn save<F>(&self, op: Operation, request: F) -> StoreResult<E>
    where
        F: Future<Output = StoreResult<E>>,
    {
        self.begin(op);

        let saved = match request.await {
            Ok(saved) => saved,
            Err(err) => return Err(self.fail(op, err)),
        };

        match self.reconcile {
            Reconcile::Refetch => {
                self.refresh().await;
                let snapshot = saved.clone();
                self.state.send_modify(|s| s.save_fulfilled(snapshot));
            }
            Reconcile::LocalPatch => {
                let snapshot = saved.clone();
                self.state.send_modify(|s| {
                    patch_saved(&mut s.entities, &snapshot);
                    s.save_fulfilled(snapshot);
                });
            }
        }

        info!(
            resource = E::RESOURCE,
            id = ?saved.id().map(|id| id.value()),
            op = %op,
            "Entity saved"
        );
        Ok(saved)
    }

    /// Follow-up list fetch after a successful write. Its own failure is
    /// logged and recorded by `list` and does not undo the write.
    async fn refresh(&self) {
        let _ = self.list(None).await;
    }

    fn begin(&self, op: Operation) {
        debug!(resource = E::RESOURCE, op = %op, "Operation pending");
        self.state.send_modify(|s| s.pending(op));
    }

    fn fail(&self, op: Operation, err: StoreError) -> StoreError {
        let message = err.to_string();
        warn!(resource = E::RESOURCE, op = %op, error = %message, "Operation rejected");
        self.state.send_modify(|s| s.rejected(op, message));
        err
    }
}
