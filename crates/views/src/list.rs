//! List screen: sortable table of every entity of one resource.

use motorpool_domain::{Entity, SortSpec};
use motorpool_store::{EntityStore, StoreResult};
use std::sync::Arc;
use tracing::debug;

pub struct ListView<E: Entity> {
    store: Arc<EntityStore<E>>,
    sort: SortSpec,
}

impl<E: Entity> ListView<E> {
    /// Sorted by `id` ascending until a header is chosen.
    pub fn new(store: Arc<EntityStore<E>>) -> Self {
        Self {
            store,
            sort: SortSpec::asc("id"),
        }
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    /// Initial fetch.
    pub async fn mount(&self) -> StoreResult<()> {
        self.refresh().await
    }

    /// Re-fetch with the current sort.
    pub async fn refresh(&self) -> StoreResult<()> {
        self.store.list(Some(self.sort.clone())).await.map(|_| ())
    }

    /// Header click: same field flips the direction, a new field sorts ascending.
    pub async fn sort_by(&mut self, field: &str) -> StoreResult<()> {
        self.sort = self.sort.toggled(field);
        debug!(resource = E::RESOURCE, sort = %self.sort, "Sort changed");
        self.refresh().await
    }

    pub fn rows(&self) -> Vec<E> {
        self.store.state().entities
    }

    pub fn is_loading(&self) -> bool {
        self.store.state().loading
    }

    pub fn error_message(&self) -> Option<String> {
        self.store.state().error_message
    }
}
