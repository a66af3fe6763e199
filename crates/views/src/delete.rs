//! Delete confirmation dialog.

use motorpool_domain::{Entity, EntityId};
use motorpool_store::EntityStore;
use std::sync::Arc;

use crate::error::{ViewError, ViewResult};
use crate::navigation::NavigationGuard;
use crate::routes::Route;

pub struct DeleteDialog<E: Entity> {
    store: Arc<EntityStore<E>>,
    navigation: NavigationGuard<E>,
    mounted: Option<EntityId>,
}

impl<E: Entity> DeleteDialog<E> {
    pub fn new(store: Arc<EntityStore<E>>) -> Self {
        let navigation = NavigationGuard::new(store.subscribe());
        Self {
            store,
            navigation,
            mounted: None,
        }
    }

    /// Load the entity to show what is about to be deleted.
    pub async fn mount(&mut self, id: &str) -> ViewResult<()> {
        self.navigation.rearm();
        self.mounted = None;
        let id: EntityId = id.parse()?;
        self.mounted = Some(id);
        self.store.get(id).await?;
        Ok(())
    }

    pub fn entity(&self) -> E {
        self.store.state().entity
    }

    /// Delete the mounted entity once it has been loaded. Navigation is
    /// armed again for this delete.
    pub async fn confirm(&mut self) -> ViewResult<()> {
        let id = self
            .mounted
            .filter(|id| self.entity().id() == Some(*id))
            .ok_or_else(|| ViewError::Route(format!("no {} loaded", E::NAME)))?;
        self.navigation.rearm();
        self.store.delete(id).await?;
        Ok(())
    }

    /// Dismiss without deleting.
    pub fn cancel(&self) -> Route {
        Route::list::<E>()
    }

    /// Route to leave for once the delete has succeeded.
    pub fn poll_navigation(&mut self) -> Option<Route> {
        self.navigation.poll()
    }
}
