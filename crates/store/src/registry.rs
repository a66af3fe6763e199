//! One store per resource type, wired from configuration.

use motorpool_core::Config;
use motorpool_domain::{Car, Entity, Owner};
use std::sync::Arc;
use tracing::info;

use crate::api::ResourceApi;
use crate::error::StoreResult;
use crate::memory::InMemoryBackend;
use crate::reconcile::Reconcile;
use crate::store::EntityStore;
use crate::transport::{HttpTransport, Transport};

/// The stores the application works with, sharing one transport.
#[derive(Clone)]
pub struct EntityStores {
    /// Cars
    pub car: Arc<EntityStore<Car>>,
    /// Owners
    pub owner: Arc<EntityStore<Owner>>,
}

fn build<E: Entity>(transport: &Arc<dyn Transport>, config: &Config) -> Arc<EntityStore<E>> {
    let api = ResourceApi::new(Arc::clone(transport), config.api.cache_buster);
    Arc::new(EntityStore::with_reconcile(
        api,
        Reconcile::from(config.store.reconcile),
    ))
}

impl EntityStores {
    /// Stores on top of an arbitrary transport.
    pub fn new(transport: Arc<dyn Transport>, config: &Config) -> Self {
        Self {
            car: build(&transport, config),
            owner: build(&transport, config),
        }
    }

    /// Stores talking HTTP to `config.api.base_url`.
    pub fn from_config(config: &Config) -> StoreResult<Self> {
        let transport = HttpTransport::new(&config.api)?;
        info!(
            base_url = %config.api.base_url,
            reconcile = ?config.store.reconcile,
            "Entity stores configured"
        );
        Ok(Self::new(Arc::new(transport), config))
    }

    /// Stores served by a process-local backend.
    pub fn in_memory(backend: Arc<InMemoryBackend>, config: &Config) -> Self {
        Self::new(backend, config)
    }
}
