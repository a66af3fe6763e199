//! Reconciliation of the cached collection after a successful mutation.
//!
//! Post-condition of every successful create, update, partial update and
//! delete: the store's `entities` reflect the write without the caller
//! invalidating anything. [`Reconcile::Refetch`] meets it by re-issuing the
//! list fetch; [`Reconcile::LocalPatch`] by applying the server's answer to
//! the cached collection in place.

use motorpool_core::ReconcileMode;
use motorpool_domain::{Entity, EntityId};

/// Strategy used to restore list consistency after a write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Reconcile {
    /// Fetch the collection again (server order, no sort hint).
    #[default]
    Refetch,
    /// Patch the cached collection without a network round-trip.
    LocalPatch,
}

impl From<ReconcileMode> for Reconcile {
    fn from(mode: ReconcileMode) -> Self {
        match mode {
            ReconcileMode::Refetch => Reconcile::Refetch,
            ReconcileMode::LocalPatch => Reconcile::LocalPatch,
        }
    }
}

/// Replace the cached entity with the same id, or append a new one.
pub fn patch_saved<E: Entity>(entities: &mut Vec<E>, saved: &E) {
    let position = saved
        .id()
        .and_then(|id| entities.iter().position(|e| e.id() == Some(id)));
    match position {
        Some(index) => entities[index] = saved.clone(),
        None => entities.push(saved.clone()),
    }
}

/// Drop the cached entity with this id.
pub fn patch_deleted<E: Entity>(entities: &mut Vec<E>, id: EntityId) {
    entities.retain(|e| e.id() != Some(id));
}
