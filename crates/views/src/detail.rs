//! Detail screen: one entity as label/value rows.

use motorpool_domain::{Entity, EntityId, FieldKind};
use motorpool_store::EntityStore;
use serde_json::Value;
use std::sync::Arc;

use crate::error::ViewResult;
use crate::routes::Route;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

pub struct DetailView<E: Entity> {
    store: Arc<EntityStore<E>>,
}

fn display(kind: FieldKind, value: Option<&Value>) -> String {
    match (kind, value) {
        (_, None | Some(Value::Null)) => String::new(),
        (FieldKind::Relation { .. }, Some(rel)) => rel
            .get("id")
            .map(|id| match id {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default(),
        (_, Some(Value::String(s))) => s.clone(),
        (_, Some(other)) => other.to_string(),
    }
}

impl<E: Entity> DetailView<E> {
    pub fn new(store: Arc<EntityStore<E>>) -> Self {
        Self { store }
    }

    /// Fetch the entity named by the route parameter.
    pub async fn mount(&self, id: &str) -> ViewResult<()> {
        let id: EntityId = id.parse()?;
        self.store.get(id).await?;
        Ok(())
    }

    pub fn entity(&self) -> E {
        self.store.state().entity
    }

    /// One row per declared attribute; unset values render empty.
    pub fn rows(&self) -> Vec<DetailRow> {
        let value = serde_json::to_value(self.entity()).unwrap_or(Value::Null);
        E::FIELDS
            .iter()
            .map(|field| DetailRow {
                label: field.label,
                value: display(field.kind, value.get(field.name)),
            })
            .collect()
    }

    /// Edit button target, once an entity is loaded.
    pub fn edit_route(&self) -> Option<Route> {
        self.entity().id().map(|id| Route::Edit {
            entity: E::NAME.to_string(),
            id,
        })
    }

    pub fn back_route(&self) -> Route {
        Route::list::<E>()
    }
}
