//! Create/edit form.
//!
//! Submission runs, in order: required/numeric validation, merge of the form
//! values over the current entity, numeric coercion, relation resolution
//! against the loaded referenced collections, then `create` or `update`.
//! A failed validation never reaches the store.

use async_trait::async_trait;
use motorpool_domain::{
    coerce_numeric, form_defaults, validate_form, DomainError, Entity, EntityId, FieldKind, FormValues,
};
use motorpool_store::{EntityStore, StoreResult};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{ViewError, ViewResult};
use crate::navigation::NavigationGuard;
use crate::routes::Route;

/// A referenced collection the form offers as select options.
#[async_trait]
pub trait RelationSource: Send + Sync {
    /// Plural path of the referenced resource.
    fn resource(&self) -> &'static str;

    /// Fetch the collection.
    async fn load(&self) -> StoreResult<()>;

    /// Loaded records as JSON objects.
    fn options(&self) -> Vec<Value>;
}

#[async_trait]
impl<E: Entity> RelationSource for EntityStore<E> {
    fn resource(&self) -> &'static str {
        E::RESOURCE
    }

    async fn load(&self) -> StoreResult<()> {
        self.list(None).await.map(|_| ())
    }

    fn options(&self) -> Vec<Value> {
        self.state()
            .entities
            .iter()
            .filter_map(|e| serde_json::to_value(e).ok())
            .collect()
    }
}

fn id_text(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub struct EditView<E: Entity> {
    store: Arc<EntityStore<E>>,
    relations: Vec<Arc<dyn RelationSource>>,
    navigation: NavigationGuard<E>,
    is_new: bool,
    /// Id requested by the last edit mount.
    mounted: Option<EntityId>,
}

impl<E: Entity> EditView<E> {
    pub fn new(store: Arc<EntityStore<E>>) -> Self {
        let navigation = NavigationGuard::new(store.subscribe());
        Self {
            store,
            relations: Vec::new(),
            navigation,
            is_new: true,
            mounted: None,
        }
    }

    /// Offer the records of another store for a relation field.
    pub fn with_relation(mut self, source: Arc<dyn RelationSource>) -> Self {
        self.relations.push(source);
        self
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// `None` creates: the store is reset. `Some(id)` edits: the entity is
    /// fetched. Referenced collections are loaded either way.
    ///
    /// A failed edit mount leaves the form unable to submit until the
    /// requested entity has been loaded.
    pub async fn mount(&mut self, id: Option<&str>) -> ViewResult<()> {
        self.navigation.rearm();
        let fetched = match id {
            None => {
                self.is_new = true;
                self.mounted = None;
                self.store.reset();
                Ok(())
            }
            Some(raw) => {
                self.is_new = false;
                self.mounted = None;
                let id: EntityId = raw.parse()?;
                self.mounted = Some(id);
                self.store.get(id).await.map(|_| ())
            }
        };

        for source in &self.relations {
            if let Err(err) = source.load().await {
                warn!(resource = source.resource(), error = %err, "Relation options not loaded");
            }
        }

        fetched.map_err(Into::into)
    }

    /// Initial form values: empty when creating, the current entity otherwise.
    pub fn default_values(&self) -> FormValues {
        if self.is_new {
            FormValues::new()
        } else {
            self.loaded_entity()
                .map(|entity| form_defaults(&entity))
                .unwrap_or_default()
        }
    }

    /// Identifiers offered for a relation field, in collection order.
    pub fn relation_options(&self, field: &str) -> Vec<String> {
        self.source_for(field)
            .map(|source| source.options().iter().filter_map(id_text).collect())
            .unwrap_or_default()
    }

    fn source_for(&self, field: &str) -> Option<&Arc<dyn RelationSource>> {
        let FieldKind::Relation { resource } = E::field(field)?.kind else {
            return None;
        };
        self.relations.iter().find(|s| s.resource() == resource)
    }

    /// Build the entity that would be submitted for these form values.
    pub fn prepare(&self, values: &FormValues) -> ViewResult<E> {
        validate_form(E::FIELDS, values)?;

        let base = if self.is_new {
            E::default()
        } else {
            self.loaded_entity()?
        };
        let mut map = match serde_json::to_value(&base).map_err(DomainError::from)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        for field in E::FIELDS.iter().filter(|f| !f.read_only) {
            if let Some(raw) = values.get(field.name) {
                map.insert(field.name.to_string(), Value::String(raw.clone()));
            }
        }

        coerce_numeric(&mut map, &E::numeric_fields())?;
        self.resolve_relations(&mut map, values);

        let entity = serde_json::from_value(Value::Object(map)).map_err(DomainError::from)?;
        Ok(entity)
    }

    /// The store's current entity, provided it is the one this form edits.
    fn loaded_entity(&self) -> ViewResult<E> {
        let entity = self.store.state().entity;
        match self.mounted {
            Some(id) if entity.id() == Some(id) => Ok(entity),
            Some(id) => Err(ViewError::Route(format!("{} {} is not loaded", E::NAME, id))),
            None => Err(ViewError::Route(format!("no {} loaded", E::NAME))),
        }
    }

    /// Replace each relation's form text with the loaded record whose id
    /// matches it as a string; no match leaves the relation unset.
    fn resolve_relations(&self, map: &mut Map<String, Value>, values: &FormValues) {
        for field in E::FIELDS {
            if !matches!(field.kind, FieldKind::Relation { .. }) {
                continue;
            }
            let wanted = values.get(field.name).map(|s| s.trim()).unwrap_or_default();
            let resolved = self.source_for(field.name).and_then(|source| {
                source
                    .options()
                    .into_iter()
                    .find(|option| !wanted.is_empty() && id_text(option).as_deref() == Some(wanted))
            });
            match resolved {
                Some(record) => {
                    map.insert(field.name.to_string(), record);
                }
                None => {
                    map.remove(field.name);
                }
            }
        }
    }

    /// Validate, coerce, resolve and dispatch `create` or `update`.
    ///
    /// Each dispatched save arms navigation again, so every successful save
    /// yields one route.
    pub async fn submit(&mut self, values: &FormValues) -> ViewResult<E> {
        let entity = self.prepare(values)?;
        self.navigation.rearm();
        debug!(resource = E::RESOURCE, is_new = self.is_new, "Submitting form");
        let saved = if self.is_new {
            self.store.create(&entity).await?
        } else {
            self.store.update(&entity).await?
        };
        Ok(saved)
    }

    /// Route to leave for once a save has succeeded; fires once per save.
    pub fn poll_navigation(&mut self) -> Option<Route> {
        self.navigation.poll()
    }

    pub fn updating(&self) -> bool {
        self.store.state().updating
    }

    pub fn error_message(&self) -> Option<String> {
        self.store.state().error_message
    }
}
