//! Command execution against the entity stores.

use anyhow::{bail, Context};
use clap::{Subcommand, ValueEnum};
use motorpool_domain::{coerce_numeric, Car, Entity, EntityId, FieldKind, FormValues, Owner, SortSpec};
use motorpool_store::{EntityStore, EntityStores, InMemoryBackend};
use motorpool_views::{EditView, RelationSource};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Resource {
    #[value(alias = "car")]
    Cars,
    #[value(alias = "owner")]
    Owners,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// List every record, optionally sorted (`price,desc`)
    List {
        resource: Resource,
        #[arg(long)]
        sort: Option<SortSpec>,
    },
    /// Show one record
    Get { resource: Resource, id: EntityId },
    /// Create a record from `--set field=value` pairs
    Create {
        resource: Resource,
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// Replace a record; unspecified fields keep their current value
    Update {
        resource: Resource,
        id: EntityId,
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// Merge the given fields into a record
    Patch {
        resource: Resource,
        id: EntityId,
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// Delete a record
    Delete { resource: Resource, id: EntityId },
}

impl Command {
    pub fn resource(&self) -> Resource {
        match self {
            Command::List { resource, .. }
            | Command::Get { resource, .. }
            | Command::Create { resource, .. }
            | Command::Update { resource, .. }
            | Command::Patch { resource, .. }
            | Command::Delete { resource, .. } => *resource,
        }
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Backend pre-populated with a few owners and cars.
pub fn demo_backend() -> Arc<InMemoryBackend> {
    let backend = Arc::new(InMemoryBackend::new());
    let ada = backend.seed("owners", json!({ "name": "Ada", "gender": "F" }));
    let bob = backend.seed("owners", json!({ "name": "Bob", "gender": "M" }));
    backend.seed(
        "cars",
        json!({ "name": "Civic", "model": "EX", "price": 20000.0, "owner": { "id": ada.value() } }),
    );
    backend.seed(
        "cars",
        json!({ "name": "Accord", "model": "LX", "price": 18500.0, "owner": { "id": bob.value() } }),
    );
    backend.seed("cars", json!({ "name": "Fit", "model": "S", "price": 15000.0 }));
    backend
}

pub async fn run(stores: &EntityStores, command: Command) -> anyhow::Result<Value> {
    match command.resource() {
        Resource::Cars => execute(stores, &stores.car, command).await,
        Resource::Owners => execute(stores, &stores.owner, command).await,
    }
}

async fn execute<E: Entity>(
    stores: &EntityStores,
    store: &Arc<EntityStore<E>>,
    command: Command,
) -> anyhow::Result<Value> {
    match command {
        Command::List { sort, .. } => to_json(&store.list(sort).await?),
        Command::Get { id, .. } => to_json(&store.get(id).await?),
        Command::Create { set, .. } => {
            check_fields::<E>(&set)?;
            let mut form = edit_view(stores, store);
            form.mount(None).await?;
            let values: FormValues = set.into_iter().collect();
            let saved = form.submit(&values).await?;
            info!(resource = E::RESOURCE, id = ?saved.id().map(|id| id.value()), "Created");
            to_json(&saved)
        }
        Command::Update { id, set, .. } => {
            check_fields::<E>(&set)?;
            let mut form = edit_view(stores, store);
            form.mount(Some(id.to_string().as_str())).await?;
            let mut values = form.default_values();
            values.extend(set);
            to_json(&form.submit(&values).await?)
        }
        Command::Patch { id, set, .. } => {
            let entity = patch_entity::<E>(id, set)?;
            to_json(&store.partial_update(&entity).await?)
        }
        Command::Delete { id, .. } => {
            store.delete(id).await?;
            Ok(json!({ "deleted": id.value(), "resource": E::RESOURCE }))
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<Value> {
    serde_json::to_value(value).context("failed to encode output")
}

fn check_fields<E: Entity>(set: &[(String, String)]) -> anyhow::Result<()> {
    for (key, _) in set {
        match E::field(key) {
            None => bail!("unknown {} field: {key}", E::NAME),
            Some(field) if field.read_only => bail!("{} field {key} is read-only", E::NAME),
            Some(_) => {}
        }
    }
    Ok(())
}

fn edit_view<E: Entity>(stores: &EntityStores, store: &Arc<EntityStore<E>>) -> EditView<E> {
    let mut view = EditView::new(Arc::clone(store));
    for field in E::FIELDS {
        let FieldKind::Relation { resource } = field.kind else {
            continue;
        };
        let source: Option<Arc<dyn RelationSource>> = match resource {
            r if r == Owner::RESOURCE => Some(stores.owner.clone()),
            r if r == Car::RESOURCE => Some(stores.car.clone()),
            _ => None,
        };
        if let Some(source) = source {
            view = view.with_relation(source);
        }
    }
    view
}

/// Sparse entity carrying only the id and the given fields.
fn patch_entity<E: Entity>(id: EntityId, set: Vec<(String, String)>) -> anyhow::Result<E> {
    check_fields::<E>(&set)?;

    let mut map = Map::new();
    map.insert("id".to_string(), json!(id.value()));
    for (key, raw) in set {
        let value = match E::field(&key).map(|f| f.kind) {
            Some(FieldKind::Relation { .. }) if raw.trim().is_empty() => Value::Null,
            Some(FieldKind::Relation { .. }) => json!({ "id": raw.parse::<EntityId>()?.value() }),
            _ => Value::String(raw),
        };
        map.insert(key, value);
    }
    coerce_numeric(&mut map, &E::numeric_fields())?;

    serde_json::from_value(Value::Object(map)).context("failed to build patch")
}
