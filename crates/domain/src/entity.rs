//! Entity trait and identifier types shared by every resource.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Server-assigned identifier of a persisted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub i64);

impl EntityId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for EntityId {
    type Err = DomainError;

    /// Route parameters and form selects carry ids as strings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(EntityId)
            .map_err(|_| DomainError::InvalidId(s.to_string()))
    }
}

/// Weak reference to another entity: the identifier only.
///
/// Serializes as `{ "id": n }`. Any other fields the server echoes inside
/// the nested object are ignored on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub id: EntityId,
}

impl Relation {
    pub fn new(id: i64) -> Self {
        Self { id: EntityId(id) }
    }
}

/// Kind of an entity attribute as edited through a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    /// Reference to an entity of the named resource (plural path).
    Relation { resource: &'static str },
}

/// Static description of one entity attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Shown but never edited (the identifier).
    pub read_only: bool,
}

impl FieldSpec {
    pub const fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            required: false,
            read_only: false,
        }
    }

    pub const fn number(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Number,
            required: false,
            read_only: false,
        }
    }

    pub const fn relation(name: &'static str, label: &'static str, resource: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Relation { resource },
            required: false,
            read_only: false,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, FieldKind::Number)
    }
}

/// A REST resource record.
///
/// The `Default` value is the empty entity: every attribute unset.
pub trait Entity:
    Serialize + DeserializeOwned + Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static
{
    /// Singular name, used for routes and log fields.
    const NAME: &'static str;

    /// Plural path segment under `api/`.
    const RESOURCE: &'static str;

    /// Attribute metadata in display order.
    const FIELDS: &'static [FieldSpec];

    fn id(&self) -> Option<EntityId>;

    /// Attributes declared numeric; these are coerced before transmission.
    fn numeric_fields() -> Vec<&'static str> {
        Self::FIELDS
            .iter()
            .filter(|f| f.is_numeric())
            .map(|f| f.name)
            .collect()
    }

    fn field(name: &str) -> Option<&'static FieldSpec> {
        Self::FIELDS.iter().find(|f| f.name == name)
    }

    /// Whether this is the empty default value.
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
