//! Domain model types

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, FieldSpec, Relation};

/// A car, optionally owned by an [`Owner`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Car {
    pub id: Option<EntityId>,
    pub name: Option<String>,
    pub model: Option<String>,
    pub price: Option<f64>,
    pub owner: Option<Relation>,
}

impl Entity for Car {
    const NAME: &'static str = "car";
    const RESOURCE: &'static str = "cars";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::number("id", "ID").read_only(),
        FieldSpec::text("name", "Name").required(),
        FieldSpec::text("model", "Model").required(),
        FieldSpec::number("price", "Price").required(),
        FieldSpec::relation("owner", "Owner", Owner::RESOURCE),
    ];

    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

/// A car owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Owner {
    pub id: Option<EntityId>,
    pub name: Option<String>,
    pub gender: Option<String>,
}

impl Entity for Owner {
    const NAME: &'static str = "owner";
    const RESOURCE: &'static str = "owners";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::number("id", "ID").read_only(),
        FieldSpec::text("name", "Name").required(),
        FieldSpec::text("gender", "Gender").required(),
    ];

    fn id(&self) -> Option<EntityId> {
        self.id
    }
}
