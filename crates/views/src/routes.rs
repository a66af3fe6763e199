//! Screen routes.
//!
//! ```text
//! car               list
//! car/new           create form
//! car/:id           detail
//! car/:id/edit      edit form
//! car/:id/delete    delete dialog
//! ```

use motorpool_domain::{Entity, EntityId};
use std::fmt;
use std::str::FromStr;

use crate::error::ViewError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    List { entity: String },
    New { entity: String },
    Detail { entity: String, id: EntityId },
    Edit { entity: String, id: EntityId },
    Delete { entity: String, id: EntityId },
}

impl Route {
    /// List route of entity type `E`.
    pub fn list<E: Entity>() -> Self {
        Route::List {
            entity: E::NAME.to_string(),
        }
    }

    pub fn entity(&self) -> &str {
        match self {
            Route::List { entity }
            | Route::New { entity }
            | Route::Detail { entity, .. }
            | Route::Edit { entity, .. }
            | Route::Delete { entity, .. } => entity,
        }
    }

    pub fn id(&self) -> Option<EntityId> {
        match self {
            Route::Detail { id, .. } | Route::Edit { id, .. } | Route::Delete { id, .. } => Some(*id),
            Route::List { .. } | Route::New { .. } => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::List { entity } => write!(f, "/{entity}"),
            Route::New { entity } => write!(f, "/{entity}/new"),
            Route::Detail { entity, id } => write!(f, "/{entity}/{id}"),
            Route::Edit { entity, id } => write!(f, "/{entity}/{id}/edit"),
            Route::Delete { entity, id } => write!(f, "/{entity}/{id}/delete"),
        }
    }
}

impl FromStr for Route {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.trim().trim_matches('/').split('/').collect();
        let invalid = || ViewError::Route(s.to_string());

        let entity = match segments.first() {
            Some(e) if !e.is_empty() => e.to_string(),
            _ => return Err(invalid()),
        };

        match segments[1..] {
            [] => Ok(Route::List { entity }),
            ["new"] => Ok(Route::New { entity }),
            [id] => Ok(Route::Detail {
                entity,
                id: id.parse()?,
            }),
            [id, "edit"] => Ok(Route::Edit {
                entity,
                id: id.parse()?,
            }),
            [id, "delete"] => Ok(Route::Delete {
                entity,
                id: id.parse()?,
            }),
            _ => Err(invalid()),
        }
    }
}
