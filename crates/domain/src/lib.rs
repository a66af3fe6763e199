//! Domain module for Motorpool
//!
//! This crate contains the pure entity model with no I/O dependencies:
//! - Entity definitions (Car, Owner) and their field metadata
//! - Sort specifications and the local re-sort rule
//! - The clean-before-transmit serialization filter
//! - Form validation and numeric coercion

pub mod clean;
pub mod entity;
pub mod error;
pub mod form;
pub mod model;
pub mod sort;

pub use clean::{clean_entity, clean_value, is_unset};
pub use entity::{Entity, EntityId, FieldKind, FieldSpec, Relation};
pub use error::{DomainError, FieldError, Result, ValidationErrors};
pub use form::{coerce_numeric, form_defaults, validate_form, FormValues};
pub use model::{Car, Owner};
pub use sort::{compare_values, lookup_path, sort_entities, SortDirection, SortSpec};
