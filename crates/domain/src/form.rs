//! Form values, validation and numeric coercion.
//!
//! Form controls hand every value over as text. Before a create or update
//! is submitted the values are validated (required, numeric) and every
//! attribute declared numeric is coerced to a JSON number. Validation
//! failures block submission entirely.

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

use crate::entity::{Entity, FieldKind, FieldSpec};
use crate::error::{FieldError, ValidationErrors};

/// Raw form input keyed by attribute name.
pub type FormValues = BTreeMap<String, String>;

fn is_blank(raw: Option<&String>) -> bool {
    raw.map_or(true, |s| s.trim().is_empty())
}

/// Parse form text as a JSON number; integral input stays integral.
fn parse_number(raw: &str) -> Option<Number> {
    let raw = raw.trim();
    if let Ok(int) = raw.parse::<i64>() {
        return Some(Number::from(int));
    }
    raw.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Check required and numeric constraints for every editable field.
pub fn validate_form(fields: &[FieldSpec], values: &FormValues) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    for field in fields.iter().filter(|f| !f.read_only) {
        let raw = values.get(field.name);
        if is_blank(raw) {
            if field.required {
                errors.push(FieldError::required(field.name));
            }
            continue;
        }
        if field.is_numeric() && raw.and_then(|s| parse_number(s)).is_none() {
            errors.push(FieldError::not_a_number(field.name));
        }
    }

    errors.into_result()
}

/// Coerce the named numeric attributes of `map` in place.
///
/// Strings holding a number become numbers, blank strings become unset,
/// anything else non-numeric is reported.
pub fn coerce_numeric(map: &mut Map<String, Value>, numeric: &[&str]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    for name in numeric {
        let Some(value) = map.get_mut(*name) else {
            continue;
        };
        let coerced = match &*value {
            Value::Null | Value::Number(_) => continue,
            Value::String(raw) if raw.trim().is_empty() => Value::Null,
            Value::String(raw) => match parse_number(raw) {
                Some(number) => Value::Number(number),
                None => {
                    errors.push(FieldError::not_a_number(name));
                    continue;
                }
            },
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
                errors.push(FieldError::not_a_number(name));
                continue;
            }
        };
        *value = coerced;
    }

    errors.into_result()
}

/// Form defaults when editing an existing entity.
///
/// Relations are presented by their identifier, unset attributes are left out.
pub fn form_defaults<E: Entity>(entity: &E) -> FormValues {
    let mut values = FormValues::new();
    let Ok(Value::Object(map)) = serde_json::to_value(entity) else {
        return values;
    };

    for field in E::FIELDS {
        let Some(value) = map.get(field.name) else {
            continue;
        };
        let text = match (field.kind, value) {
            (_, Value::Null) => continue,
            (FieldKind::Relation { .. }, Value::Object(rel)) => match rel.get("id") {
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::String(s)) => s.clone(),
                _ => continue,
            },
            (_, Value::String(s)) => s.clone(),
            (_, other) => other.to_string(),
        };
        values.insert(field.name.to_string(), text);
    }

    values
}
