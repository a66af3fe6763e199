//! Sort specification and the local re-sort applied to fetched lists.
//!
//! A sort hint travels to the server as `sort=<field>,<asc|desc>`, but the
//! server is free to ignore it, so the fetched collection is re-sorted
//! locally by the same rule. No hint means the server order is kept as is.

use serde::Serialize;
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(DomainError::InvalidSort(format!("unknown direction: {other}"))),
        }
    }
}

/// `field,direction` pair. `field` may be a dotted path (`owner.id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Sort-header click: same field flips direction, a new field starts ascending.
    pub fn toggled(&self, field: &str) -> Self {
        if self.field == field {
            Self::new(field, self.direction.reversed())
        } else {
            Self::asc(field)
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.field, self.direction.as_str())
    }
}

impl FromStr for SortSpec {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(',') {
            Some((field, direction)) => (field.trim(), direction.parse()?),
            None => (s.trim(), SortDirection::Asc),
        };
        if field.is_empty() {
            return Err(DomainError::InvalidSort(format!("missing field in '{s}'")));
        }
        Ok(Self::new(field, direction))
    }
}

/// Resolve a dotted path inside a JSON value. Missing segments yield `None`.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.get(segment))
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Integers compare exactly; anything else goes through `f64`.
fn compare_numbers(x: &Number, y: &Number) -> Ordering {
    if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
        return x.cmp(&y);
    }
    let x = x.as_f64().unwrap_or(f64::NAN);
    let y = y.as_f64().unwrap_or(f64::NAN);
    x.total_cmp(&y)
}

/// Total order over attribute values.
///
/// Unset (`null`) sorts first, numbers compare numerically, strings
/// lexicographically, nested relations by their `id`. Values of different
/// kinds order by kind.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(l, r)| compare_values(l, r))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Object(x), Value::Object(y)) => compare_values(
            x.get("id").unwrap_or(&Value::Null),
            y.get("id").unwrap_or(&Value::Null),
        ),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Re-sort a fetched collection.
///
/// `None` is an identity pass-through. Otherwise the sort is stable, so
/// entities with equal keys keep the server's relative order.
pub fn sort_entities<E: Serialize>(entities: Vec<E>, sort: Option<&SortSpec>) -> Vec<E> {
    let Some(sort) = sort else {
        return entities;
    };

    let mut keyed: Vec<(Value, E)> = entities
        .into_iter()
        .map(|entity| {
            let key = serde_json::to_value(&entity)
                .ok()
                .and_then(|v| lookup_path(&v, &sort.field).cloned())
                .unwrap_or(Value::Null);
            (key, entity)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = compare_values(a, b);
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    keyed.into_iter().map(|(_, entity)| entity).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityId, Relation};
    use crate::model::Car;
    use proptest::prelude::*;
    use serde_json::json;

    fn car(id: i64, name: &str, price: f64, owner: Option<i64>) -> Car {
        Car {
            id: Some(EntityId(id)),
            name: Some(name.to_string()),
            model: Some("M".to_string()),
            price: Some(price),
            owner: owner.map(Relation::new),
        }
    }

    #[test]
    fn test_parse_and_display() {
        let spec: SortSpec = "price,desc".parse().unwrap();
        assert_eq!(spec, SortSpec::desc("price"));
        assert_eq!(spec.to_string(), "price,desc");
        assert_eq!("name".parse::<SortSpec>().unwrap(), SortSpec::asc("name"));
        assert!("price,sideways".parse::<SortSpec>().is_err());
        assert!(",asc".parse::<SortSpec>().is_err());
    }

    #[test]
    fn test_toggle_direction() {
        let spec = SortSpec::asc("id");
        assert_eq!(spec.toggled("id"), SortSpec::desc("id"));
        assert_eq!(spec.toggled("id").toggled("id"), SortSpec::asc("id"));
        assert_eq!(SortSpec::desc("id").toggled("name"), SortSpec::asc("name"));
    }

    #[test]
    fn test_no_sort_is_identity() {
        let cars = vec![car(3, "c", 1.0, None), car(1, "a", 2.0, None), car(2, "b", 3.0, None)];
        let out = sort_entities(cars.clone(), None);
        assert_eq!(out, cars);
    }

    #[test]
    fn test_sort_numeric_not_lexicographic() {
        let cars = vec![car(1, "a", 100.0, None), car(2, "b", 9.5, None), car(3, "c", 20.0, None)];
        let out = sort_entities(cars, Some(&SortSpec::asc("price")));
        let prices: Vec<f64> = out.iter().filter_map(|c| c.price).collect();
        assert_eq!(prices, vec![9.5, 20.0, 100.0]);
    }

    #[test]
    fn test_sort_desc_by_name() {
        let cars = vec![car(1, "alpha", 1.0, None), car(2, "gamma", 1.0, None), car(3, "beta", 1.0, None)];
        let out = sort_entities(cars, Some(&SortSpec::desc("name")));
        let ids: Vec<i64> = out.iter().filter_map(|c| c.id.map(|i| i.0)).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_by_relation_path_with_unset_first() {
        let cars = vec![car(1, "a", 1.0, Some(5)), car(2, "b", 1.0, None), car(3, "c", 1.0, Some(2))];
        let out = sort_entities(cars, Some(&SortSpec::asc("owner.id")));
        let ids: Vec<i64> = out.iter().filter_map(|c| c.id.map(|i| i.0)).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_equal_keys_keep_server_order() {
        let cars = vec![car(4, "x", 5.0, None), car(1, "y", 5.0, None), car(9, "z", 1.0, None)];
        let out = sort_entities(cars, Some(&SortSpec::asc("price")));
        let ids: Vec<i64> = out.iter().filter_map(|c| c.id.map(|i| i.0)).collect();
        assert_eq!(ids, vec![9, 4, 1]);
    }

    #[test]
    fn test_compare_mixed_kinds() {
        assert_eq!(compare_values(&Value::Null, &json!(0)), Ordering::Less);
        assert_eq!(compare_values(&json!(2), &json!("1")), Ordering::Less);
        assert_eq!(compare_values(&json!({"id": 1}), &json!({"id": 2})), Ordering::Less);
    }

    #[test]
    fn test_large_ids_compare_exactly() {
        let big = json!(9_007_199_254_740_993_i64);
        let below = json!(9_007_199_254_740_992_i64);
        assert_eq!(compare_values(&big, &below), Ordering::Greater);
        assert_eq!(compare_values(&json!({"id": big}), &json!({"id": below})), Ordering::Greater);
        assert_eq!(compare_values(&json!(u64::MAX), &json!(u64::MAX - 1)), Ordering::Greater);
        assert_eq!(compare_values(&json!(2), &json!(2.5)), Ordering::Less);
    }

    proptest! {
        #[test]
        fn prop_sorted_adjacent_pairs_ordered(
            prices in proptest::collection::vec(-1.0e6f64..1.0e6, 0..40),
            descending in any::<bool>(),
        ) {
            let cars: Vec<Car> = prices
                .iter()
                .enumerate()
                .map(|(i, p)| car(i as i64, "n", *p, None))
                .collect();
            let spec = if descending { SortSpec::desc("price") } else { SortSpec::asc("price") };
            let out = sort_entities(cars, Some(&spec));
            prop_assert_eq!(out.len(), prices.len());
            for pair in out.windows(2) {
                let (a, b) = (pair[0].price.unwrap(), pair[1].price.unwrap());
                if descending {
                    prop_assert!(a >= b);
                } else {
                    prop_assert!(a <= b);
                }
            }
        }
    }
}
