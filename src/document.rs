//! Dotted-path access on untyped JSON documents.
//!
//! Payroll documents stay as `serde_json::Value` trees; the preflight steps
//! only ever touch them through these helpers so path semantics live in one
//! place.
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("empty field path")]
    EmptyPath,

    #[error("cannot index array at {path} with segment {segment:?}")]
    BadIndex { path: String, segment: String },
}

/// Look up a dotted path, descending objects by key and arrays by index.
pub fn get_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Assign `value` at a dotted path.
///
/// Missing intermediate segments become empty objects, and an intermediate
/// scalar is replaced by an empty object. Arrays are descended by numeric
/// index only.
pub fn set_path(doc: &mut Value, path: &str, value: Value) -> Result<(), DocumentError> {
    if path.is_empty() {
        return Err(DocumentError::EmptyPath);
    }
    let segments: Vec<&str> = path.split('.').collect();
    let (last, parents) = segments.split_last().ok_or(DocumentError::EmptyPath)?;

    if !doc.is_object() && !doc.is_array() {
        *doc = Value::Object(Map::new());
    }
    let mut current = doc;
    for (depth, segment) in parents.iter().enumerate() {
        let slot = child_slot(current, segment, &segments[..=depth])?;
        if !slot.is_object() && !slot.is_array() {
            *slot = Value::Object(Map::new());
        }
        current = slot;
    }
    let slot = child_slot(current, last, &segments)?;
    *slot = value;
    Ok(())
}

/// Return a mutable slot for `segment`, inserting `null` under a missing
/// object key.
fn child_slot<'a>(
    parent: &'a mut Value,
    segment: &str,
    walked: &[&str],
) -> Result<&'a mut Value, DocumentError> {
    match parent {
        Value::Object(map) => Ok(map.entry(segment.to_string()).or_insert(Value::Null)),
        Value::Array(items) => {
            let bad_index = || DocumentError::BadIndex {
                path: walked.join("."),
                segment: segment.to_string(),
            };
            let index = segment.parse::<usize>().map_err(|_| bad_index())?;
            items.get_mut(index).ok_or_else(bad_index)
        }
        // set_path replaces scalars before descending
        _ => unreachable!("child_slot called on a scalar"),
    }
}

/// Make sure `root[key]` exists, inserting an empty object when absent.
///
/// Existing values are left alone even when they are not objects.
pub fn ensure_object(root: &mut Value, key: &str) {
    if let Value::Object(map) = root {
        map.entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

/// True when a field counts as unset: absent, null, false, zero, or empty.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(flag)) => !flag,
        Some(Value::Number(number)) => number.as_f64() == Some(0.0),
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
    }
}

/// Render a value the way it should read in a warning or file name.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_path_walks_objects_and_arrays() {
        let doc = json!({"a": {"b": [{"c": 1}, {"c": 2}]}});
        assert_eq!(get_path(&doc, "a.b.1.c"), Some(&json!(2)));
        assert_eq!(get_path(&doc, "a.b.x"), None);
        assert_eq!(get_path(&doc, "a.missing"), None);
    }

    #[test]
    fn set_path_creates_missing_parents() {
        let mut doc = json!({});
        set_path(&mut doc, "tables.cotization_year", json!(2025)).expect("set path");
        assert_eq!(doc, json!({"tables": {"cotization_year": 2025}}));
    }

    #[test]
    fn set_path_overwrites_scalar_parent() {
        let mut doc = json!({"company": "ACME"});
        set_path(&mut doc, "company.atep_tariff_pct", json!(1.5)).expect("set path");
        assert_eq!(doc, json!({"company": {"atep_tariff_pct": 1.5}}));
    }

    #[test]
    fn set_path_keeps_sibling_keys() {
        let mut doc = json!({"worker": {"name": "Ana"}});
        set_path(&mut doc, "worker.nif", json!("NO-INFORMADO")).expect("set path");
        assert_eq!(doc, json!({"worker": {"name": "Ana", "nif": "NO-INFORMADO"}}));
    }

    #[test]
    fn set_path_descends_arrays_by_index() {
        let mut doc = json!({"items": [{"amount": 1}]});
        set_path(&mut doc, "items.0.amount", json!(5)).expect("set path");
        assert_eq!(doc, json!({"items": [{"amount": 5}]}));

        let err = set_path(&mut doc, "items.name", json!(1)).expect_err("non-numeric index");
        assert_eq!(
            err,
            DocumentError::BadIndex {
                path: "items.name".to_string(),
                segment: "name".to_string(),
            }
        );
    }

    #[test]
    fn set_path_rejects_empty_path() {
        let mut doc = json!({});
        assert_eq!(set_path(&mut doc, "", json!(1)), Err(DocumentError::EmptyPath));
    }

    #[test]
    fn blank_matches_unset_values() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&json!(null))));
        assert!(is_blank(Some(&json!(""))));
        assert!(is_blank(Some(&json!(0))));
        assert!(is_blank(Some(&json!(0.0))));
        assert!(is_blank(Some(&json!([]))));
        assert!(!is_blank(Some(&json!("C01"))));
        assert!(!is_blank(Some(&json!(2025))));
    }

    #[test]
    fn ensure_object_only_fills_absent_keys() {
        let mut doc = json!({"company": "ACME"});
        ensure_object(&mut doc, "company");
        ensure_object(&mut doc, "tables");
        assert_eq!(doc, json!({"company": "ACME", "tables": {}}));
    }
}
