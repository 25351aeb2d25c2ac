//! Field write operations.
//!
//! A mutation is a list of `(field, WriteOp)` pairs applied atomically to one
//! document. `Set` overwrites the whole field (last-writer-wins under
//! conflict); the array and increment primitives are commutative and safe
//! under concurrent application from multiple clients.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// One field mutation within a document write.
pub type FieldWrite = (String, WriteOp);

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Overwrite the field. Last-writer-wins under concurrent writes.
    Set(Value),
    /// Add an element to an array field unless an equal element is already
    /// present. Missing or non-array fields are treated as empty arrays.
    ArrayUnion(Value),
    /// Remove all elements equal to the value from an array field.
    ArrayRemove(Value),
    /// Apply a numeric delta server-side. Missing or non-numeric fields are
    /// treated as zero.
    Increment(i64),
    /// Resolve to the store's commit time.
    ServerTimestamp,
}

impl WriteOp {
    /// Compute the new field value given the current one.
    pub fn apply(&self, current: Option<&Value>, now: DateTime<Utc>) -> Value {
        match self {
            WriteOp::Set(value) => value.clone(),
            WriteOp::ArrayUnion(element) => {
                let mut items = as_array(current);
                if !items.contains(element) {
                    items.push(element.clone());
                }
                Value::Array(items)
            }
            WriteOp::ArrayRemove(element) => {
                let mut items = as_array(current);
                items.retain(|item| item != element);
                Value::Array(items)
            }
            WriteOp::Increment(delta) => {
                let base = current.and_then(Value::as_i64).unwrap_or(0);
                Value::from(base + delta)
            }
            WriteOp::ServerTimestamp => {
                Value::String(now.to_rfc3339_opts(SecondsFormat::Micros, true))
            }
        }
    }
}

fn as_array(current: Option<&Value>) -> Vec<Value> {
    match current {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// `field = value`
pub fn set(field: &str, value: Value) -> FieldWrite {
    (field.to_string(), WriteOp::Set(value))
}

/// Add `value` to the array at `field` if not already present.
pub fn array_union(field: &str, value: Value) -> FieldWrite {
    (field.to_string(), WriteOp::ArrayUnion(value))
}

/// Remove `value` from the array at `field`.
pub fn array_remove(field: &str, value: Value) -> FieldWrite {
    (field.to_string(), WriteOp::ArrayRemove(value))
}

/// Apply a commutative numeric delta to `field`.
pub fn increment(field: &str, delta: i64) -> FieldWrite {
    (field.to_string(), WriteOp::Increment(delta))
}

/// Resolve `field` to the commit time.
pub fn server_timestamp(field: &str) -> FieldWrite {
    (field.to_string(), WriteOp::ServerTimestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_union_is_idempotent() {
        let now = Utc::now();
        let op = WriteOp::ArrayUnion(json!("u1"));
        let once = op.apply(None, now);
        let twice = op.apply(Some(&once), now);
        assert_eq!(once, json!(["u1"]));
        assert_eq!(twice, json!(["u1"]));
    }

    #[test]
    fn array_remove_clears_all_occurrences() {
        let now = Utc::now();
        let current = json!(["u1", "u2", "u1"]);
        let op = WriteOp::ArrayRemove(json!("u1"));
        assert_eq!(op.apply(Some(&current), now), json!(["u2"]));
    }

    #[test]
    fn array_remove_on_missing_field_yields_empty() {
        let op = WriteOp::ArrayRemove(json!("u1"));
        assert_eq!(op.apply(None, Utc::now()), json!([]));
    }

    #[test]
    fn increment_treats_missing_as_zero() {
        let op = WriteOp::Increment(3);
        assert_eq!(op.apply(None, Utc::now()), json!(3));
        assert_eq!(op.apply(Some(&json!(5)), Utc::now()), json!(8));
        assert_eq!(op.apply(Some(&json!("oops")), Utc::now()), json!(3));
    }

    #[test]
    fn server_timestamp_resolves_to_commit_time() {
        let now = Utc::now();
        let value = WriteOp::ServerTimestamp.apply(None, now);
        let parsed: chrono::DateTime<Utc> =
            serde_json::from_value(value).expect("rfc3339 timestamp");
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn union_over_distinct_elements_commutes() {
        let now = Utc::now();
        let a = WriteOp::ArrayUnion(json!("u1"));
        let b = WriteOp::ArrayUnion(json!("u2"));

        let ab = b.apply(Some(&a.apply(None, now)), now);
        let ba = a.apply(Some(&b.apply(None, now)), now);

        let mut ab: Vec<String> = serde_json::from_value(ab).unwrap();
        let mut ba: Vec<String> = serde_json::from_value(ba).unwrap();
        ab.sort();
        ba.sort();
        assert_eq!(ab, ba);
    }
}
