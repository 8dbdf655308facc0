//! Checked access into loosely-typed state.
//!
//! Steps never cast blindly: every lookup goes through one of these helpers and
//! turns a surprise into a [`SchemaMismatch`] carrying the path it looked at.

use serde_json::{Map, Value};
use vellum_types::{StatePath, ValueKind};

use crate::error::SchemaMismatch;

/// Look up a key that must be present.
pub fn require<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &StatePath,
) -> Result<&'a Value, SchemaMismatch> {
    map.get(key).ok_or_else(|| SchemaMismatch::MissingKey { path: path.clone() })
}

pub fn expect_object<'a>(
    value: &'a Value,
    path: &StatePath,
) -> Result<&'a Map<String, Value>, SchemaMismatch> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(mismatch(path, ValueKind::Object, other)),
    }
}

pub fn expect_array<'a>(value: &'a Value, path: &StatePath) -> Result<&'a [Value], SchemaMismatch> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(mismatch(path, ValueKind::Array, other)),
    }
}

/// Shallow copy of `record` without `fields`, keeping the remaining key order.
#[must_use]
pub fn without_fields(record: &Map<String, Value>, fields: &[&str]) -> Map<String, Value> {
    record
        .iter()
        .filter(|(key, _)| !fields.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn mismatch(path: &StatePath, expected: ValueKind, found: &Value) -> SchemaMismatch {
    SchemaMismatch::UnexpectedType {
        path: path.clone(),
        expected,
        found: ValueKind::of(found),
    }
}
