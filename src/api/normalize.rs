//! Reduces listing responses to a plain sequence of records.
//!
//! Listing endpoints answer either with a bare array or with an envelope
//! object holding the array under `entries`. An object without `entries` is
//! read as an empty listing; any other shape is an error.

use serde_json::{Map, Value};
use thiserror::Error;

/// One entry of a listing, keyed by the upstream field names.
pub type Record = Map<String, Value>;

pub const ENTRIES_FIELD: &str = "entries";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ShapeError(pub String);

pub fn records(value: Value) -> Result<Vec<Record>, ShapeError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove(ENTRIES_FIELD) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(ShapeError(format!(
                    "'{}' is {}, expected an array",
                    ENTRIES_FIELD,
                    kind(&other)
                )))
            }
            None => return Ok(Vec::new()),
        },
        other => {
            return Err(ShapeError(format!(
                "expected an array or an object, got {}",
                kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(ShapeError(format!(
                "entry {} is {}, expected an object",
                i,
                kind(&other)
            ))),
        })
        .collect()
}

/// A single detail object.
pub fn record(value: Value) -> Result<Record, ShapeError> {
    match value {
        Value::Object(record) => Ok(record),
        other => Err(ShapeError(format!("expected an object, got {}", kind(&other)))),
    }
}

/// A bare array of strings, e.g. a match-id listing.
pub fn string_list(value: Value) -> Result<Vec<String>, ShapeError> {
    let items = match value {
        Value::Array(items) => items,
        other => return Err(ShapeError(format!("expected an array, got {}", kind(&other)))),
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            other => Err(ShapeError(format!("expected a string, got {}", kind(&other)))),
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
