//! JSON reader.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single JSON object (one row)
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Nested objects are flattened into dot-path columns (`{"user":{"name":"Ada"}}` gives a
//! `user.name` column). Columns appear in the order their keys are first seen; a record that
//! lacks a key gets a null cell.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value as JsonValue};

use crate::error::{LoadError, LoadResult};
use crate::types::{Table, Value};

use super::columns::assemble_inferred;

/// Read a JSON file into an in-memory [`Table`].
pub fn read_json_from_path(path: impl AsRef<Path>) -> LoadResult<Table> {
    let text = fs::read_to_string(path)?;
    read_json_from_str(&text)
}

/// Read JSON from an in-memory string into a [`Table`].
pub fn read_json_from_str(input: &str) -> LoadResult<Table> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(LoadError::Malformed {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<JsonValue>(trimmed) {
        match v {
            JsonValue::Array(items) => read_json_values(&items),
            JsonValue::Object(_) => read_json_values(std::slice::from_ref(&v)),
            _ => Err(LoadError::Malformed {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            }),
        }
    } else {
        // Fall back to NDJSON.
        let mut values = Vec::new();
        for (i, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let v = serde_json::from_str::<JsonValue>(line).map_err(|e| LoadError::Malformed {
                message: format!("invalid ndjson at line {}: {}", i + 1, e),
            })?;
            values.push(v);
        }
        read_json_values(&values)
    }
}

fn read_json_values(values: &[JsonValue]) -> LoadResult<Table> {
    let mut names: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut records: Vec<Vec<(usize, Value)>> = Vec::with_capacity(values.len());

    for (idx0, v) in values.iter().enumerate() {
        let obj = v.as_object().ok_or_else(|| LoadError::Malformed {
            message: format!("row {} is not a json object", idx0 + 1),
        })?;

        let mut flat = Vec::new();
        flatten_object(obj, "", &mut flat);

        let cells = flat
            .into_iter()
            .map(|(path, cell)| {
                let slot = *positions.entry(path).or_insert_with_key(|path| {
                    names.push(path.clone());
                    names.len() - 1
                });
                (slot, cell)
            })
            .collect();
        records.push(cells);
    }

    let rows = records
        .into_iter()
        .map(|cells| {
            let mut row = vec![Value::Null; names.len()];
            for (slot, cell) in cells {
                row[slot] = cell;
            }
            row
        })
        .collect();

    Ok(assemble_inferred(names, rows))
}

fn flatten_object(obj: &Map<String, JsonValue>, prefix: &str, out: &mut Vec<(String, Value)>) {
    for (key, v) in obj {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match v {
            JsonValue::Object(inner) => flatten_object(inner, &path, out),
            other => out.push((path, convert_json_value(other))),
        }
    }
}

fn convert_json_value(v: &JsonValue) -> Value {
    match v {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int64(i)
            } else {
                // u64 beyond i64::MAX and real numbers.
                n.as_f64().map_or(Value::Null, Value::Float64)
            }
        }
        JsonValue::String(s) => Value::Utf8(s.clone()),
        JsonValue::Array(_) => Value::Utf8(v.to_string()),
        JsonValue::Object(_) => Value::Utf8(v.to_string()),
    }
}
