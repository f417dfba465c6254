//! JSON merge operations
//!
//! Every piece of durable state this tool touches — the host application's
//! global state file, per-vault plugin settings, enablement lists, hotkeys —
//! is an externally-owned JSON document. This module provides the one
//! discipline all writers follow: parse the whole document into a
//! `serde_json::Value` (with insertion order preserved), mutate only the
//! keys we own, and serialize the whole value back. Unknown keys survive by
//! construction; nothing is ever blind-overwritten.
//!
//! ## Features
//!
//! - Deep merging of JSON objects with recursive descent
//! - Order-preserving set union for id arrays
//! - Read-modify-write file helpers that tolerate a missing file

use std::fs;
use std::path::Path;

use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// Recursively merge source JSON value into target
///
/// Handles different JSON types appropriately:
/// - Objects: Recursively merge keys, with source values taking precedence
///   for conflicts; target keys absent from source survive verbatim
/// - Arrays and scalars: Replace target with source
///
/// # Arguments
///
/// * `target` - The target value to merge into (modified in place)
/// * `source` - The source value to merge from
pub fn deep_merge(target: &mut JsonValue, source: &JsonValue) {
    match (target, source) {
        (JsonValue::Object(target_map), JsonValue::Object(source_map)) => {
            for (key, source_value) in source_map {
                match target_map.get_mut(key) {
                    Some(target_value) => deep_merge(target_value, source_value),
                    None => {
                        target_map.insert(key.clone(), source_value.clone());
                    }
                }
            }
        }
        (target_value, source_value) => {
            *target_value = source_value.clone();
        }
    }
}

/// Append the values from `items` that are not already present in `array`.
///
/// Order-preserving set union: existing elements keep their positions, new
/// elements are appended in the order given. Used for plugin-enablement
/// lists, which other tools also edit.
pub fn union_push(array: &mut Vec<JsonValue>, items: &[JsonValue]) {
    for item in items {
        if !array.contains(item) {
            array.push(item.clone());
        }
    }
}

/// Read a JSON file, returning `default` when the file does not exist or
/// does not parse.
///
/// A malformed vault-local config is treated like a missing one: the caller
/// rebuilds the keys it owns and everything else starts fresh. An I/O error
/// on an existing file is surfaced, since silently defaulting would risk
/// overwriting content we merely failed to read.
pub fn load_json_or(path: &Path, default: JsonValue) -> Result<JsonValue> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content).unwrap_or(default)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(default),
        Err(e) => Err(Error::Merge {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
    }
}

/// Serialize `value` to `path`, creating parent directories as needed.
pub fn store_json(path: &Path, value: &JsonValue) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::Merge {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).map_err(|e| Error::Merge {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Read-modify-write a JSON file in one step.
///
/// Loads the document (or `default` if absent/malformed), applies `mutate`,
/// and writes the whole document back.
pub fn update_json_file<F>(path: &Path, default: JsonValue, mutate: F) -> Result<()>
where
    F: FnOnce(&mut JsonValue),
{
    let mut value = load_json_or(path, default)?;
    mutate(&mut value);
    store_json(path, &value)
}
