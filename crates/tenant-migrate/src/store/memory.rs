//! In-memory config store backed by a nested JSON document.

use serde_json::{Map, Value};
use std::sync::Mutex;

use crate::error::{Result, TenancyError};
use crate::store::ConfigStore;

/// In-memory [`ConfigStore`] implementation.
///
/// Stores everything in one nested JSON object; `set` materializes
/// intermediate objects along the dotted path, `get` walks them. Suitable
/// for tests and for hosts that keep runtime configuration in memory.
pub struct MemoryConfigStore {
    root: Mutex<Value>,
}

impl MemoryConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            root: Mutex::new(Value::Object(Map::new())),
        }
    }

    /// Create a store seeded with an initial document.
    pub fn with_root(root: Value) -> Self {
        Self {
            root: Mutex::new(root),
        }
    }
}

impl Default for MemoryConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, path: &str) -> Result<Option<Value>> {
        let root = self.root.lock().expect("config store lock poisoned");
        let mut current = &*root;
        for segment in path.split('.') {
            match current {
                Value::Object(map) => match map.get(segment) {
                    Some(child) => current = child,
                    None => return Ok(None),
                },
                _ => return Ok(None),
            }
        }
        Ok(Some(current.clone()))
    }

    fn set(&self, path: &str, value: Value) -> Result<()> {
        if path.is_empty() {
            return Err(TenancyError::Store("cannot set the empty path".into()));
        }

        let mut root = self.root.lock().expect("config store lock poisoned");
        let segments: Vec<&str> = path.split('.').collect();
        let (last, parents) = segments.split_last().expect("split on non-empty path");

        let mut current = &mut *root;
        for segment in parents {
            let map = ensure_object(current);
            current = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        ensure_object(current).insert(last.to_string(), value);
        Ok(())
    }
}

/// Coerce a value into an object, replacing any scalar in the way.
fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("just coerced to an object"),
    }
}
