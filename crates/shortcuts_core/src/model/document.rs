//! Save document: the single JSON object holding settings, groups and tasks.
//!
//! # Invariants
//! - `settings`, `groups` and `tasks` are always present as JSON objects.
//! - Key order of every mapping is preserved across load/store.
//! - Unknown top-level keys survive a rewrite untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// In-memory image of the save file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveDocument {
    pub settings: Map<String, Value>,
    pub groups: Map<String, Value>,
    pub tasks: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reason a requested key order could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderError {
    /// Requested id is not a key of the mapping.
    Unknown(String),
    /// Requested id is listed more than once.
    Duplicate(String),
}

impl SaveDocument {
    /// Returns the empty document written on first use or after repair.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether `id` is already a group or task key.
    pub fn is_id_used(&self, id: &str) -> bool {
        self.groups.contains_key(id) || self.tasks.contains_key(id)
    }

    pub fn group_ids(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    pub fn task_ids(&self) -> Vec<String> {
        self.tasks.keys().cloned().collect()
    }
}

/// Rebuilds `map` with the keys of `new_order` first, in that order.
///
/// Keys missing from `new_order` follow in their previous relative order.
/// The map is left untouched when an error is returned.
pub fn reorder_map(
    map: &mut Map<String, Value>,
    new_order: &[String],
) -> Result<(), ReorderError> {
    let mut seen = HashSet::with_capacity(new_order.len());
    for key in new_order {
        if !map.contains_key(key) {
            return Err(ReorderError::Unknown(key.clone()));
        }
        if !seen.insert(key.as_str()) {
            return Err(ReorderError::Duplicate(key.clone()));
        }
    }

    let mut previous = std::mem::take(map);
    for key in new_order {
        if let Some(value) = previous.shift_remove(key) {
            map.insert(key.clone(), value);
        }
    }
    for (key, value) in previous {
        map.insert(key, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{reorder_map, ReorderError, SaveDocument};
    use serde_json::{json, Map, Value};

    fn keyed(keys: &[&str]) -> Map<String, Value> {
        keys.iter()
            .map(|key| (key.to_string(), json!({})))
            .collect()
    }

    fn keys(map: &Map<String, Value>) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[test]
    fn empty_document_serializes_to_three_keys() {
        let text = serde_json::to_string(&SaveDocument::empty()).unwrap();
        assert_eq!(text, r#"{"settings":{},"groups":{},"tasks":{}}"#);
    }

    #[test]
    fn missing_top_level_key_fails_to_decode() {
        let result = serde_json::from_value::<SaveDocument>(json!({
            "settings": {},
            "groups": {}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn unknown_top_level_keys_are_preserved() {
        let value = json!({ "settings": {}, "groups": {}, "tasks": {}, "version": 2 });
        let document: SaveDocument = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&document).unwrap(), value);
    }

    #[test]
    fn reorder_moves_listed_keys_first_and_keeps_the_rest() {
        let mut map = keyed(&["a", "b", "c", "d"]);
        reorder_map(&mut map, &["c".to_string(), "a".to_string()]).unwrap();
        assert_eq!(keys(&map), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn reorder_rejects_unknown_and_duplicate_keys() {
        let mut map = keyed(&["a", "b"]);
        assert_eq!(
            reorder_map(&mut map, &["z".to_string()]),
            Err(ReorderError::Unknown("z".to_string()))
        );
        assert_eq!(
            reorder_map(&mut map, &["b".to_string(), "b".to_string()]),
            Err(ReorderError::Duplicate("b".to_string()))
        );
        assert_eq!(keys(&map), vec!["a", "b"]);
    }
}
