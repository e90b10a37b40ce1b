//! Persisted key-to-ids maps for views, kept current on every write.

use super::storage_key;
use super::view::ViewMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const VIEWS_DIR: &str = "views/";

pub fn view_path(view: &str) -> String {
    format!("{}{}.json", VIEWS_DIR, storage_key(view))
}

/// Index rows for one view, valid for the design revision it was built from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MaterializedView {
    pub view: String,
    pub design_rev: String,
    pub map: ViewMap,
    /// One id per emission, sorted within each key.
    #[serde(default)]
    pub rows: BTreeMap<String, Vec<String>>,
}

fn doc_id(doc: &Value) -> Option<&str> {
    doc.get("_id").and_then(Value::as_str)
}

impl MaterializedView {
    pub fn build(view: &str, design_rev: &str, map: &ViewMap, docs: &[Value]) -> Self {
        let mut materialized = Self {
            view: view.to_string(),
            design_rev: design_rev.to_string(),
            map: map.clone(),
            rows: BTreeMap::new(),
        };
        for doc in docs {
            if let Some(id) = doc_id(doc) {
                materialized.apply(id, None, Some(doc));
            }
        }
        materialized
    }

    pub fn is_current(&self, design_rev: &str, map: &ViewMap) -> bool {
        self.design_rev == design_rev && &self.map == map
    }

    /// Replaces the rows `old` emitted for `id` with the rows `new` emits.
    /// Returns whether anything changed.
    pub fn apply(&mut self, id: &str, old: Option<&Value>, new: Option<&Value>) -> bool {
        let old_keys = old.map(|doc| self.map.emit(doc)).unwrap_or_default();
        let new_keys = new.map(|doc| self.map.emit(doc)).unwrap_or_default();
        if old_keys == new_keys {
            return false;
        }

        for key in &old_keys {
            if let Some(ids) = self.rows.get_mut(key) {
                ids.retain(|existing| existing != id);
                if ids.is_empty() {
                    self.rows.remove(key);
                }
            }
        }
        for key in new_keys {
            let ids = self.rows.entry(key).or_default();
            ids.push(id.to_string());
            ids.sort();
        }
        true
    }

    pub fn lookup(&self, key: &str) -> &[String] {
        self.rows.get(key).map(Vec::as_slice).unwrap_or_default()
    }
}
