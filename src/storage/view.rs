//! Declarative view definitions evaluated by the store.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Selector that maps one document to zero or more index keys.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "emit", rename_all = "snake_case")]
pub enum ViewMap {
    /// Emit the string value of `field` once.
    Field { id_prefix: String, field: String },
    /// Emit every string element of the array `field`.
    Each { id_prefix: String, field: String },
}

impl ViewMap {
    pub fn emit(&self, doc: &Value) -> Vec<String> {
        let id = doc.get("_id").and_then(Value::as_str).unwrap_or_default();
        match self {
            ViewMap::Field { id_prefix, field } => {
                if !id.starts_with(id_prefix.as_str()) {
                    return Vec::new();
                }
                doc.get(field)
                    .and_then(Value::as_str)
                    .map(|key| vec![key.to_string()])
                    .unwrap_or_default()
            }
            ViewMap::Each { id_prefix, field } => {
                if !id.starts_with(id_prefix.as_str()) {
                    return Vec::new();
                }
                doc.get(field)
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default()
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ViewDefinition {
    pub map: ViewMap,
}

/// A `_design/<group>` document holding named views.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DesignDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "String::is_empty")]
    pub rev: String,
    #[serde(default)]
    pub views: BTreeMap<String, ViewDefinition>,
}

/// Splits `group/name` into the design document id and the view name.
pub fn resolve_view_name(view: &str) -> Option<(String, &str)> {
    let (group, name) = view.split_once('/')?;
    if group.is_empty() || name.is_empty() {
        return None;
    }
    Some((format!("_design/{}", group), name))
}
