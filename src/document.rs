use crate::pathname::{FOLDER_ID_PREFIX, TAG_ID_PREFIX};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};

pub type Timestamp = DateTime<Utc>;

pub fn now() -> Timestamp {
    Utc::now()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FolderData {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "String::is_empty")]
    pub rev: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl FolderData {
    pub fn pathname(&self) -> &str {
        self.id.strip_prefix(FOLDER_ID_PREFIX).unwrap_or(&self.id)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TagData {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "String::is_empty")]
    pub rev: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl TagData {
    pub fn name(&self) -> &str {
        self.id.strip_prefix(TAG_ID_PREFIX).unwrap_or(&self.id)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoteData {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "String::is_empty")]
    pub rev: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub folder_pathname: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub trashed: bool,
}

/// Editable folder fields. `None` leaves the stored value untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FolderProps {
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

impl FolderProps {
    pub fn with_data(data: Map<String, Value>) -> Self {
        Self { data: Some(data) }
    }

    pub(crate) fn apply(self, folder: &mut FolderData) {
        if let Some(data) = self.data {
            folder.data = data;
        }
    }
}

/// Editable tag fields. `None` leaves the stored value untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TagProps {
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

impl TagProps {
    pub fn with_data(data: Map<String, Value>) -> Self {
        Self { data: Some(data) }
    }

    pub(crate) fn apply(self, tag: &mut TagData) {
        if let Some(data) = self.data {
            tag.data = data;
        }
    }
}

/// Editable note fields, merged field by field onto a stored note.
///
/// `data` replaces the whole mapping when present; it is not deep-merged.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoteProps {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<BTreeSet<String>>,
    #[serde(default)]
    pub folder_pathname: Option<String>,
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

impl NoteProps {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn folder_pathname(mut self, pathname: impl Into<String>) -> Self {
        self.folder_pathname = Some(pathname.into());
        self
    }

    pub fn data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    pub(crate) fn apply(self, note: &mut NoteData) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(content) = self.content {
            note.content = content;
        }
        if let Some(tags) = self.tags {
            note.tags = tags;
        }
        if let Some(folder_pathname) = self.folder_pathname {
            note.folder_pathname = folder_pathname;
        }
        if let Some(data) = self.data {
            note.data = data;
        }
    }
}

/// Every folder, tag and note in the store, keyed by document id.
#[derive(Debug, Default)]
pub struct DocumentMap {
    pub notes: HashMap<String, NoteData>,
    pub folders: HashMap<String, FolderData>,
    pub tags: HashMap<String, TagData>,
}
