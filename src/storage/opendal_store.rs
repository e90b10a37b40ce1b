use super::materialized::{view_path, MaterializedView, VIEWS_DIR};
use super::view::{resolve_view_name, DesignDocument, ViewMap};
use super::{operator_from_uri, storage_key, StorageClient};
use crate::error::{StorageError, StorageResult};
use crate::pathname::DESIGN_ID_PREFIX;
use async_trait::async_trait;
use opendal::{EntryMode, ErrorKind, Operator};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::debug;

const DOCS_DIR: &str = "docs/";

/// Document store kept as one JSON file per document on an OpenDAL operator.
///
/// Writes are checked against the stored `_rev` under an async mutex, so the
/// revision check and the write are atomic within this process. Views are
/// materialized under `views/` on first query and updated on every write
/// after that.
pub struct OpendalStore {
    op: Operator,
    write_lock: Mutex<()>,
}

impl OpendalStore {
    pub fn new(op: Operator) -> Self {
        Self {
            op,
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_uri(uri: &str) -> anyhow::Result<Self> {
        Ok(Self::new(operator_from_uri(uri)?))
    }

    pub fn operator(&self) -> &Operator {
        &self.op
    }

    fn doc_path(id: &str) -> String {
        format!("{}{}.json", DOCS_DIR, storage_key(id))
    }

    async fn list_json(&self, dir: &str) -> StorageResult<Vec<String>> {
        let entries = match self.op.list(dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => return Err(err.into()),
        };

        let paths = entries
            .into_iter()
            .filter(|entry| {
                entry.metadata().mode() == EntryMode::FILE && entry.name().ends_with(".json")
            })
            .map(|entry| {
                if entry.path().starts_with(dir) {
                    entry.path().to_string()
                } else {
                    format!("{}{}", dir, entry.name())
                }
            })
            .collect();
        Ok(paths)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> StorageResult<T> {
        let bytes = self.op.read(path).await?;
        Ok(serde_json::from_slice(&bytes.to_vec())?)
    }

    async fn write_json<T: serde::Serialize>(&self, path: &str, value: &T) -> StorageResult<()> {
        self.op.write(path, serde_json::to_vec_pretty(value)?).await?;
        Ok(())
    }

    /// Carries one document change into every materialized view.
    /// Callers hold the write lock.
    async fn update_views(
        &self,
        id: &str,
        old: Option<&Value>,
        new: Option<&Value>,
    ) -> StorageResult<()> {
        if id.starts_with(DESIGN_ID_PREFIX) {
            return Ok(());
        }
        for path in self.list_json(VIEWS_DIR).await? {
            let mut view: MaterializedView = self.read_json(&path).await?;
            if view.apply(id, old, new) {
                self.write_json(&path, &view).await?;
            }
        }
        Ok(())
    }

    /// Loads the stored rows for `view`, rebuilding them with a full scan when
    /// missing or built from another design revision.
    async fn materialize(
        &self,
        view: &str,
        design_rev: &str,
        map: &ViewMap,
    ) -> StorageResult<MaterializedView> {
        let _guard = self.write_lock.lock().await;
        let path = view_path(view);
        if self.op.exists(&path).await? {
            let stored: MaterializedView = self.read_json(&path).await?;
            if stored.is_current(design_rev, map) {
                return Ok(stored);
            }
        }

        let docs = self.all_docs().await?;
        let materialized = MaterializedView::build(view, design_rev, map, &docs);
        self.write_json(&path, &materialized).await?;
        debug!(view, %design_rev, keys = materialized.rows.len(), "view materialized");
        Ok(materialized)
    }

    async fn read_doc(&self, id: &str) -> StorageResult<Option<Value>> {
        let path = Self::doc_path(id);
        if !self.op.exists(&path).await? {
            return Ok(None);
        }
        Ok(Some(self.read_json(&path).await?))
    }

    async fn write_doc(&self, id: &str, doc: &Value) -> StorageResult<()> {
        self.write_json(&Self::doc_path(id), doc).await
    }
}

fn revision_of(doc: &Value) -> Option<&str> {
    doc.get("_rev").and_then(Value::as_str)
}

fn revision_generation(rev: &str) -> u64 {
    rev.split_once('-')
        .and_then(|(generation, _)| generation.parse().ok())
        .unwrap_or(0)
}

/// `<generation>-<hash>`, where the hash covers the body without `_rev`.
fn next_revision(current: Option<&str>, body: &Value) -> StorageResult<String> {
    let generation = current.map(revision_generation).unwrap_or(0) + 1;
    let mut hasher = Sha256::new();
    hasher.update(generation.to_be_bytes());
    hasher.update(serde_json::to_vec(body)?);
    let digest = hex::encode(hasher.finalize());
    Ok(format!("{}-{}", generation, &digest[..32]))
}

#[async_trait]
impl StorageClient for OpendalStore {
    async fn get(&self, id: &str) -> StorageResult<Value> {
        self.read_doc(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn put(&self, mut doc: Value) -> StorageResult<String> {
        let obj = doc
            .as_object_mut()
            .ok_or_else(|| StorageError::InvalidDocument("document must be an object".into()))?;
        let id = obj
            .get("_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| StorageError::InvalidDocument("document is missing `_id`".into()))?;
        let supplied = obj
            .remove("_rev")
            .and_then(|rev| rev.as_str().map(str::to_string));

        let _guard = self.write_lock.lock().await;
        let current = self.read_doc(&id).await?;
        let current_rev = current.as_ref().and_then(revision_of);
        if current_rev != supplied.as_deref() {
            debug!(%id, ?current_rev, ?supplied, "rejecting stale write");
            return Err(StorageError::Conflict(id));
        }

        let rev = next_revision(current_rev, &doc)?;
        if let Some(obj) = doc.as_object_mut() {
            obj.insert("_rev".to_string(), Value::String(rev.clone()));
        }
        self.write_doc(&id, &doc).await?;
        self.update_views(&id, current.as_ref(), Some(&doc)).await?;
        debug!(%id, %rev, "document written");
        Ok(rev)
    }

    async fn remove(&self, id: &str, rev: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let current = self
            .read_doc(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        if revision_of(&current) != Some(rev) {
            return Err(StorageError::Conflict(id.to_string()));
        }
        self.op.delete(&Self::doc_path(id)).await?;
        self.update_views(id, Some(&current), None).await?;
        debug!(%id, %rev, "document removed");
        Ok(())
    }

    async fn all_docs(&self) -> StorageResult<Vec<Value>> {
        let mut docs = Vec::new();
        for path in self.list_json(DOCS_DIR).await? {
            docs.push(self.read_json::<Value>(&path).await?);
        }

        docs.sort_by(|a, b| {
            let a_id = a.get("_id").and_then(Value::as_str).unwrap_or_default();
            let b_id = b.get("_id").and_then(Value::as_str).unwrap_or_default();
            a_id.cmp(b_id)
        });
        Ok(docs)
    }

    async fn query(&self, view: &str, key: &str) -> StorageResult<Vec<Value>> {
        let (design_id, view_name) =
            resolve_view_name(view).ok_or_else(|| StorageError::MissingView(view.to_string()))?;
        let design: DesignDocument = match self.read_doc(&design_id).await? {
            Some(doc) => serde_json::from_value(doc)?,
            None => return Err(StorageError::MissingView(view.to_string())),
        };
        let definition = design
            .views
            .get(view_name)
            .ok_or_else(|| StorageError::MissingView(view.to_string()))?;

        let materialized = self.materialize(view, &design.rev, &definition.map).await?;
        let mut rows = Vec::new();
        for id in materialized.lookup(key) {
            if let Some(doc) = self.read_doc(id).await? {
                rows.push(doc);
            }
        }
        debug!(view, key, rows = rows.len(), "view queried");
        Ok(rows)
    }
}
