use anyhow::Result;
use async_trait::async_trait;
use notedb_core::{NoteClient, OpendalStore, StorageClient, StorageResult};
use opendal::services::Memory;
use opendal::Operator;
use serde_json::{json, Value};
use std::sync::Mutex;

#[allow(dead_code)]
pub fn setup_operator() -> Result<Operator> {
    let builder = Memory::default();
    let op = Operator::new(builder)?.finish();
    Ok(op)
}

#[allow(dead_code)]
pub async fn setup_client() -> Result<NoteClient<OpendalStore>> {
    let store = OpendalStore::new(setup_operator()?);
    let client = NoteClient::new(store, "test-client", "Test Client");
    client.init().await?;
    Ok(client)
}

/// What a second writer does to a document right after it has been read.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interference {
    /// Rewrites the document with `data = {"writer": "other"}`.
    Rewrite,
    /// Deletes the document.
    Delete,
}

/// Store that lets another writer act between the client's read and its
/// write of one chosen document. Fires once per `arm`.
#[allow(dead_code)]
pub struct InterferingStore {
    inner: OpendalStore,
    armed: Mutex<Option<(String, Interference)>>,
}

#[allow(dead_code)]
impl InterferingStore {
    pub fn new(inner: OpendalStore) -> Self {
        Self {
            inner,
            armed: Mutex::new(None),
        }
    }

    pub fn arm(&self, id: &str, interference: Interference) {
        *self.armed.lock().unwrap() = Some((id.to_string(), interference));
    }

    fn take_if_armed(&self, id: &str) -> Option<Interference> {
        let mut armed = self.armed.lock().unwrap();
        match armed.as_ref() {
            Some((target, _)) if target == id => armed.take().map(|(_, action)| action),
            _ => None,
        }
    }
}

#[async_trait]
impl StorageClient for InterferingStore {
    async fn get(&self, id: &str) -> StorageResult<Value> {
        let doc = self.inner.get(id).await?;
        match self.take_if_armed(id) {
            Some(Interference::Rewrite) => {
                let mut other = doc.clone();
                other["data"] = json!({"writer": "other"});
                self.inner.put(other).await?;
            }
            Some(Interference::Delete) => {
                let rev = doc["_rev"].as_str().unwrap_or_default().to_string();
                self.inner.remove(id, &rev).await?;
            }
            None => {}
        }
        Ok(doc)
    }

    async fn put(&self, doc: Value) -> StorageResult<String> {
        self.inner.put(doc).await
    }

    async fn remove(&self, id: &str, rev: &str) -> StorageResult<()> {
        self.inner.remove(id, rev).await
    }

    async fn all_docs(&self) -> StorageResult<Vec<Value>> {
        self.inner.all_docs().await
    }

    async fn query(&self, view: &str, key: &str) -> StorageResult<Vec<Value>> {
        self.inner.query(view, key).await
    }
}

#[allow(dead_code)]
pub async fn setup_interfering_client() -> Result<NoteClient<InterferingStore>> {
    let store = InterferingStore::new(OpendalStore::new(setup_operator()?));
    let client = NoteClient::new(store, "test-client", "Test Client");
    client.init().await?;
    Ok(client)
}
