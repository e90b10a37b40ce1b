use crate::error::StorageResult;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use opendal::Operator;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use url::Url;

pub mod materialized;
pub mod opendal_store;
pub mod view;

pub use opendal_store::OpendalStore;

/// Document store consumed by the note access layer.
///
/// Documents are JSON objects carrying `_id` and, once stored, `_rev`.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Fails with `StorageError::NotFound` when the id is absent.
    async fn get(&self, id: &str) -> StorageResult<Value>;
    /// Returns the new revision. The supplied `_rev` must match the stored one.
    async fn put(&self, doc: Value) -> StorageResult<String>;
    async fn remove(&self, id: &str, rev: &str) -> StorageResult<()>;
    async fn all_docs(&self) -> StorageResult<Vec<Value>>;
    /// Exact-key scan of the view `group/name`.
    async fn query(&self, view: &str, key: &str) -> StorageResult<Vec<Value>>;
}

/// Fixed-length file name for an arbitrary key, so long ids stay within
/// filesystem name limits.
pub(crate) fn storage_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

static MEMORY_OPERATORS: OnceLock<Mutex<HashMap<String, Operator>>> = OnceLock::new();

fn memory_cache() -> &'static Mutex<HashMap<String, Operator>> {
    MEMORY_OPERATORS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Creates an OpenDAL Operator from a URI string.
///
/// Supported schemes:
/// - memory://name -> in-memory, shared by every caller using the same URI
/// - file:///path/to/dir -> local filesystem
pub fn operator_from_uri(uri: &str) -> Result<Operator> {
    if uri.starts_with("memory://") {
        let mut cache = memory_cache()
            .lock()
            .map_err(|_| anyhow!("memory operator cache lock poisoned"))?;
        if let Some(op) = cache.get(uri) {
            return Ok(op.clone());
        }
        let op = Operator::new(opendal::services::Memory::default())?.finish();
        cache.insert(uri.to_string(), op.clone());
        return Ok(op);
    }

    let url = Url::parse(uri).map_err(|e| anyhow!("Invalid storage URI: {}", e))?;
    match url.scheme() {
        "file" => {
            let builder = opendal::services::Fs::default().root(url.path());
            Ok(Operator::new(builder)?.finish())
        }
        other => Err(anyhow!("Unsupported storage scheme: {}", other)),
    }
}
