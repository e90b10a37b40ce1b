use crate::config::ClientConfig;
use crate::document::{DocumentMap, FolderData, NoteData, TagData};
use crate::error::{ClientError, ClientResult, StorageError};
use crate::pathname::{document_kind, DocumentKind, ROOT_PATHNAME};
use crate::storage::{OpendalStore, StorageClient};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

/// Typed access layer over one document store.
///
/// The store is owned by the client; nothing is shared through globals, so
/// independent clients can sit side by side over different stores.
pub struct NoteClient<S> {
    pub(crate) store: S,
    id: String,
    name: String,
}

impl NoteClient<OpendalStore> {
    pub fn open(config: &ClientConfig) -> ClientResult<Self> {
        config.validate().map_err(ClientError::Config)?;
        let store = OpendalStore::from_uri(&config.storage.uri).map_err(ClientError::Config)?;
        Ok(Self::new(store, config.id.clone(), config.name.clone()))
    }
}

impl<S: StorageClient> NoteClient<S> {
    pub fn new(store: S, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            store,
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Installs the note views and makes sure the root folder exists.
    ///
    /// A consistency sweep over existing notes is not performed here; it is
    /// unscheduled future work.
    pub async fn init(&self) -> ClientResult<()> {
        self.ensure_note_indexes().await?;
        self.upsert_folder(ROOT_PATHNAME, None).await?;
        info!(client = %self.id, "note client initialized");
        Ok(())
    }

    /// Reads every document and sorts folders, tags and notes into maps.
    pub async fn load_document_map(&self) -> ClientResult<DocumentMap> {
        let mut map = DocumentMap::default();
        for doc in self.store.all_docs().await? {
            let Some(id) = doc.get("_id").and_then(Value::as_str).map(str::to_string) else {
                continue;
            };
            match document_kind(&id) {
                Some(DocumentKind::Note) => {
                    map.notes.insert(id, serde_json::from_value::<NoteData>(doc)?);
                }
                Some(DocumentKind::Folder) => {
                    map.folders
                        .insert(id, serde_json::from_value::<FolderData>(doc)?);
                }
                Some(DocumentKind::Tag) => {
                    map.tags.insert(id, serde_json::from_value::<TagData>(doc)?);
                }
                Some(DocumentKind::Design) => {}
                None => warn!(%id, "skipping document with unknown id prefix"),
            }
        }
        Ok(map)
    }

    /// Point lookup; a missing document is `Ok(None)`.
    pub(crate) async fn get_doc<T: DeserializeOwned>(&self, id: &str) -> ClientResult<Option<T>> {
        match self.store.get(id).await {
            Ok(doc) => Ok(Some(serde_json::from_value(doc)?)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub(crate) async fn put_doc<T: Serialize>(&self, doc: &T) -> ClientResult<String> {
        let rev = self.store.put(serde_json::to_value(doc)?).await?;
        Ok(rev)
    }
}
