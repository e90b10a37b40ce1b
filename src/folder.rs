use crate::client::NoteClient;
use crate::document::{now, FolderData, FolderProps};
use crate::error::{ClientError, ClientResult};
use crate::pathname::{folder_id, is_folder_pathname_valid, parent_folder_pathname};
use crate::storage::StorageClient;
use serde_json::Map;
use tracing::{debug, info};

impl<S: StorageClient> NoteClient<S> {
    pub async fn get_folder(&self, pathname: &str) -> ClientResult<Option<FolderData>> {
        self.get_doc(&folder_id(pathname)).await
    }

    /// Gets, creates or merges the folder at `pathname`.
    ///
    /// Every missing ancestor is created first, root first. Without `props`
    /// an existing folder is returned as stored.
    pub async fn upsert_folder(
        &self,
        pathname: &str,
        props: Option<FolderProps>,
    ) -> ClientResult<FolderData> {
        ensure_folder_pathname(pathname)?;
        self.ensure_parent_folders(pathname).await?;

        let existing = self.get_folder(pathname).await?;
        if let (Some(folder), None) = (&existing, &props) {
            return Ok(folder.clone());
        }
        self.write_folder(pathname, existing, props).await
    }

    /// Walks up until an existing ancestor is found, then creates the
    /// missing ones top-down. Stops early since an existing folder already
    /// has its whole chain.
    async fn ensure_parent_folders(&self, pathname: &str) -> ClientResult<()> {
        let mut missing = Vec::new();
        let mut cursor = parent_folder_pathname(pathname);
        while let Some(parent) = cursor {
            if self.get_folder(&parent).await?.is_some() {
                break;
            }
            cursor = parent_folder_pathname(&parent);
            missing.push(parent);
        }

        for ancestor in missing.iter().rev() {
            debug!(pathname = %ancestor, "creating missing ancestor folder");
            self.write_folder(ancestor, None, None).await?;
        }
        Ok(())
    }

    async fn write_folder(
        &self,
        pathname: &str,
        existing: Option<FolderData>,
        props: Option<FolderProps>,
    ) -> ClientResult<FolderData> {
        let now = now();
        let created = existing.is_none();
        let mut folder = existing.unwrap_or_else(|| FolderData {
            id: folder_id(pathname),
            rev: String::new(),
            created_at: now,
            updated_at: now,
            data: Map::new(),
        });
        if let Some(props) = props {
            props.apply(&mut folder);
        }
        folder.updated_at = now;

        folder.rev = self.put_doc(&folder).await?;
        if created {
            info!(%pathname, "folder created");
        }
        Ok(folder)
    }
}

pub(crate) fn ensure_folder_pathname(pathname: &str) -> ClientResult<()> {
    if !is_folder_pathname_valid(pathname) {
        return Err(ClientError::Validation(format!(
            "pathname is invalid, got `{}`",
            pathname
        )));
    }
    Ok(())
}
