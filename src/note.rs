use crate::client::NoteClient;
use crate::document::{now, NoteData, NoteProps};
use crate::error::{ClientError, ClientResult};
use crate::folder::ensure_folder_pathname;
use crate::index::{BY_FOLDER_VIEW, BY_TAG_VIEW};
use crate::pathname::{generate_note_id, NOTE_ID_PREFIX, ROOT_PATHNAME};
use crate::storage::StorageClient;
use crate::tag::ensure_tag_name;
use futures::future::try_join_all;
use serde_json::Map;
use std::collections::BTreeSet;
use tracing::{debug, info};

pub const DEFAULT_NOTE_TITLE: &str = "Untitled";

impl<S: StorageClient> NoteClient<S> {
    pub async fn get_note(&self, note_id: &str) -> ClientResult<Option<NoteData>> {
        if !note_id.starts_with(NOTE_ID_PREFIX) {
            return Ok(None);
        }
        self.get_doc(note_id).await
    }

    async fn require_note(&self, note_id: &str) -> ClientResult<NoteData> {
        self.get_note(note_id)
            .await?
            .ok_or_else(|| ClientError::NotFound(format!("The note `{}` does not exist", note_id)))
    }

    /// Validates every reference up front, then materializes the folder
    /// chain and the tags. Tags are independent and created concurrently.
    async fn ensure_references(
        &self,
        folder_pathname: Option<&str>,
        tags: Option<&BTreeSet<String>>,
    ) -> ClientResult<()> {
        if let Some(pathname) = folder_pathname {
            ensure_folder_pathname(pathname)?;
        }
        if let Some(tags) = tags {
            for tag in tags {
                ensure_tag_name(tag)?;
            }
        }

        if let Some(pathname) = folder_pathname {
            self.upsert_folder(pathname, None).await?;
        }
        if let Some(tags) = tags {
            try_join_all(tags.iter().map(|tag| self.upsert_tag(tag, None))).await?;
        }
        Ok(())
    }

    pub async fn create_note(&self, props: NoteProps) -> ClientResult<NoteData> {
        let now = now();
        let mut note = NoteData {
            id: generate_note_id(),
            rev: String::new(),
            title: DEFAULT_NOTE_TITLE.to_string(),
            content: String::new(),
            tags: BTreeSet::new(),
            folder_pathname: ROOT_PATHNAME.to_string(),
            data: Map::new(),
            created_at: now,
            updated_at: now,
            trashed: false,
        };
        props.apply(&mut note);

        self.ensure_references(Some(note.folder_pathname.as_str()), Some(&note.tags))
            .await?;

        note.rev = self.put_doc(&note).await?;
        info!(id = %note.id, folder = %note.folder_pathname, "note created");
        Ok(note)
    }

    /// Merges `props` onto the stored note. Folders and tags it no longer
    /// references are kept in the store.
    pub async fn update_note(&self, note_id: &str, props: NoteProps) -> ClientResult<NoteData> {
        let mut note = self.require_note(note_id).await?;

        self.ensure_references(props.folder_pathname.as_deref(), props.tags.as_ref())
            .await?;

        props.apply(&mut note);
        note.updated_at = now();
        note.rev = self.put_doc(&note).await?;
        debug!(id = %note.id, rev = %note.rev, "note updated");
        Ok(note)
    }

    pub async fn trash_note(&self, note_id: &str) -> ClientResult<NoteData> {
        self.set_trashed(note_id, true).await
    }

    pub async fn untrash_note(&self, note_id: &str) -> ClientResult<NoteData> {
        self.set_trashed(note_id, false).await
    }

    /// Flips the trash flag only; `updatedAt` keeps its value.
    async fn set_trashed(&self, note_id: &str, trashed: bool) -> ClientResult<NoteData> {
        let mut note = self.require_note(note_id).await?;
        note.trashed = trashed;
        note.rev = self.put_doc(&note).await?;
        debug!(id = %note.id, trashed, "note trash flag set");
        Ok(note)
    }

    /// Permanently deletes the note. There is no way back.
    pub async fn purge_note(&self, note_id: &str) -> ClientResult<()> {
        let note = self.require_note(note_id).await?;
        self.store.remove(&note.id, &note.rev).await?;
        info!(id = %note.id, "note purged");
        Ok(())
    }

    /// Notes whose folder is exactly `pathname`, trashed ones included.
    pub async fn find_notes_by_folder(&self, pathname: &str) -> ClientResult<Vec<NoteData>> {
        self.query_notes(BY_FOLDER_VIEW, pathname).await
    }

    /// Notes tagged `tag_name`, trashed ones included.
    pub async fn find_notes_by_tag(&self, tag_name: &str) -> ClientResult<Vec<NoteData>> {
        self.query_notes(BY_TAG_VIEW, tag_name).await
    }

    async fn query_notes(&self, view: &str, key: &str) -> ClientResult<Vec<NoteData>> {
        let rows = self.store.query(view, key).await?;
        let notes = rows
            .into_iter()
            .map(serde_json::from_value::<NoteData>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(notes)
    }
}
