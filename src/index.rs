use crate::client::NoteClient;
use crate::error::ClientResult;
use crate::pathname::NOTE_ID_PREFIX;
use crate::storage::view::{DesignDocument, ViewDefinition, ViewMap};
use crate::storage::StorageClient;
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const NOTES_DESIGN_ID: &str = "_design/notes";
pub const BY_FOLDER_VIEW: &str = "notes/by_folder";
pub const BY_TAG_VIEW: &str = "notes/by_tag";

/// The `by_folder` and `by_tag` views over note documents.
pub fn note_views() -> BTreeMap<String, ViewDefinition> {
    let mut views = BTreeMap::new();
    views.insert(
        "by_folder".to_string(),
        ViewDefinition {
            map: ViewMap::Field {
                id_prefix: NOTE_ID_PREFIX.to_string(),
                field: "folderPathname".to_string(),
            },
        },
    );
    views.insert(
        "by_tag".to_string(),
        ViewDefinition {
            map: ViewMap::Each {
                id_prefix: NOTE_ID_PREFIX.to_string(),
                field: "tags".to_string(),
            },
        },
    );
    views
}

impl<S: StorageClient> NoteClient<S> {
    /// Writes the note views unless the stored document holds exactly them.
    pub async fn ensure_note_indexes(&self) -> ClientResult<DesignDocument> {
        let expected = note_views();
        let existing: Option<DesignDocument> = self.get_doc(NOTES_DESIGN_ID).await?;

        if let Some(design) = &existing {
            if design.views == expected {
                debug!("note views are up to date");
                return Ok(design.clone());
            }
        }

        let mut design = existing.unwrap_or_else(|| DesignDocument {
            id: NOTES_DESIGN_ID.to_string(),
            rev: String::new(),
            views: BTreeMap::new(),
        });
        design.views = expected;
        design.rev = self.put_doc(&design).await?;
        info!(rev = %design.rev, "note views written");
        Ok(design)
    }
}
