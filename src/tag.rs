use crate::client::NoteClient;
use crate::document::{now, TagData, TagProps};
use crate::error::{ClientError, ClientResult};
use crate::pathname::{is_tag_name_valid, tag_id};
use crate::storage::StorageClient;
use serde_json::Map;
use tracing::info;

impl<S: StorageClient> NoteClient<S> {
    pub async fn get_tag(&self, tag_name: &str) -> ClientResult<Option<TagData>> {
        self.get_doc(&tag_id(tag_name)).await
    }

    pub async fn upsert_tag(&self, tag_name: &str, props: Option<TagProps>) -> ClientResult<TagData> {
        ensure_tag_name(tag_name)?;

        let existing = self.get_tag(tag_name).await?;
        if let (Some(tag), None) = (&existing, &props) {
            return Ok(tag.clone());
        }

        let now = now();
        let created = existing.is_none();
        let mut tag = existing.unwrap_or_else(|| TagData {
            id: tag_id(tag_name),
            rev: String::new(),
            created_at: now,
            updated_at: now,
            data: Map::new(),
        });
        if let Some(props) = props {
            props.apply(&mut tag);
        }
        tag.updated_at = now;

        tag.rev = self.put_doc(&tag).await?;
        if created {
            info!(%tag_name, "tag created");
        }
        Ok(tag)
    }
}

pub(crate) fn ensure_tag_name(tag_name: &str) -> ClientResult<()> {
    if !is_tag_name_valid(tag_name) {
        return Err(ClientError::Validation(format!(
            "tag name is invalid, got `{}`",
            tag_name
        )));
    }
    Ok(())
}
