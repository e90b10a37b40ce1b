mod common;
use common::setup_operator;
use notedb_core::index::{note_views, NOTES_DESIGN_ID};
use notedb_core::storage::view::{ViewDefinition, ViewMap};
use notedb_core::{NoteClient, OpendalStore, StorageClient};
use serde_json::json;

#[tokio::test]
async fn test_index_ensure_writes_once() -> anyhow::Result<()> {
    let client = NoteClient::new(OpendalStore::new(setup_operator()?), "c", "C");

    let first = client.ensure_note_indexes().await?;
    assert_eq!(first.id, NOTES_DESIGN_ID);
    assert_eq!(first.views, note_views());
    assert!(first.rev.starts_with("1-"));

    let second = client.ensure_note_indexes().await?;
    assert_eq!(second.rev, first.rev);
    Ok(())
}

#[tokio::test]
async fn test_index_ensure_rewrites_outdated_views() -> anyhow::Result<()> {
    let store = OpendalStore::new(setup_operator()?);
    store
        .put(json!({
            "_id": NOTES_DESIGN_ID,
            "views": {
                "by_folder": {"map": {"emit": "field", "id_prefix": "note:", "field": "folder"}},
                "legacy": {"map": {"emit": "field", "id_prefix": "note:", "field": "title"}}
            }
        }))
        .await?;
    let client = NoteClient::new(store, "c", "C");

    let design = client.ensure_note_indexes().await?;
    assert!(design.rev.starts_with("2-"));
    assert_eq!(design.views, note_views());
    assert_eq!(
        design.views.get("by_tag"),
        Some(&ViewDefinition {
            map: ViewMap::Each {
                id_prefix: "note:".to_string(),
                field: "tags".to_string(),
            }
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_index_queries_fail_before_init() -> anyhow::Result<()> {
    let client = NoteClient::new(OpendalStore::new(setup_operator()?), "c", "C");
    assert!(client.find_notes_by_tag("any").await.is_err());

    client.init().await?;
    assert!(client.find_notes_by_tag("any").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_index_ensure_drops_extra_views() -> anyhow::Result<()> {
    let store = OpendalStore::new(setup_operator()?);
    let mut views = serde_json::to_value(note_views())?;
    views["legacy"] = json!({"map": {"emit": "field", "id_prefix": "note:", "field": "title"}});
    store
        .put(json!({"_id": NOTES_DESIGN_ID, "views": views}))
        .await?;
    let client = NoteClient::new(store, "c", "C");

    let design = client.ensure_note_indexes().await?;
    assert!(design.rev.starts_with("2-"));
    assert!(!design.views.contains_key("legacy"));
    assert_eq!(design.views, note_views());
    Ok(())
}
