mod common;
use common::{setup_interfering_client, Interference};
use notedb_core::{ClientError, FolderProps, NoteProps, TagProps};
use serde_json::json;

fn data(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn test_conflict_update_note_surfaces_without_retry() -> anyhow::Result<()> {
    let client = setup_interfering_client().await?;
    let note = client
        .create_note(NoteProps::default().title("Shared").content("v1"))
        .await?;

    client.store().arm(&note.id, Interference::Rewrite);
    let result = client
        .update_note(&note.id, NoteProps::default().content("v2"))
        .await;
    assert!(matches!(result, Err(ClientError::Conflict { id }) if id == note.id));

    let stored = client.get_note(&note.id).await?.expect("note exists");
    assert_eq!(stored.content, "v1");
    assert_eq!(stored.data["writer"], "other");
    assert!(stored.rev.starts_with("2-"));
    Ok(())
}

#[tokio::test]
async fn test_conflict_upsert_folder_with_props() -> anyhow::Result<()> {
    let client = setup_interfering_client().await?;
    client.upsert_folder("/shared", None).await?;

    client.store().arm("folder:/shared", Interference::Rewrite);
    let result = client
        .upsert_folder("/shared", Some(FolderProps::with_data(data(json!({"writer": "us"})))))
        .await;
    assert!(matches!(result, Err(ClientError::Conflict { id }) if id == "folder:/shared"));

    let stored = client.get_folder("/shared").await?.expect("folder exists");
    assert_eq!(stored.data["writer"], "other");
    Ok(())
}

#[tokio::test]
async fn test_conflict_upsert_tag_with_props() -> anyhow::Result<()> {
    let client = setup_interfering_client().await?;
    client.upsert_tag("shared", None).await?;

    client.store().arm("tag:shared", Interference::Rewrite);
    let result = client
        .upsert_tag("shared", Some(TagProps::with_data(data(json!({"writer": "us"})))))
        .await;
    assert!(matches!(result, Err(ClientError::Conflict { id }) if id == "tag:shared"));

    let stored = client.get_tag("shared").await?.expect("tag exists");
    assert_eq!(stored.data["writer"], "other");
    Ok(())
}

#[tokio::test]
async fn test_conflict_trash_and_purge_keep_other_version() -> anyhow::Result<()> {
    let client = setup_interfering_client().await?;
    let note = client.create_note(NoteProps::default()).await?;

    client.store().arm(&note.id, Interference::Rewrite);
    assert!(matches!(
        client.trash_note(&note.id).await,
        Err(ClientError::Conflict { .. })
    ));
    let stored = client.get_note(&note.id).await?.expect("note exists");
    assert!(!stored.trashed);

    client.store().arm(&note.id, Interference::Rewrite);
    assert!(matches!(
        client.purge_note(&note.id).await,
        Err(ClientError::Conflict { .. })
    ));
    assert!(client.get_note(&note.id).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_conflict_purge_of_concurrently_removed_note_is_not_found() -> anyhow::Result<()> {
    let client = setup_interfering_client().await?;
    let note = client.create_note(NoteProps::default()).await?;

    client.store().arm(&note.id, Interference::Delete);
    let result = client.purge_note(&note.id).await;
    match result {
        Err(ClientError::NotFound(message)) => assert!(message.contains(&note.id)),
        other => panic!("expected not found, got {:?}", other),
    }
    assert!(client.get_note(&note.id).await?.is_none());
    Ok(())
}
