mod common;
use common::setup_client;
use notedb_core::{ClientError, TagProps};
use serde_json::json;

#[tokio::test]
async fn test_tag_upsert_creates_and_reads_back() -> anyhow::Result<()> {
    let client = setup_client().await?;
    assert!(client.get_tag("work").await?.is_none());

    let tag = client.upsert_tag("work", None).await?;
    assert_eq!(tag.id, "tag:work");
    assert_eq!(tag.name(), "work");
    assert!(tag.data.is_empty());

    let again = client.upsert_tag("work", None).await?;
    assert_eq!(tag, again);
    Ok(())
}

#[tokio::test]
async fn test_tag_upsert_with_props_replaces_data() -> anyhow::Result<()> {
    let client = setup_client().await?;
    let created = client.upsert_tag("urgent", None).await?;

    let data = json!({"pinned": true}).as_object().cloned().unwrap_or_default();
    let updated = client
        .upsert_tag("urgent", Some(TagProps::with_data(data)))
        .await?;
    assert_eq!(updated.created_at, created.created_at);
    assert_ne!(updated.rev, created.rev);
    assert_eq!(updated.data["pinned"], true);

    let empty_props = client.upsert_tag("urgent", Some(TagProps::default())).await?;
    assert_eq!(empty_props.data["pinned"], true);
    assert_ne!(empty_props.rev, updated.rev);
    Ok(())
}

#[tokio::test]
async fn test_tag_upsert_rejects_invalid_name() -> anyhow::Result<()> {
    let client = setup_client().await?;
    assert!(matches!(
        client.upsert_tag("", None).await,
        Err(ClientError::Validation(_))
    ));
    assert!(matches!(
        client.upsert_tag("a/b", None).await,
        Err(ClientError::Validation(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_tag_stale_write_surfaces_conflict() -> anyhow::Result<()> {
    use notedb_core::StorageClient;

    let client = setup_client().await?;
    let tag = client.upsert_tag("shared", None).await?;

    // Another writer bumps the revision behind our back.
    let mut doc = serde_json::to_value(&tag)?;
    doc["data"] = json!({"by": "other"});
    client.store().put(doc).await?;

    let mut stale = serde_json::to_value(&tag)?;
    stale["data"] = json!({"by": "us"});
    let result = client.store().put(stale).await;
    assert!(matches!(
        result.map_err(ClientError::from),
        Err(ClientError::Conflict { id }) if id == "tag:shared"
    ));
    Ok(())
}
