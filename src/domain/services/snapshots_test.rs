use anyhow::Result;

use super::Snapshots;
use crate::domain::models::Message;
use crate::domain::models::PersistedState;
use crate::domain::models::Role;
use crate::domain::models::Size;

fn state() -> PersistedState {
    return PersistedState {
        is_open: true,
        conversation_id: Some("conv_1".to_string()),
        messages: vec![
            Message::new(Role::User, "Hi"),
            Message::new(Role::Assistant, "Hello"),
        ],
        size: Size {
            width: 600,
            height: 800,
        },
    };
}

#[tokio::test]
async fn it_loads_nothing_without_a_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let snapshots = Snapshots::new(dir.path().join("missing"));

    assert!(snapshots.load().await?.is_none());
    return Ok(());
}

#[tokio::test]
async fn it_saves_and_loads() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let snapshots = Snapshots::new(dir.path().join("nested/state"));

    let state = state();
    snapshots.save(&state).await?;
    assert!(snapshots.path().exists());
    assert_eq!(snapshots.load().await?, Some(state));

    return Ok(());
}

#[tokio::test]
async fn it_writes_only_persisted_fields() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let snapshots = Snapshots::new(dir.path().to_path_buf());
    snapshots.save(&state()).await?;

    let payload = std::fs::read_to_string(snapshots.path())?;
    let doc: serde_yaml::Value = serde_yaml::from_str(&payload)?;
    let mut keys = doc["state"]
        .as_mapping()
        .unwrap()
        .keys()
        .map(|key| return key.as_str().unwrap().to_string())
        .collect::<Vec<String>>();
    keys.sort();

    assert_eq!(keys, vec!["conversation_id", "is_open", "messages", "size"]);
    assert_eq!(doc["version"].as_str(), Some(env!("CARGO_PKG_VERSION")));

    return Ok(());
}

#[tokio::test]
async fn it_clears() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let snapshots = Snapshots::new(dir.path().to_path_buf());

    snapshots.clear().await?;
    snapshots.save(&state()).await?;
    snapshots.clear().await?;

    assert!(!snapshots.path().exists());
    assert!(snapshots.load().await?.is_none());

    return Ok(());
}
