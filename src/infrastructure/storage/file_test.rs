use std::env;
use std::fs;
use std::path;

use anyhow::Result;

use super::FileStore;
use crate::domain::models::KeyValueStore;
use crate::domain::models::SessionId;

fn temp_state_file(name: &str) -> path::PathBuf {
    let dir = env::temp_dir().join(format!("bookchat-test-{}", SessionId::generate()));
    return dir.join(name);
}

#[tokio::test]
async fn it_returns_none_without_a_file() -> Result<()> {
    let store = FileStore::new(temp_state_file("missing.yaml"));
    assert_eq!(store.get("chat-session-id").await?, None);
    return Ok(());
}

#[tokio::test]
async fn it_persists_across_instances() -> Result<()> {
    let file_path = temp_state_file("state.yaml");

    FileStore::new(file_path.clone())
        .set("chat-session-id", "session-1-abc")
        .await?;
    let reopened = FileStore::new(file_path.clone());
    assert_eq!(
        reopened.get("chat-session-id").await?,
        Some("session-1-abc".to_string())
    );

    fs::remove_dir_all(file_path.parent().unwrap())?;
    return Ok(());
}

#[tokio::test]
async fn it_overwrites_and_clears_keys() -> Result<()> {
    let file_path = temp_state_file("state.yaml");
    let store = FileStore::new(file_path.clone());

    store.set("chat-session-id", "first").await?;
    store.set("other", "kept").await?;
    store.set("chat-session-id", "second").await?;
    assert_eq!(
        store.get("chat-session-id").await?,
        Some("second".to_string())
    );

    store.clear("chat-session-id").await?;
    assert_eq!(store.get("chat-session-id").await?, None);
    assert_eq!(store.get("other").await?, Some("kept".to_string()));

    insta::assert_snapshot!(fs::read_to_string(&file_path)?.trim_end(), @"other: kept");

    fs::remove_dir_all(file_path.parent().unwrap())?;
    return Ok(());
}

#[tokio::test]
async fn it_clears_missing_keys_without_writing() -> Result<()> {
    let file_path = temp_state_file("state.yaml");
    let store = FileStore::new(file_path.clone());

    store.clear("chat-session-id").await?;
    assert!(!file_path.exists());

    return Ok(());
}

#[tokio::test]
async fn it_fails_on_corrupt_files() -> Result<()> {
    let file_path = temp_state_file("state.yaml");
    fs::create_dir_all(file_path.parent().unwrap())?;
    fs::write(&file_path, "- not\n- a map\n")?;

    let store = FileStore::new(file_path.clone());
    assert!(store.get("chat-session-id").await.is_err());

    fs::remove_dir_all(file_path.parent().unwrap())?;
    return Ok(());
}

#[tokio::test]
async fn it_fails_when_the_path_is_a_directory() -> Result<()> {
    let file_path = temp_state_file("state.yaml");
    fs::create_dir_all(&file_path)?;

    let store = FileStore::new(file_path.clone());
    assert!(store.get("chat-session-id").await.is_err());

    fs::remove_dir_all(file_path.parent().unwrap())?;
    return Ok(());
}
