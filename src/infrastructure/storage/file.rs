#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::io;
use std::path;

use anyhow::Result;
use async_trait::async_trait;
use tokio::fs;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::KeyValueStore;

/// YAML map on disk. Every call reads the file fresh so two processes
/// sharing it see each other's last write, without any further coordination.
pub struct FileStore {
    pub file_path: path::PathBuf,
}

impl Default for FileStore {
    fn default() -> FileStore {
        return FileStore::new(path::PathBuf::from(Config::get(ConfigKey::StateFile)));
    }
}

impl FileStore {
    pub fn new(file_path: path::PathBuf) -> FileStore {
        return FileStore { file_path };
    }

    async fn read(&self) -> Result<BTreeMap<String, String>> {
        let payload = match fs::read_to_string(&self.file_path).await {
            Ok(payload) => payload,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(err) => {
                return Err(err.into());
            }
        };

        if payload.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        return Ok(serde_yaml::from_str(&payload)?);
    }

    async fn write(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        fs::write(&self.file_path, serde_yaml::to_string(values)?).await?;
        tracing::debug!(path = ?self.file_path, "Wrote state file");

        return Ok(());
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    #[allow(clippy::implicit_return)]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        return Ok(self.read().await?.remove(key));
    }

    #[allow(clippy::implicit_return)]
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read().await?;
        values.insert(key.to_string(), value.to_string());
        return self.write(&values).await;
    }

    #[allow(clippy::implicit_return)]
    async fn clear(&self, key: &str) -> Result<()> {
        let mut values = self.read().await?;
        if values.remove(key).is_none() {
            return Ok(());
        }
        return self.write(&values).await;
    }
}
