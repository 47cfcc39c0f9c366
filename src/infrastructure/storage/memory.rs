use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::models::KeyValueStore;

/// Process-local store. Clones share the same map, so a test can keep a
/// handle after boxing one into a session manager.
#[derive(Clone, Default)]
pub struct MemoryStore {
    values: Arc<DashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    #[allow(clippy::implicit_return)]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        return Ok(self.values.get(key).map(|e| return e.value().to_string()));
    }

    #[allow(clippy::implicit_return)]
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn clear(&self, key: &str) -> Result<()> {
        self.values.remove(key);
        return Ok(());
    }
}
