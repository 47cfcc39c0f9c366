use anyhow::Result;
use async_trait::async_trait;

/// Storage key the session identifier is mirrored under.
pub const SESSION_ID_KEY: &str = "chat-session-id";

/// String key/value persistence. Implementations use interior mutability so a
/// store can be shared by reference.
#[async_trait]
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn clear(&self, key: &str) -> Result<()>;
}
