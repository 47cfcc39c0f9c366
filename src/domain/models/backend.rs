#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use strum::EnumIter;
use strum::EnumVariantNames;

use super::DispatchError;
use super::Message;
use super::Role;
use super::SessionId;
use super::SourceCitation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum BackendName {
    Flat,
    Sessions,
}

impl BackendName {
    pub fn parse(text: String) -> Option<BackendName> {
        if text == "flat" {
            return Some(BackendName::Flat);
        }
        if text == "sessions" {
            return Some(BackendName::Sessions);
        }

        return None;
    }
}

/// One outbound question.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: SessionId,
    pub selected_text: Option<String>,
}

/// A parsed answer from the backend, before it becomes a [`Message`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatReply {
    pub content: String,
    pub sources: Vec<SourceCitation>,
    pub confidence: Option<f64>,
    pub session_id: Option<SessionId>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatReply {
    pub fn into_message(self) -> Message {
        let mut msg = Message::new(Role::Assistant, &self.content)
            .with_sources(self.sources)
            .with_confidence(self.confidence);

        if let Some(timestamp) = self.timestamp {
            msg = msg.with_timestamp(timestamp);
        }

        return msg;
    }
}

#[async_trait]
pub trait Backend {
    fn name(&self) -> BackendName;

    /// Used at startup to tell the user early that the backend isn't
    /// reachable.
    async fn health_check(&self) -> Result<()>;

    /// Called once per session, right before its first dispatch. Backends
    /// that issue their own identifiers return them here; the rest echo the
    /// proposed id.
    async fn open_session(&self, proposed: &SessionId) -> Result<SessionId, DispatchError>;

    /// Issues exactly one request and awaits exactly one response. There is
    /// no streaming and no retry.
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply, DispatchError>;

    /// Messages the backend has stored for a session, oldest first.
    async fn history(&self, session_id: &SessionId) -> Result<Vec<Message>>;

    /// Drops the backend's stored history for a session.
    async fn clear_history(&self, session_id: &SessionId) -> Result<()>;
}
