#[cfg(test)]
#[path = "sessions_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::OnceCell;

use crate::domain::models::Message;
use crate::domain::models::SessionAnnouncement;
use crate::domain::models::SessionId;
use crate::domain::models::SESSION_ID_KEY;
use crate::infrastructure::storage::StoreBox;

/// Owns the conversation identity and its message list. The store is a
/// mirror of the identifier only; the in-memory copy is authoritative.
pub struct SessionManager {
    store: StoreBox,
    session_id: Option<SessionId>,
    announcement: Option<SessionAnnouncement>,
    messages: Vec<Message>,
    generation: u64,
}

impl SessionManager {
    pub fn new(store: StoreBox) -> SessionManager {
        return SessionManager {
            store,
            session_id: None,
            announcement: None,
            messages: vec![],
            generation: 0,
        };
    }

    /// Picks up an identifier persisted by a previous run. A restored
    /// session has already been opened with the backend.
    pub async fn restore(&mut self) -> Result<Option<SessionId>> {
        let stored = self.store.get(SESSION_ID_KEY).await?;
        if let Some(id) = stored.filter(|e| return !e.trim().is_empty()) {
            tracing::debug!(session_id = id, "Restored session");
            let session_id = SessionId::new(id.trim());
            self.session_id = Some(session_id.clone());
            self.announcement = None;
            return Ok(Some(session_id));
        }

        return Ok(None);
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        return self.session_id.as_ref();
    }

    pub async fn get_or_create_session(&mut self) -> SessionId {
        if let Some(id) = &self.session_id {
            return id.clone();
        }

        let id = SessionId::generate();
        tracing::debug!(session_id = id.as_str(), "Created session");
        self.session_id = Some(id.clone());
        self.announcement = Some(Arc::new(OnceCell::new()));
        self.persist().await;

        return id;
    }

    /// Whether the current session still has to be announced to the backend.
    pub fn needs_open(&self) -> bool {
        return match &self.announcement {
            Some(cell) => !cell.initialized(),
            None => false,
        };
    }

    /// The pending announcement for the current session, shared between
    /// every dispatch issued before the backend confirmed it. A failed
    /// announcement leaves the cell empty, so the next dispatch retries.
    pub fn announcement(&self) -> Option<SessionAnnouncement> {
        if !self.needs_open() {
            return None;
        }

        return self.announcement.clone();
    }

    /// Switches to an identifier confirmed by the backend.
    pub async fn adopt_session_id(&mut self, id: SessionId) {
        self.announcement = None;
        if self.session_id.as_ref() == Some(&id) {
            return;
        }

        tracing::debug!(
            previous = ?self.session_id,
            session_id = id.as_str(),
            "Adopted backend session id"
        );
        self.session_id = Some(id);
        self.persist().await;
    }

    pub async fn reset_session(&mut self) {
        tracing::debug!(session_id = ?self.session_id, "Reset session");
        self.session_id = None;
        self.announcement = None;
        self.messages.clear();
        self.generation += 1;

        if let Err(err) = self.store.clear(SESSION_ID_KEY).await {
            tracing::warn!(error = ?err, "Failed to clear stored session id");
        }
    }

    /// Bumped on every reset. Outcomes carrying an older generation belong to
    /// an abandoned session.
    pub fn generation(&self) -> u64 {
        return self.generation;
    }

    pub fn messages(&self) -> &[Message] {
        return &self.messages;
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Seeds an empty conversation with the backend's stored history.
    pub fn load_history(&mut self, messages: Vec<Message>) {
        if !self.messages.is_empty() {
            return;
        }
        self.messages = messages;
    }

    async fn persist(&self) {
        if let Some(id) = &self.session_id {
            if let Err(err) = self.store.set(SESSION_ID_KEY, id.as_str()).await {
                tracing::warn!(error = ?err, "Failed to persist session id");
            }
        }
    }
}
