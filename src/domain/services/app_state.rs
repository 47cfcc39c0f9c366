#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use anyhow::Result;

use super::MessageDispatcher;
use super::SelectionCapture;
use super::SessionManager;
use crate::domain::models::Backend;
use crate::domain::models::DispatchOutcome;
use crate::domain::models::PendingDispatch;
use crate::domain::models::SelectionEvent;
use crate::infrastructure::storage::StoreBox;

const DEFAULT_SELECTION_QUESTION: &str = "explain this";

/// Everything one chat surface needs, passed around explicitly rather than
/// living in globals.
pub struct AppState {
    pub sessions: SessionManager,
    pub dispatcher: MessageDispatcher,
    pub selection: SelectionCapture,
}

impl AppState {
    pub fn new(store: StoreBox, selection_min_length: usize) -> AppState {
        return AppState {
            sessions: SessionManager::new(store),
            dispatcher: MessageDispatcher::default(),
            selection: SelectionCapture::new(selection_min_length),
        };
    }

    /// Resumes the stored session, if any, and pulls its history from the
    /// backend. History failures are logged and otherwise ignored.
    pub async fn restore(&mut self, backend: &(dyn Backend + Send + Sync)) -> Result<bool> {
        let restored = self.sessions.restore().await?;
        if let Some(session_id) = restored {
            match backend.history(&session_id).await {
                Ok(messages) => self.sessions.load_history(messages),
                Err(err) => {
                    tracing::warn!(error = ?err, "Failed to load session history")
                }
            }
            return Ok(true);
        }

        return Ok(false);
    }

    pub fn is_loading(&self) -> bool {
        return self.dispatcher.is_loading(&self.sessions);
    }

    pub fn observe_selection(&mut self, event: &SelectionEvent) -> bool {
        return self.selection.observe(event);
    }

    /// Starts a dispatch for a typed question. A captured excerpt is attached
    /// and stays captured until the reply arrives.
    pub async fn begin_send(&mut self, text: &str) -> Option<PendingDispatch> {
        if text.trim().is_empty() {
            return None;
        }

        let excerpt = self.selection.excerpt();
        return self.dispatcher.begin(&mut self.sessions, text, excerpt).await;
    }

    /// Starts a dispatch about the captured excerpt. Returns `None` when
    /// nothing is selected.
    pub async fn begin_ask_about_selection(&mut self, question: &str) -> Option<PendingDispatch> {
        self.selection.current()?;

        let mut question = question.trim();
        if question.is_empty() {
            question = DEFAULT_SELECTION_QUESTION;
        }

        return self.begin_send(question).await;
    }

    /// Applies an outcome. A successful reply clears the excerpt it was about.
    pub async fn complete(&mut self, outcome: DispatchOutcome) -> bool {
        let answered = outcome.result.is_ok();
        let excerpt = outcome.selected_text.clone();

        let applied = self.dispatcher.complete(&mut self.sessions, outcome).await;
        if applied && answered {
            self.consume_excerpt(excerpt);
        }

        return applied;
    }

    pub async fn send(&mut self, backend: &(dyn Backend + Send + Sync), text: &str) {
        if text.trim().is_empty() {
            return;
        }

        let excerpt = self.selection.excerpt();
        let answered = self
            .dispatcher
            .send(&mut self.sessions, backend, text, excerpt.clone())
            .await;
        if answered {
            self.consume_excerpt(excerpt);
        }
    }

    pub async fn reset_session(&mut self) {
        self.sessions.reset_session().await;
        self.selection.dismiss();
    }

    fn consume_excerpt(&mut self, excerpt: Option<String>) {
        if let Some(text) = excerpt {
            if self.selection.consume(&text) {
                tracing::debug!("Cleared the answered selection");
            }
        }
    }
}
