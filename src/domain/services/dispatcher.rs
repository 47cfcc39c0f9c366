#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod tests;

use super::SessionManager;
use crate::domain::models::Backend;
use crate::domain::models::ChatReply;
use crate::domain::models::ChatRequest;
use crate::domain::models::DispatchError;
use crate::domain::models::DispatchOutcome;
use crate::domain::models::DispatchState;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::PendingDispatch;
use crate::domain::models::Role;
use crate::domain::models::SessionOpen;

async fn send_message(
    backend: &(dyn Backend + Send + Sync),
    request: &ChatRequest,
) -> Result<ChatReply, DispatchError> {
    let mut reply = backend.send_message(request).await?;
    if reply.session_id.is_none() {
        reply.session_id = Some(request.session_id.clone());
    }

    return Ok(reply);
}

/// Turns user text into one request/response cycle against the backend.
///
/// A dispatch is split in three so the network call can run off the UI loop:
/// [`MessageDispatcher::begin`] updates local state,
/// [`MessageDispatcher::execute`] talks to the backend, and
/// [`MessageDispatcher::complete`] applies the outcome. Nothing here prevents
/// two dispatches from overlapping; callers gate on [`is_loading`].
///
/// The in-flight count belongs to one session generation. Once the session
/// manager moves on, the count no longer applies and loading reads false.
///
/// [`is_loading`]: MessageDispatcher::is_loading
#[derive(Default)]
pub struct MessageDispatcher {
    generation: u64,
    in_flight: usize,
}

impl MessageDispatcher {
    pub fn is_loading(&self, sessions: &SessionManager) -> bool {
        return self.generation == sessions.generation() && self.in_flight > 0;
    }

    pub fn state(&self, sessions: &SessionManager) -> DispatchState {
        if self.is_loading(sessions) {
            return DispatchState::Sending;
        }

        return DispatchState::Idle;
    }

    /// Appends the user message and prepares the request. Returns `None` for
    /// blank input, in which case nothing changed.
    pub async fn begin(
        &mut self,
        sessions: &mut SessionManager,
        text: &str,
        selected_text: Option<String>,
    ) -> Option<PendingDispatch> {
        let message = text.trim();
        if message.is_empty() {
            return None;
        }

        sessions.add_message(Message::new(Role::User, message));
        let session_id = sessions.get_or_create_session().await;

        if self.generation != sessions.generation() {
            self.generation = sessions.generation();
            self.in_flight = 0;
        }
        self.in_flight += 1;

        let announcement = sessions.announcement();
        tracing::debug!(
            session_id = session_id.as_str(),
            has_selection = selected_text.is_some(),
            announce = announcement.is_some(),
            state = ?self.state(sessions),
            in_flight = self.in_flight,
            "Dispatch issued"
        );

        return Some(PendingDispatch {
            generation: sessions.generation(),
            request: ChatRequest {
                message: message.to_string(),
                session_id,
                selected_text: selected_text.filter(|e| return !e.trim().is_empty()),
            },
            announcement,
        });
    }

    /// Runs the network side of a dispatch. Never fails; errors are carried
    /// in the outcome.
    pub async fn execute(
        backend: &(dyn Backend + Send + Sync),
        pending: PendingDispatch,
    ) -> DispatchOutcome {
        let mut request = pending.request;
        let mut session = SessionOpen::NotRequested;
        tracing::debug!(
            backend = %backend.name(),
            session_id = request.session_id.as_str(),
            announce = pending.announcement.is_some(),
            "Sending message"
        );

        if let Some(announcement) = pending.announcement {
            let proposed = request.session_id.clone();
            let opened = announcement
                .get_or_try_init(|| return backend.open_session(&proposed))
                .await;

            match opened {
                Ok(id) => {
                    request.session_id = id.clone();
                    session = SessionOpen::Opened(id.clone());
                }
                Err(err) => {
                    return DispatchOutcome {
                        generation: pending.generation,
                        session: SessionOpen::Failed,
                        selected_text: request.selected_text,
                        result: Err(err),
                    };
                }
            }
        }

        let result = send_message(backend, &request).await;
        return DispatchOutcome {
            generation: pending.generation,
            session,
            selected_text: request.selected_text,
            result,
        };
    }

    /// Applies an outcome, appending exactly one assistant message. Outcomes
    /// for a session that has since been reset are dropped and `false` is
    /// returned.
    pub async fn complete(
        &mut self,
        sessions: &mut SessionManager,
        outcome: DispatchOutcome,
    ) -> bool {
        if outcome.generation != sessions.generation() {
            tracing::debug!(
                generation = outcome.generation,
                current = sessions.generation(),
                "Dropped outcome for an abandoned session"
            );
            return false;
        }

        self.in_flight = self.in_flight.saturating_sub(1);
        tracing::debug!(
            state = ?self.state(sessions),
            in_flight = self.in_flight,
            "Dispatch completed"
        );

        match outcome.session {
            SessionOpen::Opened(id) => sessions.adopt_session_id(id).await,
            SessionOpen::Failed => {
                tracing::warn!("Backend refused to open the session, retrying on the next send")
            }
            SessionOpen::NotRequested => {}
        }

        match outcome.result {
            Ok(mut reply) => {
                if let Some(id) = reply.session_id.take() {
                    sessions.adopt_session_id(id).await;
                }
                tracing::debug!(
                    sources = reply.sources.len(),
                    confidence = ?reply.confidence,
                    "Dispatch succeeded"
                );
                sessions.add_message(reply.into_message());
            }
            Err(err) => {
                tracing::error!(error = ?err, "Dispatch failed");
                sessions.add_message(Message::new_with_type(
                    Role::Assistant,
                    MessageType::Error,
                    &err.fallback_message(),
                ));
            }
        }

        return true;
    }

    /// Runs a whole dispatch inline. Returns true when the backend answered
    /// and the answer was applied.
    pub async fn send(
        &mut self,
        sessions: &mut SessionManager,
        backend: &(dyn Backend + Send + Sync),
        text: &str,
        selected_text: Option<String>,
    ) -> bool {
        let pending = match self.begin(sessions, text, selected_text).await {
            Some(pending) => pending,
            None => return false,
        };

        let outcome = MessageDispatcher::execute(backend, pending).await;
        let answered = outcome.result.is_ok();

        return self.complete(sessions, outcome).await && answered;
    }
}
