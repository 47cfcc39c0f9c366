use std::sync::Arc;

use tokio::sync::OnceCell;

use super::ChatReply;
use super::ChatRequest;
use super::DispatchError;
use super::SessionId;

/// Shared by every dispatch issued while a session is still unannounced, so
/// the backend is asked to open it once no matter how many sends overlap.
pub type SessionAnnouncement = Arc<OnceCell<SessionId>>;

/// A dispatch that has been started but not completed. The generation ties
/// the eventual outcome to the session it was issued for.
#[derive(Clone, Debug)]
pub struct PendingDispatch {
    pub generation: u64,
    pub request: ChatRequest,
    pub announcement: Option<SessionAnnouncement>,
}

/// What happened to the session announcement a dispatch may carry.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionOpen {
    NotRequested,
    Opened(SessionId),
    Failed,
}

#[derive(Debug)]
pub struct DispatchOutcome {
    pub generation: u64,
    pub session: SessionOpen,
    /// The excerpt the request carried, if any.
    pub selected_text: Option<String>,
    pub result: Result<ChatReply, DispatchError>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Sending,
}
