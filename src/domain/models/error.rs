#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

use thiserror::Error;

/// Every way a dispatch can fail. None of these escape the dispatcher; they
/// are converted to a fallback assistant message.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("backend is unreachable: {0}")]
    BackendUnavailable(String),

    #[error("transport failed: {0}")]
    Transport(String),

    #[error("backend responded with status {status}")]
    Server { status: u16 },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl DispatchError {
    pub fn fallback_message(&self) -> String {
        match self {
            DispatchError::BackendUnavailable(_) => {
                return [
                    "I can't reach the tutor backend. It doesn't look like it's running.",
                    "",
                    "To fix:",
                    "1. Start the backend server (for example `uvicorn app.main:app --reload`).",
                    "2. Check that `api-url` points at it.",
                    "3. Ask your question again.",
                ]
                .join("\n");
            }
            DispatchError::Transport(_) => {
                return "Sorry, I could not connect to the tutor backend. Please check your connection and try again.".to_string();
            }
            DispatchError::Server { .. } | DispatchError::Malformed(_) => {
                return "Sorry, I encountered an error. Please try again.".to_string();
            }
        }
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> DispatchError {
        if err.is_decode() {
            return DispatchError::Malformed(err.to_string());
        }
        if let Some(status) = err.status() {
            return DispatchError::Server {
                status: status.as_u16(),
            };
        }
        if err.is_connect() {
            return DispatchError::BackendUnavailable(err.to_string());
        }

        return DispatchError::Transport(err.to_string());
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> DispatchError {
        return DispatchError::Malformed(err.to_string());
    }
}
