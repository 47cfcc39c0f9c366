#[cfg(test)]
#[path = "sessions_test.rs"]
mod tests;

use std::collections::HashMap;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::parse_timestamp;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::ChatReply;
use crate::domain::models::ChatRequest;
use crate::domain::models::DispatchError;
use crate::domain::models::Message;
use crate::domain::models::Role;
use crate::domain::models::SessionId;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CreateSessionRequest {
    metadata: HashMap<String, String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CreateSessionResponse {
    session_id: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MessageRequest {
    message: String,
    selected_text: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    role: String,
    content: String,
    timestamp: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ChatResponse {
    session_id: Option<String>,
    assistant_message: MessageResponse,
}

/// Session scoped API: the backend issues its own session ids through
/// `/api/chat/sessions` and messages are posted under them.
pub struct Sessions {
    url: String,
    timeout: String,
}

impl Default for Sessions {
    fn default() -> Sessions {
        return Sessions::new(
            &Config::get(ConfigKey::ApiURL),
            &Config::get(ConfigKey::BackendHealthCheckTimeout),
        );
    }
}

impl Sessions {
    pub fn new(url: &str, timeout: &str) -> Sessions {
        return Sessions {
            url: url.trim_end_matches('/').to_string(),
            timeout: timeout.to_string(),
        };
    }
}

#[async_trait]
impl Backend for Sessions {
    fn name(&self) -> BackendName {
        return BackendName::Sessions;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("API URL is not defined");
        }

        let res = reqwest::Client::new()
            .get(format!("{url}/health", url = self.url))
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        if res.is_err() {
            tracing::error!(error = ?res.unwrap_err(), "Tutor backend is not reachable");
            bail!("Tutor backend is not reachable");
        }

        let status = res.unwrap().status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Tutor backend health check failed");
            bail!("Tutor backend health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn open_session(&self, proposed: &SessionId) -> Result<SessionId, DispatchError> {
        let mut metadata = HashMap::new();
        metadata.insert("client_session_id".to_string(), proposed.to_string());

        let res = reqwest::Client::new()
            .post(format!("{url}/api/chat/sessions", url = self.url))
            .json(&CreateSessionRequest { metadata })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Failed to create chat session");
            return Err(DispatchError::Server {
                status: status.as_u16(),
            });
        }

        let body = res.text().await?;
        let ores: CreateSessionResponse = serde_json::from_str(&body)?;
        if ores.session_id.is_empty() {
            return Err(DispatchError::Malformed(
                "session creation returned an empty id".to_string(),
            ));
        }

        return Ok(SessionId::new(&ores.session_id));
    }

    #[allow(clippy::implicit_return)]
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply, DispatchError> {
        let req = MessageRequest {
            message: request.message.to_string(),
            selected_text: request.selected_text.clone(),
        };

        let res = reqwest::Client::new()
            .post(format!(
                "{url}/api/chat/sessions/{session_id}/messages",
                url = self.url,
                session_id = request.session_id
            ))
            .json(&req)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                "Failed to make chat request to the tutor backend"
            );
            return Err(DispatchError::Server {
                status: status.as_u16(),
            });
        }

        let body = res.text().await?;
        let ores: ChatResponse = serde_json::from_str(&body)?;
        tracing::debug!(body = ?ores, "Chat response");

        return Ok(ChatReply {
            content: ores.assistant_message.content,
            sources: vec![],
            confidence: None,
            session_id: ores
                .session_id
                .filter(|e| return !e.is_empty())
                .map(|e| return SessionId::new(&e)),
            timestamp: ores
                .assistant_message
                .timestamp
                .as_deref()
                .and_then(parse_timestamp),
        });
    }

    #[allow(clippy::implicit_return)]
    async fn history(&self, session_id: &SessionId) -> Result<Vec<Message>> {
        let res = reqwest::Client::new()
            .get(format!(
                "{url}/api/chat/sessions/{session_id}/messages",
                url = self.url
            ))
            .send()
            .await?;

        if res.status().as_u16() == 404 {
            return Ok(vec![]);
        }
        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Failed to fetch chat history");
            bail!("Failed to fetch chat history");
        }

        let messages = res
            .json::<Vec<MessageResponse>>()
            .await?
            .into_iter()
            .map(|entry| {
                let msg = Message::new(Role::parse(&entry.role), &entry.content);
                if let Some(timestamp) = entry.timestamp.as_deref().and_then(parse_timestamp) {
                    return msg.with_timestamp(timestamp);
                }
                return msg;
            })
            .collect::<Vec<Message>>();

        return Ok(messages);
    }

    #[allow(clippy::implicit_return)]
    async fn clear_history(&self, _session_id: &SessionId) -> Result<()> {
        bail!("The sessions backend does not support clearing history. Use `sessions reset` to start over instead.");
    }
}
