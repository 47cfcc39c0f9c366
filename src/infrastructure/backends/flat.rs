#[cfg(test)]
#[path = "flat_test.rs"]
mod tests;

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
use crate::domain::models::SourceCitation;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CompletionRequest {
    message: String,
    session_id: String,
    selected_text: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SourceResponse {
    #[serde(default)]
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CompletionResponse {
    response: String,
    session_id: Option<String>,
    #[serde(default)]
    sources: Vec<SourceResponse>,
    confidence: Option<f64>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct HistoryMetadata {
    #[serde(default)]
    sources: Vec<SourceResponse>,
    confidence: Option<f64>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct HistoryMessage {
    role: String,
    content: String,
    created_at: Option<String>,
    metadata: Option<HistoryMetadata>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct HistoryResponse {
    messages: Vec<HistoryMessage>,
}

fn to_citations(sources: Vec<SourceResponse>) -> Vec<SourceCitation> {
    return sources
        .into_iter()
        .map(|source| {
            return SourceCitation {
                title: source.title,
                score: source.score,
            };
        })
        .collect();
}

/// Single `/api/chat` endpoint. Sessions are keyed by whatever id the client
/// sends; the backend creates them on first use.
pub struct Flat {
    url: String,
    timeout: String,
}

impl Default for Flat {
    fn default() -> Flat {
        return Flat::new(
            &Config::get(ConfigKey::ApiURL),
            &Config::get(ConfigKey::BackendHealthCheckTimeout),
        );
    }
}

impl Flat {
    pub fn new(url: &str, timeout: &str) -> Flat {
        return Flat {
            url: url.trim_end_matches('/').to_string(),
            timeout: timeout.to_string(),
        };
    }
}

#[async_trait]
impl Backend for Flat {
    fn name(&self) -> BackendName {
        return BackendName::Flat;
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
        return Ok(proposed.clone());
    }

    #[allow(clippy::implicit_return)]
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply, DispatchError> {
        let req = CompletionRequest {
            message: request.message.to_string(),
            session_id: request.session_id.to_string(),
            selected_text: request.selected_text.clone(),
        };

        let res = reqwest::Client::new()
            .post(format!("{url}/api/chat", url = self.url))
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
        let ores: CompletionResponse = serde_json::from_str(&body)?;
        tracing::debug!(body = ?ores, "Chat response");

        return Ok(ChatReply {
            content: ores.response,
            sources: to_citations(ores.sources),
            confidence: ores.confidence,
            session_id: ores
                .session_id
                .filter(|e| return !e.is_empty())
                .map(|e| return SessionId::new(&e)),
            timestamp: None,
        });
    }

    #[allow(clippy::implicit_return)]
    async fn history(&self, session_id: &SessionId) -> Result<Vec<Message>> {
        let res = reqwest::Client::new()
            .get(format!(
                "{url}/api/chat/history/{session_id}",
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
            .json::<HistoryResponse>()
            .await?
            .messages
            .into_iter()
            .map(|entry| {
                let mut msg = Message::new(Role::parse(&entry.role), &entry.content);
                if let Some(timestamp) = entry.created_at.as_deref().and_then(parse_timestamp) {
                    msg = msg.with_timestamp(timestamp);
                }
                if let Some(metadata) = entry.metadata {
                    msg = msg
                        .with_sources(to_citations(metadata.sources))
                        .with_confidence(metadata.confidence);
                }
                return msg;
            })
            .collect::<Vec<Message>>();

        return Ok(messages);
    }

    #[allow(clippy::implicit_return)]
    async fn clear_history(&self, session_id: &SessionId) -> Result<()> {
        let res = reqwest::Client::new()
            .delete(format!(
                "{url}/api/chat/history/{session_id}",
                url = self.url
            ))
            .send()
            .await?;

        let status = res.status().as_u16();
        if status == 404 {
            return Ok(());
        }
        if !res.status().is_success() {
            tracing::error!(status = status, "Failed to clear chat history");
            bail!("Failed to clear chat history");
        }

        return Ok(());
    }
}
