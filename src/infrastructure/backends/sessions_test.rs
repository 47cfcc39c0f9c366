use anyhow::Result;
use mockito::Matcher;
use serde_json::json;

use super::ChatResponse;
use super::CreateSessionResponse;
use super::MessageResponse;
use super::Sessions;
use crate::domain::models::Backend;
use crate::domain::models::ChatRequest;
use crate::domain::models::DispatchError;
use crate::domain::models::Role;
use crate::domain::models::SessionId;

impl Sessions {
    fn with_url(url: String) -> Sessions {
        return Sessions {
            url,
            timeout: "200".to_string(),
        };
    }
}

const SERVER_ID: &str = "9d3c0f3a-55b1-4c61-a1b1-3f1c1d2e9a10";

#[tokio::test]
async fn it_successfully_health_checks() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("GET", "/health").with_status(200).create();

    let backend = Sessions::with_url(server.url());
    assert!(backend.health_check().await.is_ok());
    mock.assert();
}

#[tokio::test]
async fn it_fails_health_checks() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("GET", "/health").with_status(503).create();

    let backend = Sessions::with_url(server.url());
    assert!(backend.health_check().await.is_err());
    mock.assert();
}

#[tokio::test]
async fn it_opens_server_sessions() -> Result<()> {
    let body = serde_json::to_string(&CreateSessionResponse {
        session_id: SERVER_ID.to_string(),
    })?;

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat/sessions")
        .match_body(Matcher::Json(json!({
            "metadata": { "client_session_id": "session-1-abc" }
        })))
        .with_status(200)
        .with_body(body)
        .create();

    let backend = Sessions::with_url(server.url());
    let id = backend.open_session(&SessionId::new("session-1-abc")).await?;
    mock.assert();

    assert_eq!(id, SessionId::new(SERVER_ID));
    return Ok(());
}

#[tokio::test]
async fn it_fails_to_open_sessions_with_empty_ids() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat/sessions")
        .with_status(200)
        .with_body(r#"{"session_id": ""}"#)
        .create();

    let backend = Sessions::with_url(server.url());
    let err = backend
        .open_session(&SessionId::new("session-1-abc"))
        .await
        .unwrap_err();
    mock.assert();

    assert!(matches!(err, DispatchError::Malformed(_)));
}

#[tokio::test]
async fn it_sends_messages() -> Result<()> {
    let body = serde_json::to_string(&ChatResponse {
        session_id: Some(SERVER_ID.to_string()),
        assistant_message: MessageResponse {
            role: "assistant".to_string(),
            content: "ROS 2 is...".to_string(),
            timestamp: Some("2024-01-01T10:00:02.123456".to_string()),
        },
    })?;

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", format!("/api/chat/sessions/{SERVER_ID}/messages").as_str())
        .match_body(Matcher::Json(json!({
            "message": "explain this",
            "selected_text": "torque control loops"
        })))
        .with_status(200)
        .with_body(body)
        .create();

    let backend = Sessions::with_url(server.url());
    let reply = backend
        .send_message(&ChatRequest {
            message: "explain this".to_string(),
            session_id: SessionId::new(SERVER_ID),
            selected_text: Some("torque control loops".to_string()),
        })
        .await?;
    mock.assert();

    assert_eq!(reply.content, "ROS 2 is...");
    assert_eq!(reply.session_id, Some(SessionId::new(SERVER_ID)));
    assert!(reply.sources.is_empty());
    assert_eq!(
        reply.timestamp.unwrap().to_rfc3339(),
        "2024-01-01T10:00:02.123456+00:00"
    );

    return Ok(());
}

#[tokio::test]
async fn it_fails_on_unknown_sessions() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat/sessions/missing/messages")
        .with_status(404)
        .with_body(r#"{"detail": "Session not found"}"#)
        .create();

    let backend = Sessions::with_url(server.url());
    let err = backend
        .send_message(&ChatRequest {
            message: "hello".to_string(),
            session_id: SessionId::new("missing"),
            selected_text: None,
        })
        .await
        .unwrap_err();
    mock.assert();

    assert!(matches!(err, DispatchError::Server { status: 404 }));
}

#[tokio::test]
async fn it_lists_history() -> Result<()> {
    let body = serde_json::to_string(&vec![
        MessageResponse {
            role: "user".to_string(),
            content: "What is ROS 2?".to_string(),
            timestamp: Some("2024-01-01T10:00:00Z".to_string()),
        },
        MessageResponse {
            role: "assistant".to_string(),
            content: "ROS 2 is...".to_string(),
            timestamp: None,
        },
    ])?;

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", format!("/api/chat/sessions/{SERVER_ID}/messages").as_str())
        .with_status(200)
        .with_body(body)
        .create();

    let backend = Sessions::with_url(server.url());
    let messages = backend.history(&SessionId::new(SERVER_ID)).await?;
    mock.assert();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].timestamp.to_rfc3339(), "2024-01-01T10:00:00+00:00");
    assert_eq!(messages[1].role, Role::Assistant);

    return Ok(());
}

#[tokio::test]
async fn it_does_not_clear_history() {
    let backend = Sessions::with_url("http://localhost:1".to_string());
    let err = backend
        .clear_history(&SessionId::new(SERVER_ID))
        .await
        .unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"The sessions backend does not support clearing history. Use `sessions reset` to start over instead.");
}
