use chrono::TimeZone;
use chrono::Utc;

use super::BackendName;
use super::ChatReply;
use super::Role;
use super::SessionId;
use super::SourceCitation;
use crate::domain::models::MessageType;

#[test]
fn it_parses_backend_names() {
    assert_eq!(
        BackendName::parse("flat".to_string()),
        Some(BackendName::Flat)
    );
    assert_eq!(
        BackendName::parse("sessions".to_string()),
        Some(BackendName::Sessions)
    );
    assert_eq!(BackendName::parse("ollama".to_string()), None);
}

#[test]
fn it_displays_backend_names() {
    assert_eq!(BackendName::Flat.to_string(), "flat");
    assert_eq!(BackendName::Sessions.to_string(), "sessions");
}

#[test]
fn it_converts_reply_to_assistant_message() {
    let reply = ChatReply {
        content: "ROS 2 is...".to_string(),
        sources: vec![SourceCitation {
            title: "Chapter 1".to_string(),
            score: None,
        }],
        confidence: Some(0.5),
        session_id: Some(SessionId::new("abc")),
        timestamp: None,
    };

    let msg = reply.into_message();
    assert_eq!(msg.role, Role::Assistant);
    assert_eq!(msg.content, "ROS 2 is...");
    assert_eq!(msg.sources.len(), 1);
    assert_eq!(msg.confidence, Some(0.5));
    assert_eq!(msg.message_type(), MessageType::Normal);
}

#[test]
fn it_keeps_backend_timestamp() {
    let timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
    let reply = ChatReply {
        content: "Hello".to_string(),
        timestamp: Some(timestamp),
        ..ChatReply::default()
    };

    assert_eq!(reply.into_message().timestamp, timestamp);
}
