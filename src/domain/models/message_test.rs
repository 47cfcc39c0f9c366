use super::Message;
use super::MessageType;
use super::Role;
use super::SourceCitation;

#[test]
fn it_executes_new() {
    let msg = Message::new(Role::Assistant, "Hi there!");
    assert_eq!(msg.role, Role::Assistant);
    assert_eq!(msg.content, "Hi there!".to_string());
    assert_eq!(msg.mtype, MessageType::Normal);
    assert!(msg.sources.is_empty());
    assert_eq!(msg.confidence, None);
}

#[test]
fn it_executes_new_replacing_tabs() {
    let msg = Message::new(Role::User, "\t\tHi there!");
    assert_eq!(msg.content, "    Hi there!".to_string());
}

#[test]
fn it_executes_new_with_type() {
    let msg = Message::new_with_type(Role::Assistant, MessageType::Error, "It broke!");
    assert_eq!(msg.role, Role::Assistant);
    assert_eq!(msg.content, "It broke!".to_string());
    assert_eq!(msg.message_type(), MessageType::Error);
}

#[test]
fn it_attaches_sources_and_confidence() {
    let msg = Message::new(Role::Assistant, "ROS 2 is...")
        .with_sources(vec![SourceCitation {
            title: "Chapter 1".to_string(),
            score: Some(0.9),
        }])
        .with_confidence(Some(0.75));

    assert_eq!(msg.sources.len(), 1);
    assert_eq!(msg.confidence, Some(0.75));
}

#[test]
fn it_formats_citation_lines() {
    let msg = Message::new(Role::Assistant, "ROS 2 is...")
        .with_sources(vec![
            SourceCitation {
                title: "Chapter 1: Introduction".to_string(),
                score: Some(0.914),
            },
            SourceCitation {
                title: "Chapter 3: Nodes".to_string(),
                score: None,
            },
        ])
        .with_confidence(Some(0.8));

    insta::assert_snapshot!(msg.citation_lines().join("\n"), @r###"
    [1] Chapter 1: Introduction (91%)
    [2] Chapter 3: Nodes
    Confidence: 80%
    "###);
}

#[test]
fn it_has_no_citation_lines_for_plain_messages() {
    let msg = Message::new(Role::User, "What is ROS 2?");
    assert!(msg.citation_lines().is_empty());
}

#[test]
fn it_parses_roles() {
    assert_eq!(Role::parse("user"), Role::User);
    assert_eq!(Role::parse("USER"), Role::User);
    assert_eq!(Role::parse("assistant"), Role::Assistant);
    assert_eq!(Role::parse("system"), Role::Assistant);
}
