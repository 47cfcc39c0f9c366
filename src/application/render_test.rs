use super::format_message;
use super::format_selection_hint;
use super::preview;
use crate::domain::models::Anchor;
use crate::domain::models::Message;
use crate::domain::models::Role;
use crate::domain::models::Selection;
use crate::domain::models::SourceCitation;

#[test]
fn it_formats_replies_with_citations() {
    let message = Message::new(
        Role::Assistant,
        "ROS 2 is the second generation of the Robot Operating System.",
    )
    .with_sources(vec![
        SourceCitation {
            title: "Chapter 1: Introduction to ROS 2".to_string(),
            score: Some(0.91),
        },
        SourceCitation {
            title: "Chapter 3: Nodes and Topics".to_string(),
            score: None,
        },
    ])
    .with_confidence(Some(0.82));

    insta::assert_snapshot!(format_message(&message, "Tutor"), @r###"
    Tutor: ROS 2 is the second generation of the Robot Operating System.
        [1] Chapter 1: Introduction to ROS 2 (91%)
        [2] Chapter 3: Nodes and Topics
        Confidence: 82%
    "###);
}

#[test]
fn it_formats_plain_messages() {
    let message = Message::new(Role::User, "What is ROS 2?");
    assert_eq!(format_message(&message, "ada"), "ada: What is ROS 2?");
}

#[test]
fn it_keeps_short_previews() {
    assert_eq!(preview("torque   control\nloops"), "torque control loops");
}

#[test]
fn it_truncates_long_previews() {
    let text = "a".repeat(100);
    let res = preview(&text);
    assert_eq!(res.chars().count(), 60);
    assert!(res.ends_with("..."));
}

#[test]
fn it_formats_selection_hints() {
    let selection = Selection {
        text: "torque control loops".to_string(),
        anchor: Anchor::default(),
    };

    insta::assert_snapshot!(format_selection_hint(&selection), @r###"Selected "torque control loops". Use /ask [QUESTION] to ask about it, or /dismiss."###);
}
