/// A passage long enough to qualify as a selection, copied from a robotics
/// chapter.
pub fn excerpt_fixture() -> &'static str {
    return "torque control loops";
}

/// Body returned by the flat `/api/chat` endpoint.
pub fn flat_reply_fixture() -> &'static str {
    return r#"
{
  "response": "ROS 2 is the second generation of the Robot Operating System.",
  "session_id": "session-1700000000000-abcdefghi",
  "sources": [
    { "title": "Chapter 1: Introduction to ROS 2", "score": 0.91 },
    { "title": "Chapter 3: Nodes and Topics" }
  ],
  "confidence": 0.82
}
"#
    .trim();
}

/// Body returned by the flat history endpoint.
pub fn flat_history_fixture() -> &'static str {
    return r#"
{
  "session_id": "session-1700000000000-abcdefghi",
  "messages": [
    {
      "id": 1,
      "role": "user",
      "content": "What is ROS 2?",
      "context": null,
      "metadata": null,
      "created_at": "2024-01-01T10:00:00"
    },
    {
      "id": 2,
      "role": "assistant",
      "content": "ROS 2 is the second generation of the Robot Operating System.",
      "context": null,
      "metadata": {
        "sources": [{ "title": "Chapter 1: Introduction to ROS 2", "score": 0.91 }],
        "confidence": 0.82
      },
      "created_at": "2024-01-01T10:00:02"
    }
  ]
}
"#
    .trim();
}
