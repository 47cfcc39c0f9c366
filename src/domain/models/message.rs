#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Utc;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Role;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    Normal,
    Error,
}

/// A reference the backend attached to a reply. Displayed, never validated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub sources: Vec<SourceCitation>,
    pub confidence: Option<f64>,
    mtype: MessageType,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Message {
        return Message::new_with_type(role, MessageType::Normal, content);
    }

    pub fn new_with_type(role: Role, mtype: MessageType, content: &str) -> Message {
        return Message {
            role,
            content: content.replace('\t', "  "),
            timestamp: Utc::now(),
            sources: vec![],
            confidence: None,
            mtype,
        };
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Message {
        self.timestamp = timestamp;
        return self;
    }

    pub fn with_sources(mut self, sources: Vec<SourceCitation>) -> Message {
        self.sources = sources;
        return self;
    }

    pub fn with_confidence(mut self, confidence: Option<f64>) -> Message {
        self.confidence = confidence;
        return self;
    }

    pub fn message_type(&self) -> MessageType {
        return self.mtype;
    }

    /// Footer rendered under assistant replies, listing citations and the
    /// confidence score when the backend supplied them.
    pub fn citation_lines(&self) -> Vec<String> {
        let mut lines = self
            .sources
            .iter()
            .enumerate()
            .map(|(idx, source)| {
                let n = idx + 1;
                if let Some(score) = source.score {
                    return format!("[{n}] {} ({:.0}%)", source.title, score * 100.0);
                }
                return format!("[{n}] {}", source.title);
            })
            .collect::<Vec<String>>();

        if let Some(confidence) = self.confidence {
            lines.push(format!("Confidence: {:.0}%", confidence * 100.0));
        }

        return lines;
    }
}
