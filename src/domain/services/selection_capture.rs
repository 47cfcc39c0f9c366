#[cfg(test)]
#[path = "selection_capture_test.rs"]
mod tests;

use crate::domain::models::Selection;
use crate::domain::models::SelectionEvent;

/// Tracks the one excerpt the user may ask about next. Short selections
/// are treated as incidental clicks and ignored.
pub struct SelectionCapture {
    min_length: usize,
    current: Option<Selection>,
}

impl SelectionCapture {
    pub fn new(min_length: usize) -> SelectionCapture {
        return SelectionCapture {
            min_length,
            current: None,
        };
    }

    pub fn qualifies(&self, text: &str) -> bool {
        return text.trim().chars().count() > self.min_length;
    }

    /// Returns whether the event left a qualifying excerpt behind, meaning the
    /// "ask about this" affordance should be shown.
    pub fn observe(&mut self, event: &SelectionEvent) -> bool {
        match event {
            SelectionEvent::Changed(selection) if self.qualifies(&selection.text) => {
                self.current = Some(Selection {
                    text: selection.text.trim().to_string(),
                    anchor: selection.anchor,
                });
                return true;
            }
            _ => {
                self.current = None;
                return false;
            }
        }
    }

    pub fn current(&self) -> Option<&Selection> {
        return self.current.as_ref();
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// The excerpt to attach to the next outbound message. It stays captured
    /// until a reply for it arrives, so a failed send can be retried.
    pub fn excerpt(&self) -> Option<String> {
        return self.current.as_ref().map(|e| return e.text.clone());
    }

    /// Clears the excerpt once a reply about `text` arrived. A selection made
    /// while the message was in flight is kept.
    pub fn consume(&mut self, text: &str) -> bool {
        match &self.current {
            Some(selection) if selection.text == text => {
                self.current = None;
                return true;
            }
            _ => {
                return false;
            }
        }
    }
}
