use super::DispatchOutcome;
use super::SelectionEvent;

pub enum Event {
    DispatchCompleted(DispatchOutcome),
    InputClosed(),
    InputLine(String),
    Selection(SelectionEvent),
}
