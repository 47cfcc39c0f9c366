/// Where the "ask about this" affordance should be drawn, in screen
/// coordinates of the surface that produced the selection. Line-based
/// surfaces have no such position and publish the origin; the hint is
/// printed inline instead.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub text: String,
    pub anchor: Anchor,
}

/// Discrete notification from whatever surface tracks the user's selection.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectionEvent {
    Changed(Selection),
    Cleared,
}
