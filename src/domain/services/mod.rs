mod app_state;
mod dispatcher;
mod selection_capture;
mod selection_events;
mod sessions;

pub use app_state::*;
pub use dispatcher::*;
pub use selection_capture::*;
pub use selection_events::*;
pub use sessions::*;
