mod backend;
mod dispatch;
mod error;
mod event;
mod message;
mod role;
mod selection;
mod session;
mod slash_commands;
mod storage;

pub use backend::*;
pub use dispatch::*;
pub use error::*;
pub use event::*;
pub use message::*;
pub use role::*;
pub use selection::*;
pub use session::*;
pub use slash_commands::*;
pub use storage::*;
