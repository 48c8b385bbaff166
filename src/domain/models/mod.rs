mod event;
mod message;
mod message_store;
mod navigation;
mod session;
mod slash_commands;
mod transport;

pub use event::*;
pub use message::*;
pub use message_store::*;
pub use navigation::*;
pub use session::*;
pub use slash_commands::*;
pub use transport::*;
