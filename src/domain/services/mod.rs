mod chat_state;
mod history_replay;
mod publisher;
mod send_queue;
mod session_controller;
mod snapshots;
mod tool_calls;

pub use chat_state::*;
pub use history_replay::*;
pub use publisher::*;
pub use send_queue::*;
pub use session_controller::*;
pub use snapshots::*;
pub use tool_calls::*;
