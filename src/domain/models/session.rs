use std::collections::VecDeque;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Message;
use super::MessageStore;
use super::NavigationIntent;
use super::QueuedMessage;

/// Everything one assistant chat knows about itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub conversation_id: Option<String>,
    pub messages: MessageStore,
    pub is_loading: bool,
    pub queued_messages: VecDeque<QueuedMessage>,
    pub error: Option<String>,
    pub pending_navigation: Option<NavigationIntent>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Default for Size {
    fn default() -> Size {
        return Size {
            width: 380,
            height: 520,
        };
    }
}

/// How the assistant panel is presented. Independent from the conversation it
/// shows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Visibility {
    pub is_open: bool,
    pub is_fullscreen: bool,
    pub size: Size,
}

/// The only fields that survive a restart. Loading flags, the queue, errors,
/// fullscreen and navigation are all session local.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub is_open: bool,
    pub conversation_id: Option<String>,
    pub messages: Vec<Message>,
    pub size: Size,
}

#[derive(Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    pub timestamp: String,
    pub state: PersistedState,
}
