use super::Message;
use super::QueuedMessage;

/// Notifications published by a session controller. Readers use them to know
/// when to look at the controller again; they carry no authority of their own.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    MessageAppended(Message),
    MessageQueued(QueuedMessage),
    ConversationsInvalidated(),
    SessionReplaced(),
}
