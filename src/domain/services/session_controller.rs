#[cfg(test)]
#[path = "session_controller_test.rs"]
mod tests;

use std::sync::Arc;

use parking_lot::Mutex;

use super::ChatState;
use super::ExchangePlan;
use super::FetchOutcome;
use super::Publisher;
use super::SendQueue;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::MessageStore;
use crate::domain::models::NavigationIntent;
use crate::domain::models::PersistedState;
use crate::domain::models::QueuedMessage;
use crate::domain::models::Session;
use crate::domain::models::Size;
use crate::domain::models::TransportBox;

/// Owns one assistant session. Share it through an `Arc`; every operation
/// takes `&self` and failures end up in the session's `error` instead of
/// being returned.
pub struct SessionController {
    state: Arc<Mutex<ChatState>>,
    transport: Arc<TransportBox>,
    publisher: Arc<Publisher>,
    queue: SendQueue,
}

impl SessionController {
    pub fn new(transport: TransportBox, agent_kind: &str, publisher: Publisher) -> SessionController {
        let state = Arc::new(Mutex::new(ChatState::default()));
        let transport = Arc::new(transport);
        let publisher = Arc::new(publisher);
        let queue = SendQueue::new(
            Arc::clone(&state),
            Arc::clone(&transport),
            Arc::clone(&publisher),
            agent_kind,
        );

        return SessionController {
            state,
            transport,
            publisher,
            queue,
        };
    }

    pub fn restore(&self, persisted: PersistedState) {
        self.state.lock().restore(persisted);
        self.publisher.emit(Event::SessionReplaced());
    }

    pub fn snapshot(&self) -> PersistedState {
        return self.state.lock().snapshot();
    }

    pub fn session(&self) -> Session {
        return self.state.lock().session.clone();
    }

    pub fn conversation_id(&self) -> Option<String> {
        return self.state.lock().session.conversation_id.clone();
    }

    pub fn messages(&self) -> Vec<Message> {
        return self.state.lock().session.messages.to_vec();
    }

    pub fn is_loading(&self) -> bool {
        return self.state.lock().session.is_loading;
    }

    pub fn queued_messages(&self) -> Vec<QueuedMessage> {
        return self
            .state
            .lock()
            .session
            .queued_messages
            .iter()
            .cloned()
            .collect();
    }

    pub fn error(&self) -> Option<String> {
        return self.state.lock().session.error.clone();
    }

    pub fn pending_navigation(&self) -> Option<NavigationIntent> {
        return self.state.lock().session.pending_navigation.clone();
    }

    pub fn is_open(&self) -> bool {
        return self.state.lock().visibility.is_open;
    }

    pub fn is_fullscreen(&self) -> bool {
        return self.state.lock().visibility.is_fullscreen;
    }

    pub fn size(&self) -> Size {
        return self.state.lock().visibility.size;
    }

    pub async fn send_message(&self, content: &str) {
        self.queue.submit(content).await;
    }

    /// The synchronous half of `send_message`. Callers that spawn exchanges
    /// admit here first so that input order is kept, then hand the returned
    /// exchange to `run_exchange`.
    pub fn admit_message(&self, content: &str) -> Option<(ExchangePlan, Message)> {
        return self.queue.admit(content);
    }

    pub async fn run_exchange(&self, plan: ExchangePlan, user_message: Message) {
        self.queue.drain(plan, user_message).await;
    }

    pub fn remove_queued_message(&self, id: &str) -> bool {
        let removed = self.state.lock().remove_queued(id);
        if !removed {
            tracing::debug!(id, "No queued message to remove");
        }

        return removed;
    }

    pub async fn start_new_chat(&self) {
        self.state.lock().replace(None, MessageStore::default());
        tracing::debug!("Started new chat");

        self.publisher.emit(Event::SessionReplaced());
        self.publisher.persist(&self.state).await;
    }

    pub async fn load_conversation(&self, conversation_id: &str, messages: Vec<Message>) {
        self.state.lock().replace(
            Some(conversation_id.to_string()),
            MessageStore::new(messages),
        );
        tracing::debug!(conversation_id, "Loaded conversation");

        self.publisher.emit(Event::SessionReplaced());
        self.publisher.persist(&self.state).await;
    }

    /// Replaces the session with a conversation stored by the agent. When
    /// several loads overlap only the one started last is applied.
    pub async fn load_conversation_from_db(&self, conversation_id: &str) {
        let ticket = self.state.lock().begin_fetch();

        let result = self
            .transport
            .fetch_messages(conversation_id)
            .await
            .map(MessageStore::from_records);

        let (outcome, resumed) = {
            let mut state = self.state.lock();
            let outcome = state.complete_fetch(ticket, conversation_id, result);
            (outcome, state.resume())
        };

        match outcome {
            FetchOutcome::Applied => {
                tracing::debug!(conversation_id, "Loaded conversation from agent");
                self.publisher.emit(Event::SessionReplaced());
                self.publisher.persist(&self.state).await;
            }
            FetchOutcome::Failed => {
                tracing::debug!(conversation_id, "Failed to load conversation from agent");
            }
            FetchOutcome::Discarded => {
                tracing::debug!(conversation_id, "Dropping superseded conversation load");
            }
        }

        if let Some((plan, user_message)) = resumed {
            self.queue.drain(plan, user_message).await;
        }
    }

    pub fn clear_pending_navigation(&self) {
        self.state.lock().session.pending_navigation = None;
    }

    pub async fn set_open(&self, is_open: bool) {
        self.state.lock().visibility.is_open = is_open;
        self.publisher.persist(&self.state).await;
    }

    pub async fn toggle_open(&self) {
        {
            let mut state = self.state.lock();
            state.visibility.is_open = !state.visibility.is_open;
        }
        self.publisher.persist(&self.state).await;
    }

    pub async fn set_size(&self, size: Size) {
        self.state.lock().visibility.size = size;
        self.publisher.persist(&self.state).await;
    }

    pub fn set_fullscreen(&self, is_fullscreen: bool) {
        self.state.lock().visibility.is_fullscreen = is_fullscreen;
    }

    pub fn toggle_fullscreen(&self) {
        let mut state = self.state.lock();
        state.visibility.is_fullscreen = !state.visibility.is_fullscreen;
    }
}
