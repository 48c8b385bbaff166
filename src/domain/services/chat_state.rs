#[cfg(test)]
#[path = "chat_state_test.rs"]
mod tests;

use anyhow::Result;

use super::HistoryReplay;
use super::ToolCallInterpreter;
use crate::domain::models::AgentResponse;
use crate::domain::models::HistoryEntry;
use crate::domain::models::Message;
use crate::domain::models::MessageStore;
use crate::domain::models::PersistedState;
use crate::domain::models::QueuedMessage;
use crate::domain::models::Role;
use crate::domain::models::Session;
use crate::domain::models::Visibility;

pub const SEND_FAILED_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// Everything needed to run one exchange once the state lock is released.
#[derive(Clone, Debug, PartialEq)]
pub struct ExchangePlan {
    pub content: String,
    pub conversation_id: Option<String>,
    pub history: Option<Vec<HistoryEntry>>,
    epoch: u64,
}

impl ExchangePlan {
    pub fn is_first_turn(&self) -> bool {
        return self.conversation_id.is_none();
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Admission {
    Rejected,
    Queued(QueuedMessage),
    Dispatch(ExchangePlan, Message),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExchangeOutcome {
    Answered(Message),
    Failed(Message),
    /// The session was replaced while the exchange was in flight.
    Discarded,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    epoch: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Failed,
    Discarded,
}

/// The session aggregate plus the bookkeeping that keeps exchanges serialized.
/// All transitions are synchronous; callers hold the lock for exactly one of
/// them and never across a transport call.
#[derive(Debug, Default)]
pub struct ChatState {
    pub session: Session,
    pub visibility: Visibility,
    epoch: u64,
    exchanging: bool,
    fetches: usize,
    load_seq: u64,
}

impl ChatState {
    /// Fullscreen is never restored.
    pub fn restore(&mut self, state: PersistedState) {
        self.replace(state.conversation_id, MessageStore::new(state.messages));
        self.visibility = Visibility {
            is_open: state.is_open,
            is_fullscreen: false,
            size: state.size,
        };
    }

    pub fn snapshot(&self) -> PersistedState {
        return PersistedState {
            is_open: self.visibility.is_open,
            conversation_id: self.session.conversation_id.clone(),
            messages: self.session.messages.to_vec(),
            size: self.visibility.size,
        };
    }

    fn sync_loading(&mut self) {
        self.session.is_loading = self.exchanging || self.fetches > 0;
    }

    fn begin_exchange(&mut self, content: &str) -> (ExchangePlan, Message) {
        let conversation_id = self.session.conversation_id.clone();
        let history = if conversation_id.is_none() {
            HistoryReplay::build(self.session.messages.as_slice())
        } else {
            None
        };

        let user_message = self
            .session
            .messages
            .append(Role::User, content, None)
            .clone();

        self.exchanging = true;
        self.session.error = None;
        self.sync_loading();

        let plan = ExchangePlan {
            content: content.to_string(),
            conversation_id,
            history,
            epoch: self.epoch,
        };

        return (plan, user_message);
    }

    /// Decides what happens to a send request: ignored when blank, queued when
    /// anything is in flight, dispatched otherwise.
    pub fn admit(&mut self, content: &str) -> Admission {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Admission::Rejected;
        }

        if self.session.is_loading {
            let queued = QueuedMessage::new(trimmed);
            self.session.queued_messages.push_back(queued.clone());
            return Admission::Queued(queued);
        }

        let (plan, user_message) = self.begin_exchange(trimmed);
        return Admission::Dispatch(plan, user_message);
    }

    /// Records the identity the agent assigned to a fresh conversation.
    pub fn adopt_created_session(&mut self, plan: &mut ExchangePlan, conversation_id: &str) {
        plan.conversation_id = Some(conversation_id.to_string());

        if plan.epoch == self.epoch && self.session.conversation_id.is_none() {
            self.session.conversation_id = Some(conversation_id.to_string());
        }
    }

    pub fn complete_exchange(
        &mut self,
        plan: &ExchangePlan,
        result: Result<AgentResponse>,
    ) -> ExchangeOutcome {
        if plan.epoch != self.epoch {
            tracing::debug!(
                epoch = plan.epoch,
                current_epoch = self.epoch,
                "Discarding reply for a replaced session"
            );
            return ExchangeOutcome::Discarded;
        }

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(error = ?err, "Exchange failed");
                let message = self
                    .session
                    .messages
                    .append(Role::Assistant, SEND_FAILED_MESSAGE, None)
                    .clone();
                self.session.error = Some(err.to_string());
                return ExchangeOutcome::Failed(message);
            }
        };

        let interpretation = ToolCallInterpreter::interpret(&response);
        let message = self
            .session
            .messages
            .append(
                Role::Assistant,
                &interpretation.content,
                interpretation.tool_calls,
            )
            .clone();

        let returned_id = response
            .conversation_id
            .filter(|conversation_id| return !conversation_id.is_empty());
        if let Some(returned_id) = returned_id {
            if let Some(held_id) = &self.session.conversation_id {
                if held_id != &returned_id {
                    tracing::warn!(
                        held = held_id.as_str(),
                        returned = returned_id.as_str(),
                        "Agent returned a different conversation id, adopting it"
                    );
                }
            }
            self.session.conversation_id = Some(returned_id);
        } else if self.session.conversation_id.is_none() {
            self.session.conversation_id = plan.conversation_id.clone();
        }

        self.session.pending_navigation = interpretation.navigation;

        return ExchangeOutcome::Answered(message);
    }

    /// Hands the in-flight slot straight to the next queued message, or
    /// releases it when the queue is empty. There is no gap in between for
    /// another send to slip into.
    pub fn take_next(&mut self) -> Option<(ExchangePlan, Message)> {
        match self.session.queued_messages.pop_front() {
            Some(queued) => {
                return Some(self.begin_exchange(&queued.content));
            }
            None => {
                self.exchanging = false;
                self.sync_loading();
                return None;
            }
        }
    }

    /// Starts draining a queue that built up behind something other than an
    /// exchange, such as a failed fetch.
    pub fn resume(&mut self) -> Option<(ExchangePlan, Message)> {
        if self.session.is_loading {
            return None;
        }

        let queued = self.session.queued_messages.pop_front()?;
        return Some(self.begin_exchange(&queued.content));
    }

    pub fn remove_queued(&mut self, id: &str) -> bool {
        let before = self.session.queued_messages.len();
        self.session
            .queued_messages
            .retain(|queued| return queued.id != id);

        return self.session.queued_messages.len() != before;
    }

    /// Swaps in a different conversation. Replies and fetches started before
    /// the swap are ignored when they land.
    pub fn replace(&mut self, conversation_id: Option<String>, messages: MessageStore) {
        self.epoch += 1;
        self.session.conversation_id = conversation_id;
        self.session.messages = messages;
        self.session.queued_messages.clear();
        self.session.error = None;
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.fetches += 1;
        self.load_seq += 1;
        self.session.error = None;
        self.sync_loading();

        return FetchTicket {
            seq: self.load_seq,
            epoch: self.epoch,
        };
    }

    /// Only the latest load applies, and only when nothing replaced the
    /// session since it started.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        conversation_id: &str,
        result: Result<MessageStore>,
    ) -> FetchOutcome {
        self.fetches = self.fetches.saturating_sub(1);
        let is_current = ticket.seq == self.load_seq && ticket.epoch == self.epoch;

        let outcome = match result {
            Ok(messages) if is_current => {
                self.replace(Some(conversation_id.to_string()), messages);
                FetchOutcome::Applied
            }
            Err(err) if is_current => {
                self.session.error = Some(err.to_string());
                FetchOutcome::Failed
            }
            _ => FetchOutcome::Discarded,
        };

        self.sync_loading();
        return outcome;
    }
}
