use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use parking_lot::Mutex;

use super::Admission;
use super::ChatState;
use super::ExchangeOutcome;
use super::ExchangePlan;
use super::Publisher;
use crate::domain::models::AgentRequest;
use crate::domain::models::AgentResponse;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::TransportBox;
use crate::domain::models::DEFAULT_TOPIC;

/// Runs exchanges with the agent one at a time, in the order they were
/// submitted.
pub struct SendQueue {
    state: Arc<Mutex<ChatState>>,
    transport: Arc<TransportBox>,
    publisher: Arc<Publisher>,
    agent_kind: String,
}

impl SendQueue {
    pub fn new(
        state: Arc<Mutex<ChatState>>,
        transport: Arc<TransportBox>,
        publisher: Arc<Publisher>,
        agent_kind: &str,
    ) -> SendQueue {
        return SendQueue {
            state,
            transport,
            publisher,
            agent_kind: agent_kind.to_string(),
        };
    }

    /// Admits a message under the state lock. Returns the exchange to run
    /// when the message starts one; otherwise it was queued or rejected.
    /// Calls made in sequence are admitted in that order.
    pub fn admit(&self, content: &str) -> Option<(ExchangePlan, Message)> {
        let admission = self.state.lock().admit(content);

        match admission {
            Admission::Rejected => {
                tracing::debug!("Ignoring empty message");
                return None;
            }
            Admission::Queued(queued) => {
                tracing::debug!(id = queued.id.as_str(), "Exchange in flight, queued message");
                self.publisher.emit(Event::MessageQueued(queued));
                return None;
            }
            Admission::Dispatch(plan, user_message) => {
                return Some((plan, user_message));
            }
        }
    }

    /// Resolves once this message and everything queued behind it while it
    /// ran have been answered. A message that only got queued resolves
    /// immediately.
    pub async fn submit(&self, content: &str) {
        if let Some((plan, user_message)) = self.admit(content) {
            self.drain(plan, user_message).await;
        }
    }

    /// Works through exchanges until the queue is empty. The state lock is
    /// only taken between transport calls.
    pub async fn drain(&self, plan: ExchangePlan, user_message: Message) {
        let mut next = Some((plan, user_message));

        while let Some((mut plan, user_message)) = next {
            self.publisher.emit(Event::MessageAppended(user_message));
            self.publisher.persist(&self.state).await;

            let result = self.exchange(&mut plan).await;
            let (outcome, following) = {
                let mut state = self.state.lock();
                let outcome = state.complete_exchange(&plan, result);
                (outcome, state.take_next())
            };

            match outcome {
                ExchangeOutcome::Answered(message) => {
                    self.publisher.emit(Event::MessageAppended(message));
                    self.publisher.emit(Event::ConversationsInvalidated());
                    self.publisher.persist(&self.state).await;
                }
                ExchangeOutcome::Failed(message) => {
                    self.publisher.emit(Event::MessageAppended(message));
                    self.publisher.persist(&self.state).await;
                }
                ExchangeOutcome::Discarded => {}
            }

            next = following;
        }
    }

    async fn exchange(&self, plan: &mut ExchangePlan) -> Result<AgentResponse> {
        if plan.is_first_turn() {
            let created = self
                .transport
                .create_session(&self.agent_kind, DEFAULT_TOPIC)
                .await?;
            if created.id.is_empty() {
                bail!("Agent created a conversation without an id");
            }

            tracing::debug!(conversation_id = created.id.as_str(), "Created conversation");
            self.state.lock().adopt_created_session(plan, &created.id);
            self.publisher.persist(&self.state).await;
        }

        let request = AgentRequest {
            content: plan.content.to_string(),
            agent_kind: self.agent_kind.to_string(),
            context: None,
            conversation_id: plan.conversation_id.clone(),
            history: plan.history.clone(),
        };

        return self.transport.send(request).await;
    }
}
