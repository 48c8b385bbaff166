#[cfg(test)]
#[path = "message_store_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::NaiveDateTime;
use chrono::TimeZone;
use chrono::Utc;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Message;
use super::RawToolCall;
use super::Role;
use super::StoredMessage;
use super::ToolCall;

/// Ordered, append-only log of a session's messages. Insertion order is
/// display order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageStore {
    messages: Vec<Message>,
}

fn parse_created_at(created_at: &str) -> Option<i64> {
    if let Ok(date) = DateTime::parse_from_rfc3339(created_at) {
        return Some(date.timestamp_millis());
    }

    if let Ok(date) = NaiveDateTime::parse_from_str(created_at, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&date).timestamp_millis());
    }

    return None;
}

impl MessageStore {
    pub fn new(messages: Vec<Message>) -> MessageStore {
        return MessageStore { messages };
    }

    /// Maps an agent's stored records into displayable messages. Tool records
    /// are folded into their assistant message by the agent already, so they
    /// are dropped along with any role this client doesn't know.
    pub fn from_records(records: Vec<StoredMessage>) -> MessageStore {
        let now = Message::now();
        let messages = records
            .into_iter()
            .enumerate()
            .filter_map(|(idx, record)| {
                let role = match Role::parse(&record.role) {
                    Some(Role::Tool) => return None,
                    Some(role) => role,
                    None => {
                        tracing::debug!(role = %record.role, "Dropping record with unknown role");
                        return None;
                    }
                };

                let timestamp = record
                    .created_at
                    .as_deref()
                    .and_then(parse_created_at)
                    .unwrap_or(now);

                let tool_calls = record.tool_calls.map(|tool_calls| {
                    return tool_calls
                        .iter()
                        .filter_map(RawToolCall::from_value)
                        .map(|raw| return ToolCall::completed(&raw.name, raw.args, raw.result))
                        .collect::<Vec<ToolCall>>();
                });

                return Some(Message {
                    id: record.id.unwrap_or_else(|| return format!("{idx}-{now}")),
                    role,
                    content: record.content.unwrap_or_default(),
                    timestamp,
                    tool_calls,
                });
            })
            .collect::<Vec<Message>>();

        return MessageStore { messages };
    }

    /// Appends a message with a fresh id and the current timestamp.
    pub fn append(
        &mut self,
        role: Role,
        content: &str,
        tool_calls: Option<Vec<ToolCall>>,
    ) -> &Message {
        self.messages
            .push(Message::new_with_tool_calls(role, content, tool_calls));

        let idx = self.messages.len() - 1;
        return &self.messages[idx];
    }

    pub fn as_slice(&self) -> &[Message] {
        return &self.messages;
    }

    pub fn to_vec(&self) -> Vec<Message> {
        return self.messages.clone();
    }

    pub fn len(&self) -> usize {
        return self.messages.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.messages.is_empty();
    }

    pub fn last(&self) -> Option<&Message> {
        return self.messages.last();
    }
}
