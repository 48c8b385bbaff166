#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use chrono::Utc;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use uuid::Uuid;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn parse(text: &str) -> Option<Role> {
        match text {
            "user" => return Some(Role::User),
            "assistant" => return Some(Role::Assistant),
            "tool" => return Some(Role::Tool),
            _ => return None,
        }
    }
}

/// Lifecycle of a tool invocation. Replies from a finished exchange only ever
/// carry `Completed`; the other states are reserved for streamed responses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallStatus {
    Pending,
    Running,
    Completed,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub args: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    pub status: ToolCallStatus,
}

impl ToolCall {
    pub fn completed(
        name: &str,
        args: serde_json::Value,
        result: Option<serde_json::Value>,
    ) -> ToolCall {
        return ToolCall {
            name: name.to_string(),
            args,
            result,
            status: ToolCallStatus::Completed,
        };
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Milliseconds since the unix epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Message {
        return Message {
            id: Message::create_id(),
            role,
            content: content.to_string(),
            timestamp: Message::now(),
            tool_calls: None,
        };
    }

    pub fn new_with_tool_calls(
        role: Role,
        content: &str,
        tool_calls: Option<Vec<ToolCall>>,
    ) -> Message {
        let mut message = Message::new(role, content);
        message.tool_calls = tool_calls;
        return message;
    }

    pub fn create_id() -> String {
        return Uuid::new_v4().to_string();
    }

    pub fn now() -> i64 {
        return Utc::now().timestamp_millis();
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        return self.tool_calls.as_deref().unwrap_or_default();
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedMessage {
    pub id: String,
    pub content: String,
}

impl QueuedMessage {
    pub fn new(content: &str) -> QueuedMessage {
        return QueuedMessage {
            id: Message::create_id(),
            content: content.to_string(),
        };
    }
}
