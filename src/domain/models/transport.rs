#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserializer;
use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Topic given to every conversation the assistant opens on its own.
pub const DEFAULT_TOPIC: &str = "new";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedSession {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryToolCall {
    pub name: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub arguments: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryToolResult {
    pub name: String,
    pub output: serde_json::Value,
}

/// One prior turn forwarded to an agent that has no server side record of the
/// conversation yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum HistoryEntry {
    User {
        content: String,
    },
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<HistoryToolCall>>,
    },
    Tool {
        tool_result: HistoryToolResult,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    #[serde(rename = "message")]
    pub content: String,
    #[serde(rename = "agentId")]
    pub agent_kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryEntry>>,
}

/// A tool invocation as reported by the agent. Built leniently so a malformed
/// entry never fails the exchange it arrived in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawToolCall {
    pub name: String,
    pub args: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl RawToolCall {
    /// Objects keep whatever fields they have, bare strings are taken as the
    /// tool name, anything else is not a tool call.
    pub fn from_value(value: &serde_json::Value) -> Option<RawToolCall> {
        if let Some(name) = value.as_str() {
            return Some(RawToolCall {
                name: name.to_string(),
                args: serde_json::Value::Null,
                result: None,
            });
        }

        let obj = value.as_object()?;
        let name = obj
            .get("name")
            .and_then(|name| return name.as_str())
            .unwrap_or_default()
            .to_string();

        return Some(RawToolCall {
            name,
            args: obj.get("args").cloned().unwrap_or(serde_json::Value::Null),
            // A result that is present but null still counts as a result.
            result: obj.get("result").cloned(),
        });
    }
}

fn lenient_tool_calls<'de, D>(deserializer: D) -> Result<Option<Vec<RawToolCall>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = serde::Deserialize::deserialize(deserializer)?;
    let entries = match value.as_array() {
        Some(entries) => entries,
        None => return Ok(None),
    };

    return Ok(Some(
        entries
            .iter()
            .filter_map(RawToolCall::from_value)
            .collect::<Vec<RawToolCall>>(),
    ));
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_tool_calls",
        skip_serializing_if = "Option::is_none"
    )]
    pub tool_calls: Option<Vec<RawToolCall>>,
}

/// A message record as the agent stores it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<serde_json::Value>>,
}

#[async_trait]
pub trait AgentTransport {
    /// Opens a new server side conversation. Not assumed to be idempotent, the
    /// send queue calls it at most once per session.
    async fn create_session(&self, agent_kind: &str, topic: &str) -> Result<CreatedSession>;

    /// Performs one full exchange with the agent. Completes only once the
    /// agent has produced its final answer.
    async fn send(&self, request: AgentRequest) -> Result<AgentResponse>;

    /// Fetches the stored message records of a conversation, oldest first.
    async fn fetch_messages(&self, conversation_id: &str) -> Result<Vec<StoredMessage>>;
}

pub type TransportBox = Box<dyn AgentTransport + Send + Sync>;
