#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::AgentRequest;
use crate::domain::models::AgentResponse;
use crate::domain::models::AgentTransport;
use crate::domain::models::CreatedSession;
use crate::domain::models::StoredMessage;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest {
    agent_id: String,
    topic: String,
}

/// Stored messages come back either bare or wrapped, depending on the
/// deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum MessagesResponse {
    List(Vec<StoredMessage>),
    Wrapped { messages: Vec<StoredMessage> },
}

impl MessagesResponse {
    fn into_messages(self) -> Vec<StoredMessage> {
        match self {
            MessagesResponse::List(messages) => return messages,
            MessagesResponse::Wrapped { messages } => return messages,
        }
    }
}

/// Talks to the dashboard's agent API over HTTP.
pub struct HttpAgent {
    url: String,
    token: String,
    timeout: String,
}

impl Default for HttpAgent {
    fn default() -> HttpAgent {
        return HttpAgent {
            url: Config::get(ConfigKey::AgentURL),
            token: Config::get(ConfigKey::AgentToken),
            timeout: Config::get(ConfigKey::RequestTimeout),
        };
    }
}

impl HttpAgent {
    fn request(&self, method: reqwest::Method, path: &str) -> Result<reqwest::RequestBuilder> {
        if self.url.is_empty() {
            bail!("Agent URL is not defined");
        }

        let url = format!("{}{path}", self.url.trim_end_matches('/'));
        let mut req = reqwest::Client::new()
            .request(method, url)
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?));

        if !self.token.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.token));
        }

        return Ok(req);
    }

    fn check(res: reqwest::Response, action: &str) -> Result<reqwest::Response> {
        let status = res.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), action, "Agent request failed");
            bail!("Failed to {action}: agent responded with {}", status.as_u16());
        }

        return Ok(res);
    }
}

#[async_trait]
impl AgentTransport for HttpAgent {
    #[allow(clippy::implicit_return)]
    async fn create_session(&self, agent_kind: &str, topic: &str) -> Result<CreatedSession> {
        let req = CreateSessionRequest {
            agent_id: agent_kind.to_string(),
            topic: topic.to_string(),
        };

        let res = self
            .request(reqwest::Method::POST, "/conversations")?
            .json(&req)
            .send()
            .await?;

        let created = HttpAgent::check(res, "create conversation")?
            .json::<CreatedSession>()
            .await?;

        return Ok(created);
    }

    #[allow(clippy::implicit_return)]
    async fn send(&self, request: AgentRequest) -> Result<AgentResponse> {
        let res = self
            .request(reqwest::Method::POST, "/chat")?
            .json(&request)
            .send()
            .await?;

        let response = HttpAgent::check(res, "send message")?
            .json::<AgentResponse>()
            .await?;

        return Ok(response);
    }

    #[allow(clippy::implicit_return)]
    async fn fetch_messages(&self, conversation_id: &str) -> Result<Vec<StoredMessage>> {
        let res = self
            .request(
                reqwest::Method::GET,
                &format!("/conversations/{conversation_id}/messages"),
            )?
            .send()
            .await?;

        let messages = HttpAgent::check(res, "fetch messages")?
            .json::<MessagesResponse>()
            .await?;

        return Ok(messages.into_messages());
    }
}
