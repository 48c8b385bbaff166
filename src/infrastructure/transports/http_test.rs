use anyhow::Result;
use serde_json::json;
use test_utils::chat_response_fixture;
use test_utils::stored_messages_fixture;

use super::HttpAgent;
use crate::domain::models::AgentRequest;
use crate::domain::models::AgentTransport;
use crate::domain::models::HistoryEntry;
use crate::domain::models::MessageStore;
use crate::domain::models::Role;
use crate::domain::services::ToolCallInterpreter;

impl HttpAgent {
    fn with_url(url: String) -> HttpAgent {
        return HttpAgent {
            url,
            token: "abc".to_string(),
            timeout: "500".to_string(),
        };
    }
}

#[tokio::test]
async fn it_creates_sessions() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/conversations")
        .match_header("Authorization", "Bearer abc")
        .match_body(mockito::Matcher::Json(
            json!({ "agentId": "super", "topic": "new" }),
        ))
        .with_status(201)
        .with_body(json!({ "id": "conv_1", "title": "ignored" }).to_string())
        .create();

    let agent = HttpAgent::with_url(server.url());
    let created = agent.create_session("super", "new").await?;
    mock.assert();

    assert_eq!(created.id, "conv_1");
    return Ok(());
}

#[tokio::test]
async fn it_skips_authorization_without_token() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/conversations")
        .match_header("Authorization", mockito::Matcher::Missing)
        .with_status(200)
        .with_body(json!({ "id": "conv_1" }).to_string())
        .create();

    let mut agent = HttpAgent::with_url(server.url());
    agent.token = "".to_string();
    agent.create_session("super", "new").await?;
    mock.assert();

    return Ok(());
}

#[tokio::test]
async fn it_sends_messages() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/chat")
        .match_header("Authorization", "Bearer abc")
        .match_body(mockito::Matcher::Json(json!({
            "message": "Any pending invoices?",
            "agentId": "super",
            "conversationId": "conv_123",
            "history": [
                { "role": "user", "content": "Hi" }
            ]
        })))
        .with_status(200)
        .with_body(chat_response_fixture())
        .create();

    let agent = HttpAgent::with_url(server.url());
    let res = agent
        .send(AgentRequest {
            content: "Any pending invoices?".to_string(),
            agent_kind: "super".to_string(),
            context: None,
            conversation_id: Some("conv_123".to_string()),
            history: Some(vec![HistoryEntry::User {
                content: "Hi".to_string(),
            }]),
        })
        .await?;
    mock.assert();

    assert_eq!(res.conversation_id, Some("conv_123".to_string()));
    assert_eq!(res.tool_calls.as_ref().unwrap().len(), 2);

    let interpretation = ToolCallInterpreter::interpret(&res);
    assert_eq!(
        interpretation.content,
        "You have 2 pending invoices. Opening payments."
    );
    assert_eq!(interpretation.navigation.unwrap().view, "payments");
    assert_eq!(
        interpretation.tool_calls.unwrap()[0].result,
        Some(json!([{ "id": "inv_1" }, { "id": "inv_2" }]))
    );

    return Ok(());
}

#[tokio::test]
async fn it_accepts_minimal_replies() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/chat")
        .with_status(200)
        .with_body(json!({ "output": "Hello", "toolCalls": "not a list" }).to_string())
        .create();

    let agent = HttpAgent::with_url(server.url());
    let res = agent
        .send(AgentRequest {
            content: "Hi".to_string(),
            agent_kind: "super".to_string(),
            ..AgentRequest::default()
        })
        .await?;
    mock.assert();

    assert_eq!(res.output, Some("Hello".to_string()));
    assert!(res.broadcast.is_none());
    assert!(res.conversation_id.is_none());
    assert!(res.tool_calls.is_none());

    return Ok(());
}

#[tokio::test]
async fn it_fails_on_error_status() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/chat")
        .with_status(500)
        .with_body("boom")
        .create();

    let agent = HttpAgent::with_url(server.url());
    let res = agent
        .send(AgentRequest {
            content: "Hi".to_string(),
            agent_kind: "super".to_string(),
            ..AgentRequest::default()
        })
        .await;
    mock.assert();

    assert!(res.unwrap_err().to_string().contains("500"));
}

#[tokio::test]
async fn it_fails_without_url() {
    let agent = HttpAgent::with_url("".to_string());
    let res = agent.create_session("super", "new").await;
    assert!(res.is_err());
}

#[tokio::test]
async fn it_fetches_wrapped_messages() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/conversations/conv_123/messages")
        .match_header("Authorization", "Bearer abc")
        .with_status(200)
        .with_body(stored_messages_fixture())
        .create();

    let agent = HttpAgent::with_url(server.url());
    let records = agent.fetch_messages("conv_123").await?;
    mock.assert();
    assert_eq!(records.len(), 3);

    let store = MessageStore::from_records(records);
    let messages = store.as_slice();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].id, "msg_1");
    assert_eq!(messages[0].timestamp, 1709287200000);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].timestamp, 1709287202120);
    assert_eq!(messages[1].tool_calls()[0].name, "list_calls");

    return Ok(());
}

#[tokio::test]
async fn it_fetches_bare_messages() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/conversations/conv_9/messages")
        .with_status(200)
        .with_body(
            json!([
                { "id": "a", "role": "user", "content": "Hi" },
                { "role": "assistant", "content": null }
            ])
            .to_string(),
        )
        .create();

    let mut agent = HttpAgent::with_url(format!("{}/", server.url()));
    agent.token = "".to_string();
    let records = agent.fetch_messages("conv_9").await?;
    mock.assert();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, Some("a".to_string()));
    assert!(records[1].content.is_none());

    return Ok(());
}

#[tokio::test]
async fn it_fails_fetching_missing_conversation() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/conversations/missing/messages")
        .with_status(404)
        .create();

    let agent = HttpAgent::with_url(server.url());
    let res = agent.fetch_messages("missing").await;
    mock.assert();

    assert!(res.is_err());
}
