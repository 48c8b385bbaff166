/// A finished exchange as the agent returns it, including a navigation
/// directive and one malformed tool call entry.
pub fn chat_response_fixture() -> &'static str {
    return r#"
{
  "output": "Found 2 pending invoices.",
  "broadcast": "You have 2 pending invoices. Opening payments.",
  "conversationId": "conv_123",
  "toolCalls": [
    {
      "name": "list_invoices",
      "args": { "status": "pending" },
      "result": [{ "id": "inv_1" }, { "id": "inv_2" }]
    },
    {
      "name": "navigate_to_page",
      "args": { "view": "payments" }
    },
    42
  ]
}
"#
    .trim();
}

/// Stored records of one conversation, oldest first, wrapped the way some
/// deployments return them.
pub fn stored_messages_fixture() -> &'static str {
    return r#"
{
  "messages": [
    {
      "id": "msg_1",
      "role": "user",
      "content": "Show me my calls",
      "created_at": "2024-03-01T10:00:00Z"
    },
    {
      "id": "msg_2",
      "role": "tool",
      "content": "{\"calls\":[]}",
      "created_at": "2024-03-01T10:00:01Z"
    },
    {
      "id": "msg_3",
      "role": "assistant",
      "content": "You have no calls today.",
      "created_at": "2024-03-01 10:00:02.120",
      "tool_calls": ["list_calls"]
    }
  ]
}
"#
    .trim();
}
