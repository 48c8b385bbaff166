#[cfg(test)]
#[path = "history_replay_test.rs"]
mod tests;

use crate::domain::models::HistoryEntry;
use crate::domain::models::HistoryToolCall;
use crate::domain::models::HistoryToolResult;
use crate::domain::models::Message;
use crate::domain::models::Role;

pub struct HistoryReplay {}

impl HistoryReplay {
    /// Rebuilds the prior turns of a conversation the agent has never seen.
    /// Each assistant turn is followed by the results of its tool calls, in
    /// the order they were attached. Returns `None` when there is nothing to
    /// replay, which the agent treats differently from an empty history.
    pub fn build(messages: &[Message]) -> Option<Vec<HistoryEntry>> {
        let mut history: Vec<HistoryEntry> = vec![];

        for message in messages {
            match message.role {
                Role::User => {
                    history.push(HistoryEntry::User {
                        content: message.content.to_string(),
                    });
                }
                Role::Assistant => {
                    let tool_calls = message.tool_calls.as_ref().map(|tool_calls| {
                        return tool_calls
                            .iter()
                            .map(|tool_call| {
                                return HistoryToolCall {
                                    name: tool_call.name.to_string(),
                                    arguments: tool_call.args.clone(),
                                };
                            })
                            .collect::<Vec<HistoryToolCall>>();
                    });

                    history.push(HistoryEntry::Assistant {
                        content: message.content.to_string(),
                        tool_calls,
                    });

                    for tool_call in message.tool_calls() {
                        if let Some(result) = &tool_call.result {
                            history.push(HistoryEntry::Tool {
                                tool_result: HistoryToolResult {
                                    name: tool_call.name.to_string(),
                                    output: result.clone(),
                                },
                            });
                        }
                    }
                }
                // Already folded into the assistant turns above.
                Role::Tool => {}
            }
        }

        if history.is_empty() {
            return None;
        }

        return Some(history);
    }
}
