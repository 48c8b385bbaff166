#[cfg(test)]
#[path = "tool_calls_test.rs"]
mod tests;

use crate::domain::models::AgentResponse;
use crate::domain::models::NavigationIntent;
use crate::domain::models::ToolCall;
use crate::domain::models::NAVIGATE_DIRECTIVE;

#[derive(Clone, Debug, PartialEq)]
pub struct Interpretation {
    pub content: String,
    pub tool_calls: Option<Vec<ToolCall>>,
    pub navigation: Option<NavigationIntent>,
}

pub struct ToolCallInterpreter {}

impl ToolCallInterpreter {
    /// Turns a finished exchange into what gets displayed. Never fails: fields
    /// the agent left out or mangled just don't show up.
    pub fn interpret(response: &AgentResponse) -> Interpretation {
        let content = response
            .broadcast
            .as_deref()
            .filter(|broadcast| return !broadcast.is_empty())
            .or(response.output.as_deref())
            .unwrap_or_default()
            .to_string();

        let tool_calls = response.tool_calls.as_ref().map(|tool_calls| {
            return tool_calls
                .iter()
                .map(|raw| return ToolCall::completed(&raw.name, raw.args.clone(), raw.result.clone()))
                .collect::<Vec<ToolCall>>();
        });

        // Only the first directive counts, even if it turns out unusable.
        let navigation = response
            .tool_calls
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|raw| return raw.name == NAVIGATE_DIRECTIVE)
            .and_then(|raw| return NavigationIntent::from_args(&raw.args));

        return Interpretation {
            content,
            tool_calls,
            navigation,
        };
    }
}
