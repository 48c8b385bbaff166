use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Tool name the agent uses to ask the dashboard to switch views.
pub const NAVIGATE_DIRECTIVE: &str = "navigate_to_page";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationIntent {
    pub view: String,
    pub agent_id: Option<String>,
}

impl NavigationIntent {
    /// Reads `view` and `agentId` from the directive's arguments. Without a
    /// string `view` there is nowhere to navigate to.
    pub fn from_args(args: &serde_json::Value) -> Option<NavigationIntent> {
        let view = args.get("view")?.as_str()?;
        let agent_id = args
            .get("agentId")
            .and_then(|agent_id| return agent_id.as_str())
            .map(|agent_id| return agent_id.to_string());

        return Some(NavigationIntent {
            view: view.to_string(),
            agent_id,
        });
    }
}
