//! # Delegation targets
//!
//! A triage agent can be told about other agents it may delegate to. Which
//! target handles a request is decided by the remote model; locally a
//! delegation target is nothing more than a [`Delegate`] descriptor, a name
//! and a capability summary, that is written into the triage agent's system
//! message.
//!
//! ```rust
//! use azure_chat_agents::{Agent, AgentConfig, ConnectionOptions, Delegate};
//!
//! # fn example() -> azure_chat_agents::Result<()> {
//! let connection = ConnectionOptions::new()
//!     .endpoint("https://my-resource.openai.azure.com/")
//!     .deployment_name("gpt-4")
//!     .api_key("key")
//!     .resolve_with(|_| None)?;
//!
//! let tech_support = Agent::new(AgentConfig::new(
//!     "TechnicalSupport",
//!     "You are a technical support specialist.",
//!     connection.clone(),
//! ));
//!
//! let triage = Agent::new(AgentConfig::new(
//!     "TriageBot",
//!     "You route questions to specialists.",
//!     connection,
//! ))
//! .with_delegate(Delegate::new(&tech_support, "Handles technical questions."));
//!
//! assert_eq!(triage.delegates().len(), 1);
//! assert_eq!(triage.delegates()[0].name, "TechnicalSupport");
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

use crate::agent::Agent;

/// Describes an agent that a triage agent may delegate to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegate {
    /// The name of the target agent.
    pub name: String,

    /// What the target agent handles. The remote model uses this to decide
    /// when delegating is appropriate.
    pub description: String,
}

impl Delegate {
    /// Describes `agent` with an explicit capability summary.
    pub fn new(agent: &Agent, description: impl Into<String>) -> Self {
        Self {
            name: agent.name().to_string(),
            description: description.into(),
        }
    }

    /// Describes `agent` by its description, or by its instructions when it
    /// has none.
    pub fn from_agent(agent: &Agent) -> Self {
        let description = agent
            .description()
            .unwrap_or_else(|| agent.instructions());
        Self::new(agent, description)
    }

    /// A descriptor for a target that is not represented by a local agent.
    pub fn named(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// The line used for this target in a system message.
    pub fn render(&self) -> String {
        format!("- {}: {}", self.name, self.description)
    }
}

impl From<&Agent> for Delegate {
    fn from(agent: &Agent) -> Self {
        Self::from_agent(agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentConfig;
    use crate::config::ConnectionOptions;

    fn agent(name: &str, instructions: &str) -> Agent {
        let connection = ConnectionOptions::new()
            .endpoint("https://res.openai.azure.com/")
            .deployment_name("gpt-4")
            .api_key("key")
            .resolve_with(|_| None)
            .unwrap();
        Agent::new(AgentConfig::new(name, instructions, connection))
    }

    #[test]
    fn test_delegate_from_agent_uses_instructions() {
        let refunds = agent("RefundAgent", "Assist users with refund inquiries.");
        let delegate = Delegate::from_agent(&refunds);

        assert_eq!(delegate.name, "RefundAgent");
        assert_eq!(delegate.description, "Assist users with refund inquiries.");
    }

    #[test]
    fn test_delegate_prefers_agent_description() {
        let billing = agent("BillingAgent", "Long billing instructions")
            .with_description("Billing questions");
        let delegate: Delegate = (&billing).into();

        assert_eq!(delegate.description, "Billing questions");
    }

    #[test]
    fn test_delegate_render() {
        let delegate = Delegate::named("Specialist", "Handles complex queries");
        assert_eq!(delegate.render(), "- Specialist: Handles complex queries");
    }

    #[test]
    fn test_delegate_serialization() {
        let delegate = Delegate::named("Source", "Testing");

        let serialized = serde_json::to_string(&delegate).unwrap();
        let deserialized: Delegate = serde_json::from_str(&serialized).unwrap();

        assert_eq!(delegate, deserialized);
    }
}
