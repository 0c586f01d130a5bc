//! # Agent (orientation)
//!
//! An `Agent` is a named bundle of instructions plus a connection to a
//! chat-completion deployment. A triage agent additionally carries
//! [`Delegate`] descriptors of the agents it may hand requests to. Agents are
//! built once at startup and never change afterwards; [`Agent::get_response`]
//! borrows the agent immutably.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::ConnectionInfo;
use crate::delegate::Delegate;
use crate::error::Result;
use crate::items::{Message, Role};
use crate::model::{AzureChatCompletion, ModelProvider};
use crate::result::AgentResponse;
use crate::thread::ConversationThread;

/// Appended after the delegate list so the model answers in a single reply.
pub const DELEGATION_GUIDANCE: &str = "Reply with one complete answer to the user, \
including whatever the relevant agents above would contribute.";

/// Defines the complete configuration for an [`Agent`].
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// The name of the agent. The service rejects names containing `.`;
    /// this is not checked locally.
    pub name: String,

    /// The system instructions that guide the agent's behavior.
    pub instructions: String,

    /// A short description of the agent's capabilities, used when this agent
    /// is described to a triage agent.
    pub description: Option<String>,

    /// Where and how to reach the chat deployment.
    pub connection: ConnectionInfo,

    /// Sampling temperature. `None` leaves the service default.
    pub temperature: Option<f32>,

    /// Maximum number of tokens to generate. `None` leaves the service default.
    pub max_tokens: Option<u32>,
}

impl AgentConfig {
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        connection: ConnectionInfo,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            description: None,
            connection,
            temperature: None,
            max_tokens: None,
        }
    }
}

/// A configured agent.
///
/// ```rust
/// use azure_chat_agents::{Agent, AgentConfig, ConnectionOptions};
///
/// # fn example() -> azure_chat_agents::Result<()> {
/// let connection = ConnectionOptions::new()
///     .endpoint("https://my-resource.openai.azure.com/")
///     .deployment_name("gpt-4")
///     .api_key("key")
///     .resolve_with(|_| None)?;
///
/// let agent = Agent::new(AgentConfig::new(
///     "Agent_Smith",
///     "You are a helpful assistant.",
///     connection,
/// ))
/// .with_temperature(0.5);
///
/// assert_eq!(agent.name(), "Agent_Smith");
/// assert_eq!(agent.config().temperature, Some(0.5));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Agent {
    config: AgentConfig,
    delegates: Vec<Delegate>,
    service: Arc<dyn ModelProvider>,
}

impl Agent {
    /// Creates an agent talking to the deployment named in `config.connection`.
    ///
    /// Nothing is validated and no I/O happens here; bad settings surface on
    /// the first call.
    pub fn new(config: AgentConfig) -> Self {
        let service = Arc::new(AzureChatCompletion::new(config.connection.clone()));
        Self::with_provider(config, service)
    }

    /// Creates an agent that sends its requests through `service`.
    pub fn with_provider(config: AgentConfig, service: Arc<dyn ModelProvider>) -> Self {
        Self {
            config,
            delegates: Vec::new(),
            service,
        }
    }

    /// Creates a simple agent with just a name, instructions and connection.
    pub fn simple(
        name: impl Into<String>,
        instructions: impl Into<String>,
        connection: ConnectionInfo,
    ) -> Self {
        Self::new(AgentConfig::new(name, instructions, connection))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.config.description = Some(description.into());
        self
    }

    /// Adds a delegation target.
    pub fn with_delegate(mut self, delegate: Delegate) -> Self {
        self.delegates.push(delegate);
        self
    }

    /// Adds multiple delegation targets.
    pub fn with_delegates(mut self, delegates: impl IntoIterator<Item = Delegate>) -> Self {
        self.delegates.extend(delegates);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = Some(max_tokens);
        self
    }

    /// Returns the agent's name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the agent's instructions.
    pub fn instructions(&self) -> &str {
        &self.config.instructions
    }

    pub fn description(&self) -> Option<&str> {
        self.config.description.as_deref()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Returns the delegation targets of this agent.
    pub fn delegates(&self) -> &[Delegate] {
        &self.delegates
    }

    pub fn has_delegates(&self) -> bool {
        !self.delegates.is_empty()
    }

    /// Constructs the system message: the instructions followed by the list
    /// of delegation targets, if any.
    pub fn build_system_message(&self) -> Message {
        let mut content = self.config.instructions.clone();

        if !self.delegates.is_empty() {
            content.push_str("\n\nYou can delegate to the following agents:\n");
            for delegate in &self.delegates {
                content.push_str(&delegate.render());
                content.push('\n');
            }
            content.push_str(DELEGATION_GUIDANCE);
        }

        Message::system(content)
    }

    /// Sends `message` to the model and returns its answer.
    ///
    /// The request carries the system message, the history of `thread` and
    /// the new user message. The returned response holds the thread extended
    /// with this exchange; without a thread a fresh one is started. Errors
    /// from the service are returned as they are; nothing is retried.
    pub async fn get_response(
        &self,
        message: impl Into<String>,
        thread: Option<ConversationThread>,
    ) -> Result<AgentResponse> {
        let message = message.into();
        let mut thread = thread.unwrap_or_default();

        let mut messages = Vec::with_capacity(thread.len() + 2);
        messages.push(self.build_system_message());
        messages.extend(thread.messages().iter().cloned());
        messages.push(Message::user(message.clone()));

        info!(
            agent = %self.name(),
            thread = %thread.id(),
            history = thread.len(),
            delegates = self.delegates.len(),
            "Requesting agent response"
        );
        debug!("Outgoing messages:\n{}", format_messages_for_log(&messages));

        let started = Instant::now();
        let (response, usage) = self
            .service
            .complete(messages, self.config.temperature, self.config.max_tokens)
            .await
            .inspect_err(|e| warn!(agent = %self.name(), error = %e, "Agent call failed"))?;

        let content = response.content.unwrap_or_default();
        info!(
            agent = %self.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            total_tokens = usage.total_tokens,
            "Agent responded"
        );

        thread.record_exchange(Message::user(message), Message::assistant(content.clone()));

        Ok(AgentResponse {
            agent_name: self.config.name.clone(),
            content,
            thread,
            usage,
            finish_reason: response.finish_reason,
        })
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.config.name)
            .field("model", &self.service.model_name())
            .field("delegates", &self.delegates)
            .finish()
    }
}

fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => {
            let mut out = s[..idx].to_string();
            out.push('…');
            out
        }
        None => s.to_string(),
    }
}

fn format_messages_for_log(messages: &[Message]) -> String {
    messages
        .iter()
        .enumerate()
        .map(|(idx, m)| {
            let label = match m.role {
                Role::System => "SYSTEM",
                Role::User => "USER",
                Role::Assistant => "ASSIST",
            };
            format!("{:02} {:<8} | {}", idx, label, truncate_for_log(&m.content, 160))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionOptions;
    use crate::model::MockProvider;

    fn connection() -> ConnectionInfo {
        ConnectionOptions::new()
            .endpoint("https://res.openai.azure.com/")
            .deployment_name("gpt-4")
            .api_key("key")
            .resolve_with(|_| None)
            .unwrap()
    }

    #[test]
    fn test_agent_creation() {
        let agent = Agent::simple("TestAgent", "You are a test agent", connection());
        assert_eq!(agent.name(), "TestAgent");
        assert_eq!(agent.instructions(), "You are a test agent");
        assert_eq!(agent.description(), None);
        assert!(!agent.has_delegates());
    }

    #[test]
    fn test_agent_name_is_not_validated_locally() {
        let agent = Agent::simple("Agent.Smith", "", connection());
        assert_eq!(agent.name(), "Agent.Smith");
        assert_eq!(agent.instructions(), "");
    }

    #[test]
    fn test_agent_builder() {
        let agent = Agent::simple("Builder", "Test instructions", connection())
            .with_description("Builds things")
            .with_temperature(0.5)
            .with_max_tokens(1000);

        assert_eq!(agent.config().temperature, Some(0.5));
        assert_eq!(agent.config().max_tokens, Some(1000));
        assert_eq!(agent.description(), Some("Builds things"));
    }

    #[test]
    fn test_agent_with_delegates() {
        let spanish = Agent::simple("Spanish", "Speaks Spanish", connection());
        let english = Agent::simple("English", "Speaks English", connection());

        let triage = Agent::simple("Triage", "Routes requests", connection())
            .with_delegates([Delegate::from_agent(&spanish), Delegate::from_agent(&english)]);

        assert_eq!(triage.delegates().len(), 2);
        assert!(triage.has_delegates());
    }

    #[test]
    fn test_system_message_generation() {
        let helper = Agent::simple("Helper", "I help with tasks", connection());
        let agent = Agent::simple("Main", "I am the main agent", connection())
            .with_delegate(Delegate::new(&helper, "Handles complex tasks"));

        let sys_msg = agent.build_system_message();
        assert_eq!(sys_msg.role, Role::System);
        assert!(sys_msg.content.starts_with("I am the main agent"));
        assert!(sys_msg.content.contains("- Helper: Handles complex tasks"));
        assert!(sys_msg.content.ends_with(DELEGATION_GUIDANCE));
    }

    #[test]
    fn test_system_message_without_delegates_is_instructions() {
        let agent = Agent::simple("Solo", "Just me", connection());
        assert_eq!(agent.build_system_message().content, "Just me");
    }

    #[test]
    fn test_agent_debug_format() {
        let agent = Agent::simple("Debug", "Debug agent", connection());
        let debug_str = format!("{:?}", agent);

        assert!(debug_str.contains("Debug"));
        assert!(debug_str.contains("gpt-4"));
        assert!(!debug_str.contains("key"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        assert_eq!(truncate_for_log("héllo", 2), "hé…");
        assert_eq!(truncate_for_log("short", 10), "short");
    }

    #[tokio::test]
    async fn test_get_response_request_layout() {
        let provider = Arc::new(MockProvider::new("mock").with_message("Hi!"));
        let agent = Agent::with_provider(
            AgentConfig::new("Assistant", "You are a helpful assistant.", connection()),
            provider.clone(),
        );

        let response = agent.get_response("Hello!", None).await.unwrap();
        assert_eq!(response.content, "Hi!");
        assert_eq!(response.agent_name, "Assistant");
        assert_eq!(response.thread.len(), 2);

        let sent = &provider.received()[0];
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], Message::system("You are a helpful assistant."));
        assert_eq!(sent[1], Message::user("Hello!"));
    }
}
