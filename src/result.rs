//! Result types for agent calls

use crate::thread::ConversationThread;
use crate::usage::Usage;

/// The answer of one agent call.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// Name of the agent that was called
    pub agent_name: String,
    /// Text of the answer; empty when the model returned no text
    pub content: String,
    /// The conversation extended with this exchange; pass it to the next call
    pub thread: ConversationThread,
    /// Tokens consumed by this call
    pub usage: Usage,
    /// Why the model stopped, as reported by the service
    pub finish_reason: Option<String>,
}

impl AgentResponse {
    /// Drops the response text and keeps the thread for the next turn.
    pub fn into_thread(self) -> ConversationThread {
        self.thread
    }
}

impl std::fmt::Display for AgentResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.content)
    }
}
