//! In-memory conversation threads
//!
//! A [`ConversationThread`] carries the user/assistant history of one
//! conversation. Every agent call returns the thread extended with the new
//! exchange; passing it into the next call continues the conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::items::Message;

/// Multi-turn chat history threaded between agent calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationThread {
    id: String,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
}

impl ConversationThread {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// History in chronological order. Never contains a system message.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub(crate) fn record_exchange(&mut self, user: Message, assistant: Message) {
        self.messages.push(user);
        self.messages.push(assistant);
    }
}

impl Default for ConversationThread {
    fn default() -> Self {
        Self::new()
    }
}
