//! # Token usage
//!
//! [`Usage`] records the token consumption of one chat-completion call. Chat
//! sessions sum the usage of every turn so the total can be reported when the
//! session ends.
//!
//! ```rust
//! use azure_chat_agents::usage::Usage;
//!
//! let mut total = Usage::empty();
//! total.add_usage(&Usage::new(120, 30));
//! total.add_usage(&Usage::new(80, 20));
//!
//! assert_eq!(total.total_tokens, 250);
//! assert_eq!(total.request_count, 2);
//! ```

use serde::{Deserialize, Serialize};

/// Represents the token usage for a single chat-completion call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// The number of tokens in the input prompt.
    pub prompt_tokens: usize,

    /// The number of tokens in the generated completion.
    pub completion_tokens: usize,

    /// The total number of tokens (prompt + completion).
    pub total_tokens: usize,

    /// The number of API requests made. This is 1 for a single call.
    pub request_count: usize,
}

impl Usage {
    /// Creates a new `Usage` instance from the prompt and completion token counts.
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
            request_count: 1,
        }
    }

    /// Creates an empty `Usage` instance with all fields set to zero.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds the values from another `Usage` instance to this one.
    pub fn add_usage(&mut self, other: &Usage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
        self.request_count += other.request_count;
    }
}
