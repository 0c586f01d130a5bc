//! Interactive console chat
//!
//! [`ChatSession`] reads user lines, forwards each one to an agent and
//! prints the answer, threading the conversation from one turn to the next.
//! The literal `exit` (any case, surrounding whitespace ignored) or the end of
//! input stops the session.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

use crate::agent::Agent;
use crate::error::Result;
use crate::thread::ConversationThread;
use crate::usage::Usage;

pub const DEFAULT_PROMPT: &str = "User:> ";
pub const DEFAULT_REPLY_PREFIX: &str = "Agent :> ";
pub const EXIT_MESSAGE: &str = "\n\nExiting chat...";

/// True when `line` asks to end the chat.
pub fn is_exit_command(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("exit")
}

/// How a chat session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEnd {
    /// The user typed `exit`.
    ExitCommand,
    /// Input was exhausted.
    EndOfInput,
}

/// Totals of a finished chat session.
#[derive(Debug, Clone)]
pub struct ChatSummary {
    pub turns: usize,
    pub usage: Usage,
    pub ended_by: ChatEnd,
    /// The conversation so far, `None` when no turn completed.
    pub thread: Option<ConversationThread>,
}

/// A line-oriented chat with one agent.
#[derive(Debug)]
pub struct ChatSession<'a> {
    agent: &'a Agent,
    banner: Option<String>,
    prompt: String,
    reply_prefix: String,
}

impl<'a> ChatSession<'a> {
    pub fn new(agent: &'a Agent) -> Self {
        Self {
            agent,
            banner: None,
            prompt: DEFAULT_PROMPT.to_string(),
            reply_prefix: DEFAULT_REPLY_PREFIX.to_string(),
        }
    }

    /// Text printed once before the first prompt.
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_reply_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.reply_prefix = prefix.into();
        self
    }

    /// Runs the session until `exit`, end of input, or the first failed call.
    ///
    /// Each turn completes before the next line is read. A failed call ends
    /// the session with that error.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> Result<ChatSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if let Some(banner) = &self.banner {
            output.write_all(banner.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }

        let mut lines = input.lines();
        let mut thread: Option<ConversationThread> = None;
        let mut usage = Usage::empty();
        let mut turns = 0;

        let ended_by = loop {
            output.write_all(self.prompt.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                output.write_all(b"\n").await?;
                break ChatEnd::EndOfInput;
            };

            if is_exit_command(&line) {
                output.write_all(EXIT_MESSAGE.as_bytes()).await?;
                output.write_all(b"\n").await?;
                break ChatEnd::ExitCommand;
            }

            let response = self.agent.get_response(line, thread.take()).await?;
            usage.add_usage(&response.usage);
            turns += 1;

            let reply = format!("{}{}\n", self.reply_prefix, response.content);
            output.write_all(reply.as_bytes()).await?;
            output.flush().await?;

            thread = Some(response.into_thread());
        };

        info!(
            agent = %self.agent.name(),
            turns,
            total_tokens = usage.total_tokens,
            started_at = ?thread.as_ref().map(ConversationThread::created_at),
            ?ended_by,
            "Chat session finished"
        );

        Ok(ChatSummary {
            turns,
            usage,
            ended_by,
            thread,
        })
    }
}
