//! # Chat-completion agents for Azure OpenAI
//!
//! Build named agents with static instructions on top of an Azure OpenAI chat
//! deployment, optionally giving a triage agent a list of specialist agents it
//! may delegate to. The delegation decision itself is made by the remote
//! model; this crate only describes the targets in the request.
//!
//! ## Core Concepts
//!
//! - **Connection**: endpoint, deployment, API version and either an API key or
//!   a token credential, resolved from explicit options, a `.env` file or the
//!   `AZURE_OPENAI_*` environment variables
//! - **Agent**: name + instructions + connection; immutable once built
//! - **Delegate**: name + capability summary of a delegation target
//! - **ConversationThread**: history returned by each call and passed into the next
//!
//! ## Getting Started
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use azure_chat_agents::{Agent, AgentConfig, AzureCliCredential, ConnectionOptions};
//!
//! # async fn example() -> azure_chat_agents::Result<()> {
//! let connection = ConnectionOptions::new()
//!     .endpoint("https://my-resource.openai.azure.com/")
//!     .deployment_name("gpt-4")
//!     .credential(Arc::new(AzureCliCredential::new()))
//!     .resolve()?;
//!
//! let agent = Agent::new(AgentConfig::new(
//!     "Agent_Smith",
//!     "You are a helpful assistant.",
//!     connection,
//! ));
//!
//! let response = agent
//!     .get_response("Write a haiku about Semantic Kernel.", None)
//!     .await?;
//! println!("{}", response);
//!
//! // Continue the same conversation.
//! let follow_up = agent
//!     .get_response("Now one about Rust.", Some(response.thread))
//!     .await?;
//! println!("{}", follow_up);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod chat;
pub mod config;
pub mod credential;
pub mod delegate;
pub mod error;
pub mod items;
pub mod model;
pub mod result;
pub mod support;
pub mod thread;
pub mod usage;

pub use agent::{Agent, AgentConfig, DELEGATION_GUIDANCE};
pub use chat::{is_exit_command, ChatEnd, ChatSession, ChatSummary};
pub use config::{AuthMethod, ConnectionInfo, ConnectionOptions};
pub use credential::{AccessToken, AzureCliCredential, StaticTokenCredential, TokenCredential};
pub use delegate::Delegate;
pub use error::{AgentsError, Result};
pub use items::{Message, Role};
pub use model::{AzureChatCompletion, MockProvider, ModelProvider};
pub use result::AgentResponse;
pub use support::SupportAgents;
pub use thread::ConversationThread;
pub use usage::Usage;
