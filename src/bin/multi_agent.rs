//! # Triage chat with billing and refund specialists
//!
//! Reads questions from stdin and answers them through a triage agent that
//! knows about a billing and a refund specialist. Type `exit` to quit.
//!
//! ```bash
//! cargo run --bin multi_agent
//! ```

use std::sync::Arc;

use azure_chat_agents::support::WELCOME_BANNER;
use azure_chat_agents::{AzureCliCredential, ChatSession, ConnectionOptions, SupportAgents};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let connection = ConnectionOptions::new()
        .fallback_credential(Arc::new(AzureCliCredential::new()))
        .resolve()?;
    let agents = SupportAgents::build(connection);

    let summary = ChatSession::new(&agents.triage)
        .with_banner(WELCOME_BANNER)
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    tracing::info!(
        turns = summary.turns,
        total_tokens = summary.usage.total_tokens,
        "Goodbye"
    );

    Ok(())
}
