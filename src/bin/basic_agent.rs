//! # Single agent, single question
//!
//! Builds one agent, asks it one question and prints the answer.
//!
//! Connection settings come from the `AZURE_OPENAI_*` variables (a `.env` file
//! in the working directory is loaded first). Without `AZURE_OPENAI_API_KEY`
//! the Azure CLI login is used.
//!
//! ```bash
//! az login
//! export AZURE_OPENAI_ENDPOINT="https://your-resource.openai.azure.com/"
//! export AZURE_OPENAI_CHAT_DEPLOYMENT_NAME="gpt-4"
//! cargo run --bin basic_agent
//! cargo run --bin basic_agent -- Write a limerick about borrow checking.
//! ```

use std::sync::Arc;

use azure_chat_agents::{Agent, AgentConfig, AzureCliCredential, ConnectionOptions};
use tracing_subscriber::EnvFilter;

const DEFAULT_QUESTION: &str = "Write a haiku about Semantic Kernel.";

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

    // Agent names may not contain periods.
    let agent = Agent::new(AgentConfig::new(
        "Agent_Smith",
        "You are a helpful assistant.",
        connection,
    ));

    let question = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let question = if question.trim().is_empty() {
        DEFAULT_QUESTION.to_string()
    } else {
        question
    };

    let response = agent.get_response(question, None).await?;
    println!("{}", response.content);

    Ok(())
}
