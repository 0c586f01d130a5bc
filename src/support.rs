//! Customer-support agent group: a triage agent with billing and refund
//! specialists as delegation targets.

use std::sync::Arc;

use crate::agent::{Agent, AgentConfig};
use crate::config::ConnectionInfo;
use crate::delegate::Delegate;
use crate::model::{AzureChatCompletion, ModelProvider};

pub const BILLING_AGENT_NAME: &str = "BillingAgent";
pub const BILLING_INSTRUCTIONS: &str = "You handle billing issues like charges, payment methods, cycles, fees, discrepancies, and payment failures.";

pub const REFUND_AGENT_NAME: &str = "RefundAgent";
pub const REFUND_INSTRUCTIONS: &str = "Assist users with refund inquiries, including eligibility, policies, processing, and status updates.";

pub const TRIAGE_AGENT_NAME: &str = "TriageAgent";
pub const TRIAGE_INSTRUCTIONS: &str = "Evaluate user requests and forward them to BillingAgent or RefundAgent for targeted assistance. Provide the full answer to the user containing any information from the agents";

pub const WELCOME_BANNER: &str =
    "Welcome to the chat bot!\n  Type 'exit' to exit.\n  Try to get some billing or refund help.";

/// The three agents of the support flow, owned by the caller.
#[derive(Debug, Clone)]
pub struct SupportAgents {
    pub billing: Agent,
    pub refund: Agent,
    pub triage: Agent,
}

impl SupportAgents {
    /// Builds the group on one shared connection to `connection`.
    pub fn build(connection: ConnectionInfo) -> Self {
        let service = Arc::new(AzureChatCompletion::new(connection.clone()));
        Self::with_provider(connection, service)
    }

    /// Builds the group with every agent sending through `service`.
    pub fn with_provider(connection: ConnectionInfo, service: Arc<dyn ModelProvider>) -> Self {
        let billing = Agent::with_provider(
            AgentConfig::new(BILLING_AGENT_NAME, BILLING_INSTRUCTIONS, connection.clone()),
            service.clone(),
        );
        let refund = Agent::with_provider(
            AgentConfig::new(REFUND_AGENT_NAME, REFUND_INSTRUCTIONS, connection.clone()),
            service.clone(),
        );
        let triage = Agent::with_provider(
            AgentConfig::new(TRIAGE_AGENT_NAME, TRIAGE_INSTRUCTIONS, connection),
            service,
        )
        .with_delegates([Delegate::from_agent(&billing), Delegate::from_agent(&refund)]);

        Self {
            billing,
            refund,
            triage,
        }
    }
}
