//! Model abstraction for chat-completion calls
//!
//! [`ModelProvider`] is the seam between agents and the remote service.
//! [`AzureChatCompletion`] talks to an Azure OpenAI deployment using the
//! `async-openai` wire types; [`MockProvider`] replays scripted replies and
//! records what it was sent.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{AuthMethod, ConnectionInfo};
use crate::credential::COGNITIVE_SERVICES_SCOPE;
use crate::error::{AgentsError, Result};
use crate::items::{Message, ModelResponse, Role};
use crate::usage::Usage;

/// Trait for model providers
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Generate a completion
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> Result<(ModelResponse, Usage)>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Chat-completion provider backed by an Azure OpenAI deployment.
pub struct AzureChatCompletion {
    connection: ConnectionInfo,
    http: reqwest::Client,
}

impl AzureChatCompletion {
    pub fn new(connection: ConnectionInfo) -> Self {
        Self {
            connection,
            http: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured HTTP client (proxy, timeouts, TLS).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn connection(&self) -> &ConnectionInfo {
        &self.connection
    }

    fn convert_message(msg: &Message) -> Result<ChatCompletionRequestMessage> {
        let converted: ChatCompletionRequestMessage = match msg.role {
            Role::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(msg.content.clone())
                .build()?
                .into(),
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(msg.content.clone())
                .build()?
                .into(),
            Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(msg.content.clone())
                .build()?
                .into(),
        };
        Ok(converted)
    }

    /// Builds the request body sent to the deployment.
    pub fn build_request(
        &self,
        messages: &[Message],
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> Result<CreateChatCompletionRequest> {
        let openai_messages = messages
            .iter()
            .map(Self::convert_message)
            .collect::<Result<Vec<_>>>()?;

        let mut request = CreateChatCompletionRequestArgs::default();
        request
            .model(&self.connection.deployment_name)
            .messages(openai_messages);

        if let Some(temp) = temperature {
            request.temperature(temp);
        }

        if let Some(max) = max_tokens {
            request.max_tokens(max);
        }

        Ok(request.build()?)
    }

    async fn authorize(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        match &self.connection.auth {
            AuthMethod::ApiKey(key) => Ok(request.header("api-key", key)),
            AuthMethod::Credential(credential) => {
                let token = credential.get_token(COGNITIVE_SERVICES_SCOPE).await?;
                Ok(request.bearer_auth(token.token))
            }
        }
    }
}

impl std::fmt::Debug for AzureChatCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureChatCompletion")
            .field("endpoint", &self.connection.endpoint.as_str())
            .field("deployment_name", &self.connection.deployment_name)
            .field("api_version", &self.connection.api_version)
            .finish()
    }
}

#[async_trait]
impl ModelProvider for AzureChatCompletion {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> Result<(ModelResponse, Usage)> {
        let body = self.build_request(&messages, temperature, max_tokens)?;
        let url = self.connection.chat_completions_url();
        debug!(%url, messages = messages.len(), "Sending chat completion request");

        let request = self.authorize(self.http.post(url).json(&body)).await?;
        let response = request.send().await?;

        let status = response.status().as_u16();
        let body_text = response.text().await?;

        if !(200..300).contains(&status) {
            let err = error_from_status(status, &body_text);
            warn!(status, error = %err, "Chat completion request failed");
            return Err(err);
        }

        let completion: CreateChatCompletionResponse = serde_json::from_str(&body_text)?;

        let choice = completion
            .choices
            .first()
            .ok_or_else(|| AgentsError::ModelBehaviorError {
                message: "No choices in response".to_string(),
            })?;

        let finish_reason = choice
            .finish_reason
            .as_ref()
            .and_then(|r| serde_json::to_value(r).ok())
            .and_then(|v| v.as_str().map(str::to_owned));

        let model_response = ModelResponse {
            id: completion.id.clone(),
            content: choice.message.content.clone(),
            finish_reason,
            created_at: chrono::Utc::now(),
        };

        let usage = completion
            .usage
            .as_ref()
            .map(|u| Usage::new(u.prompt_tokens as usize, u.completion_tokens as usize))
            .unwrap_or_else(Usage::empty);

        Ok((model_response, usage))
    }

    fn model_name(&self) -> &str {
        &self.connection.deployment_name
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Maps a non-success HTTP status and body to an error.
pub fn error_from_status(status: u16, body: &str) -> AgentsError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        401 | 403 => AgentsError::AuthenticationError { message },
        _ => AgentsError::RemoteError { status, message },
    }
}

/// One scripted reply of a [`MockProvider`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Message(String),
    Failure { status: u16, message: String },
}

/// Provider that replays scripted replies and records every request.
#[derive(Debug)]
pub struct MockProvider {
    model: String,
    replies: Mutex<VecDeque<MockReply>>,
    received: Mutex<Vec<Vec<Message>>>,
}

impl MockProvider {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            replies: Mutex::new(VecDeque::new()),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn with_message(self, content: impl Into<String>) -> Self {
        self.push(MockReply::Message(content.into()))
    }

    pub fn with_failure(self, status: u16, message: impl Into<String>) -> Self {
        self.push(MockReply::Failure {
            status,
            message: message.into(),
        })
    }

    fn push(self, reply: MockReply) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
        self
    }

    /// Number of completed `complete` calls.
    pub fn calls(&self) -> usize {
        self.received.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// The message lists received so far, in call order.
    pub fn received(&self) -> Vec<Vec<Message>> {
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        _temperature: Option<f32>,
        _max_tokens: Option<u32>,
    ) -> Result<(ModelResponse, Usage)> {
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(messages);

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match reply {
            Some(MockReply::Message(content)) => {
                Ok((ModelResponse::new_message(content), Usage::new(10, 5)))
            }
            Some(MockReply::Failure { status, message }) => {
                Err(error_from_status(status, &message))
            }
            None => Ok((
                ModelResponse::new_message("Default response"),
                Usage::new(10, 5),
            )),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
