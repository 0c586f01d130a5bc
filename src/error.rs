//! Error types for the agents crate

use thiserror::Error;

/// Result type alias for the agents crate
pub type Result<T> = std::result::Result<T, AgentsError>;

/// Main error type for the agents crate
#[derive(Debug, Error)]
pub enum AgentsError {
    /// Missing or invalid connection settings
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// A credential could not produce a token, or the service rejected it
    #[error("Authentication error: {message}")]
    AuthenticationError { message: String },

    /// Network failure while talking to the chat-completion service
    #[error("Transport error: {0}")]
    TransportError(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Remote service error (HTTP {status}): {message}")]
    RemoteError { status: u16, message: String },

    /// Model behavior error
    #[error("Model behavior error: {message}")]
    ModelBehaviorError { message: String },

    /// Error from the OpenAI request builders
    #[error("OpenAI API error: {0}")]
    OpenAIError(#[from] async_openai::error::OpenAIError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AgentsError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    pub(crate) fn authentication(message: impl Into<String>) -> Self {
        Self::AuthenticationError {
            message: message.into(),
        }
    }

    /// HTTP status reported by the service, if this error came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteError { status, .. } => Some(*status),
            Self::TransportError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the service throttled the request.
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }
}
