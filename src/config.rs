//! Connection settings for the chat-completion service
//!
//! [`ConnectionOptions`] collects whatever the caller sets explicitly and
//! [`ConnectionOptions::resolve`] fills the gaps from an optional `.env` file
//! and then from the process environment, producing a [`ConnectionInfo`].
//!
//! ```rust,no_run
//! use azure_chat_agents::config::ConnectionOptions;
//!
//! # fn example() -> azure_chat_agents::Result<()> {
//! // Everything from AZURE_OPENAI_* environment variables.
//! let from_env = ConnectionOptions::new().resolve()?;
//!
//! // Explicit key, endpoint and deployment.
//! let explicit = ConnectionOptions::new()
//!     .endpoint("https://my-resource.openai.azure.com/")
//!     .deployment_name("gpt-4")
//!     .api_key("my-key")
//!     .api_version("2024-02-15-preview")
//!     .resolve()?;
//!
//! // Values read from a specific .env file.
//! let from_file = ConnectionOptions::new()
//!     .env_file_path("/path/to/your/.env")
//!     .resolve()?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use url::Url;

use crate::credential::TokenCredential;
use crate::error::{AgentsError, Result};

/// Environment variable holding the resource endpoint.
pub const ENDPOINT_VAR: &str = "AZURE_OPENAI_ENDPOINT";
/// Environment variable holding the chat deployment name.
pub const DEPLOYMENT_NAME_VAR: &str = "AZURE_OPENAI_CHAT_DEPLOYMENT_NAME";
/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "AZURE_OPENAI_API_KEY";
/// Environment variable holding the REST API version.
pub const API_VERSION_VAR: &str = "AZURE_OPENAI_API_VERSION";

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2024-10-21";

/// How requests are authenticated.
#[derive(Clone)]
pub enum AuthMethod {
    /// Static key sent in the `api-key` header.
    ApiKey(String),
    /// Bearer token fetched from a credential before each request.
    Credential(Arc<dyn TokenCredential>),
}

impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMethod::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            AuthMethod::Credential(_) => f.write_str("Credential"),
        }
    }
}

/// Fully resolved connection to a chat deployment.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub endpoint: Url,
    pub deployment_name: String,
    pub api_version: String,
    pub auth: AuthMethod,
}

impl ConnectionInfo {
    pub fn new(
        endpoint: Url,
        deployment_name: impl Into<String>,
        api_version: impl Into<String>,
        auth: AuthMethod,
    ) -> Self {
        Self {
            endpoint,
            deployment_name: deployment_name.into(),
            api_version: api_version.into(),
            auth,
        }
    }

    /// The chat-completions URL of this deployment, including `api-version`.
    pub fn chat_completions_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!(
            "{}/openai/deployments/{}/chat/completions",
            base, self.deployment_name
        ));
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        url
    }
}

/// Caller-supplied connection settings; unset values fall back to the environment.
#[derive(Clone, Default)]
pub struct ConnectionOptions {
    endpoint: Option<String>,
    deployment_name: Option<String>,
    api_key: Option<String>,
    credential: Option<Arc<dyn TokenCredential>>,
    fallback_credential: Option<Arc<dyn TokenCredential>>,
    api_version: Option<String>,
    env_file_path: Option<PathBuf>,
}

impl ConnectionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn deployment_name(mut self, name: impl Into<String>) -> Self {
        self.deployment_name = Some(name.into());
        self
    }

    /// Authenticate with a static key. Cannot be combined with [`Self::credential`].
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Authenticate with bearer tokens. Cannot be combined with [`Self::api_key`].
    pub fn credential(mut self, credential: Arc<dyn TokenCredential>) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Credential used only when no API key is found in the options, the env
    /// file or the environment.
    pub fn fallback_credential(mut self, credential: Arc<dyn TokenCredential>) -> Self {
        self.fallback_credential = Some(credential);
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Read unset values from this `.env` file before the process environment.
    pub fn env_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file_path = Some(path.into());
        self
    }

    /// Resolve against the process environment.
    pub fn resolve(self) -> Result<ConnectionInfo> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve using `env` in place of the process environment.
    pub fn resolve_with<F>(self, env: F) -> Result<ConnectionInfo>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_vars = match &self.env_file_path {
            Some(path) => read_env_file(path)?,
            None => HashMap::new(),
        };
        let lookup = |key: &str| {
            non_empty(file_vars.get(key).cloned()).or_else(|| non_empty(env(key)))
        };

        let endpoint = non_empty(self.endpoint)
            .or_else(|| lookup(ENDPOINT_VAR))
            .ok_or_else(|| {
                AgentsError::configuration(format!(
                    "no endpoint configured; set `endpoint` or {ENDPOINT_VAR}"
                ))
            })?;
        let endpoint = parse_endpoint(&endpoint)?;

        let deployment_name = non_empty(self.deployment_name)
            .or_else(|| lookup(DEPLOYMENT_NAME_VAR))
            .ok_or_else(|| {
                AgentsError::configuration(format!(
                    "no chat deployment configured; set `deployment_name` or {DEPLOYMENT_NAME_VAR}"
                ))
            })?;

        let api_version = non_empty(self.api_version)
            .or_else(|| lookup(API_VERSION_VAR))
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let auth = match (non_empty(self.api_key), self.credential) {
            (Some(_), Some(_)) => {
                return Err(AgentsError::configuration(
                    "`api_key` and `credential` are mutually exclusive",
                ))
            }
            (Some(key), None) => AuthMethod::ApiKey(key),
            (None, Some(credential)) => AuthMethod::Credential(credential),
            (None, None) => match (lookup(API_KEY_VAR), self.fallback_credential) {
                (Some(key), _) => AuthMethod::ApiKey(key),
                (None, Some(credential)) => AuthMethod::Credential(credential),
                (None, None) => {
                    return Err(AgentsError::configuration(format!(
                        "no API key or credential configured; set {API_KEY_VAR} or provide a credential"
                    )))
                }
            },
        };

        Ok(ConnectionInfo {
            endpoint,
            deployment_name,
            api_version,
            auth,
        })
    }
}

impl std::fmt::Debug for ConnectionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionOptions")
            .field("endpoint", &self.endpoint)
            .field("deployment_name", &self.deployment_name)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("credential", &self.credential.is_some())
            .field("fallback_credential", &self.fallback_credential.is_some())
            .field("api_version", &self.api_version)
            .field("env_file_path", &self.env_file_path)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AgentsError::configuration(format!("invalid endpoint `{raw}`: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AgentsError::configuration(format!(
            "endpoint `{raw}` must use http or https, not {other}"
        ))),
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let iter = dotenvy::from_path_iter(path).map_err(|e| {
        AgentsError::configuration(format!("cannot read env file {}: {e}", path.display()))
    })?;
    let mut vars = HashMap::new();
    for item in iter {
        let (key, value) = item.map_err(|e| {
            AgentsError::configuration(format!("malformed env file {}: {e}", path.display()))
        })?;
        vars.insert(key, value);
    }
    Ok(vars)
}
