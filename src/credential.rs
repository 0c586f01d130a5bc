//! # Token credentials
//!
//! Azure OpenAI accepts either a static `api-key` header or a short-lived
//! bearer token issued by Entra ID. A [`TokenCredential`] produces such tokens
//! on demand; the chat-completion service asks for one before every request
//! and the credential decides whether a cached token is still good.
//!
//! - [`AzureCliCredential`] reuses the login of the Azure CLI (`az login`) by
//!   running `az account get-access-token`.
//! - [`StaticTokenCredential`] hands out a fixed token, which is handy for
//!   tokens obtained elsewhere and for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{AgentsError, Result};

/// Scope requested for Azure OpenAI (Cognitive Services) tokens.
pub const COGNITIVE_SERVICES_SCOPE: &str = "https://cognitiveservices.azure.com/.default";

/// Tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN_SECS: i64 = 300;

/// A bearer token together with its expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_on: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    /// Whether the token is still usable at `now`, keeping a refresh margin.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_on - Duration::seconds(REFRESH_MARGIN_SECS) > now
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// A dynamic provider of bearer tokens.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Returns a token valid for `scope`.
    async fn get_token(&self, scope: &str) -> Result<AccessToken>;
}

/// A credential that always returns the same token.
#[derive(Debug, Clone)]
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token, DateTime::<Utc>::MAX_UTC),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scope: &str) -> Result<AccessToken> {
        Ok(self.token.clone())
    }
}

/// Obtains tokens from the locally logged-in Azure CLI.
///
/// Tokens are cached per scope and reused until they come within five
/// minutes of their expiry, after which the CLI is invoked again.
pub struct AzureCliCredential {
    program: String,
    cached: Mutex<HashMap<String, AccessToken>>,
}

impl AzureCliCredential {
    pub fn new() -> Self {
        let program = if cfg!(windows) { "az.cmd" } else { "az" };
        Self::with_program(program)
    }

    /// Use a different executable than `az`, e.g. an absolute path.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            cached: Mutex::new(HashMap::new()),
        }
    }

    async fn request_token(&self, scope: &str) -> Result<AccessToken> {
        let resource = scope.trim_end_matches("/.default");
        debug!(program = %self.program, resource, "Requesting token from Azure CLI");

        let output = Command::new(&self.program)
            .args([
                "account",
                "get-access-token",
                "--resource",
                resource,
                "--output",
                "json",
            ])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AgentsError::authentication(format!(
                        "Azure CLI not found ({}); install it and run `az login`",
                        self.program
                    ))
                } else {
                    AgentsError::authentication(format!("failed to run Azure CLI: {e}"))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AgentsError::authentication(format!(
                "Azure CLI could not issue a token: {}",
                stderr.trim()
            )));
        }

        parse_cli_token(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Default for AzureCliCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AzureCliCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureCliCredential")
            .field("program", &self.program)
            .finish()
    }
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.get(scope) {
            if token.is_fresh_at(Utc::now()) {
                return Ok(token.clone());
            }
        }
        let token = self.request_token(scope).await?;
        cached.insert(scope.to_string(), token.clone());
        Ok(token)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliTokenOutput {
    access_token: String,
    expires_on: Option<String>,
    #[serde(rename = "expires_on")]
    expires_on_epoch: Option<serde_json::Value>,
}

/// Parses the JSON printed by `az account get-access-token`.
///
/// Newer CLI versions include `expires_on` as POSIX seconds; older ones only
/// have `expiresOn` as a local timestamp.
pub fn parse_cli_token(json: &str) -> Result<AccessToken> {
    let output: CliTokenOutput = serde_json::from_str(json).map_err(|e| {
        AgentsError::authentication(format!("unexpected Azure CLI output: {e}"))
    })?;

    let epoch = output.expires_on_epoch.as_ref().and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    });

    let expires_on = match epoch {
        Some(secs) => DateTime::from_timestamp(secs, 0),
        None => output.expires_on.as_deref().and_then(parse_local_timestamp),
    }
    .ok_or_else(|| AgentsError::authentication("Azure CLI token has no usable expiry"))?;

    Ok(AccessToken::new(output.access_token, expires_on))
}

fn parse_local_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
