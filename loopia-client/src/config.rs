//! Client configuration: endpoint selection, credentials and timeouts.

use serde::{Deserialize, Serialize};

use crate::error::{LoopiaError, Result};

/// Production endpoint.
pub const PRODUCTION_URL: &str = "https://api.loopia.se/RPCSERV";
/// Sandbox endpoint for integration testing against the provider.
pub const SANDBOX_URL: &str = "https://test-api.loopia.se/RPCSERV";

/// Environment variable holding the API user name.
pub const ENV_USERNAME: &str = "LOOPIA_USERNAME";
/// Environment variable holding the API password.
pub const ENV_PASSWORD: &str = "LOOPIA_PASSWORD";

/// Which provider endpoint the transport targets.
///
/// Serialized as `{"kind": "regional", "value": "rs"}` and similar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Endpoint {
    /// `api.loopia.se`
    #[default]
    Production,
    /// The provider's test endpoint.
    Sandbox,
    /// A country-specific production endpoint, `api.loopia.{tld}`.
    Regional(String),
    /// Any other URL, e.g. a local mock server.
    Custom(String),
}

impl Endpoint {
    pub fn url(&self) -> String {
        match self {
            Self::Production => PRODUCTION_URL.to_string(),
            Self::Sandbox => SANDBOX_URL.to_string(),
            Self::Regional(tld) => format!("https://api.loopia.{tld}/RPCSERV"),
            Self::Custom(url) => url.clone(),
        }
    }

    /// Rejects endpoints that cannot possibly be reached.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Production | Self::Sandbox => Ok(()),
            Self::Regional(tld) => {
                if tld.is_empty() || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
                    Err(LoopiaError::Config {
                        detail: format!("invalid regional endpoint '{tld}'"),
                    })
                } else {
                    Ok(())
                }
            }
            Self::Custom(url) => {
                if url.starts_with("http://") || url.starts_with("https://") {
                    Ok(())
                } else {
                    Err(LoopiaError::Config {
                        detail: format!("endpoint URL must be http(s): '{url}'"),
                    })
                }
            }
        }
    }
}

/// API account credentials, sent as the first two parameters of every call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reads `LOOPIA_USERNAME` and `LOOPIA_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(require_env(ENV_USERNAME)?, require_env(ENV_PASSWORD)?))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(LoopiaError::Config {
            detail: format!("environment variable {name} is empty"),
        }),
        Err(_) => Err(LoopiaError::Config {
            detail: format!("environment variable {name} is not set"),
        }),
    }
}

/// Default connect timeout in seconds.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoint: Endpoint,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::Production,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}
