//! Blocking XML-RPC transport
//!
//! Sends one `methodCall` per invocation and returns the decoded response
//! value. The transport knows nothing about Loopia status codes; response
//! classification happens in [`crate::classify`].

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use super::Value;
use super::xml::{decode_response, encode_call};
use crate::config::ClientConfig;
use crate::error::{LoopiaError, Result};
use crate::utils::log_sanitizer::truncate_for_log;

/// Invoke a named remote method with positional arguments.
///
/// Implementations must either return the decoded response value or fail
/// with a transport-level error ([`LoopiaError::Network`],
/// [`LoopiaError::Timeout`], [`LoopiaError::Fault`], [`LoopiaError::Parse`]).
pub trait RpcTransport: Send + Sync {
    fn call(&self, method: &str, params: &[Value]) -> Result<Value>;
}

/// XML-RPC over HTTP(S) POST.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    /// Builds a transport for `endpoint` with the timeouts from `config`.
    pub fn new(endpoint: impl Into<String>, config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LoopiaError::Config {
                detail: format!("Failed to create HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RpcTransport for HttpTransport {
    fn call(&self, method: &str, params: &[Value]) -> Result<Value> {
        // Params carry credentials and are never logged.
        log::debug!("POST {} method={method}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(encode_call(method, params))
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    LoopiaError::Timeout {
                        detail: e.to_string(),
                    }
                } else {
                    LoopiaError::Network {
                        detail: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        log::debug!("Response Status: {}", status.as_u16());

        let body = response.text().map_err(|e| LoopiaError::Network {
            detail: format!("Failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            log::warn!("HTTP {} from {}", status.as_u16(), self.endpoint);
            return Err(LoopiaError::Network {
                detail: format!("HTTP {}: {}", status.as_u16(), truncate_for_log(&body)),
            });
        }

        log::debug!("Response Body: {}", truncate_for_log(&body));

        decode_response(&body).inspect_err(|e| {
            if matches!(e, LoopiaError::Parse { .. }) {
                log::error!("XML-RPC parse failed: {e}");
                log::error!("Raw response: {}", truncate_for_log(&body));
            }
        })
    }
}
