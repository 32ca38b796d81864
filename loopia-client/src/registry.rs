//! Error code registry
//!
//! Maps the status strings the provider returns to fixed human-readable
//! messages. The default table is built once per process and never mutated
//! afterwards; custom tables can be assembled with [`ErrorRegistry::register`]
//! before being handed to a client.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{LoopiaError, RemoteError, Result};
use crate::rpc::Value;

/// Message used for codes the registry does not know.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Codes and messages the provider documents.
const DEFAULT_ENTRIES: [(&str, &str); 5] = [
    ("AUTH_ERROR", "Wrong username or password"),
    ("DOMAIN_OCCUPIED", "Domain is not available for registration"),
    ("RATE_LIMITED", "Maximum number of requests over time reached"),
    ("BAD_INDATA", "Invalid parameters"),
    ("INSUFFICIENT_FUNDS", "Not enough funds to complete the task"),
];

static GLOBAL: OnceLock<ErrorRegistry> = OnceLock::new();

#[derive(Debug, Clone, Default)]
pub struct ErrorRegistry {
    entries: HashMap<String, String>,
}

impl ErrorRegistry {
    /// An empty registry; every code resolves to the unknown-error fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the provider's documented codes.
    pub fn with_defaults() -> Self {
        let entries = DEFAULT_ENTRIES
            .iter()
            .map(|(code, message)| ((*code).to_string(), (*message).to_string()))
            .collect();
        Self { entries }
    }

    /// The process-wide default registry.
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(Self::with_defaults)
    }

    /// Adds a code. Fails if the code is already registered, leaving the
    /// existing entry untouched.
    pub fn register(&mut self, code: impl Into<String>, message: impl Into<String>) -> Result<()> {
        let code = code.into();
        if self.entries.contains_key(&code) {
            return Err(LoopiaError::Config {
                detail: format!("'{code}' already exists"),
            });
        }
        self.entries.insert(code, message.into());
        Ok(())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    pub fn message(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(String::as_str)
    }

    /// Builds the error for `code`. Unknown codes resolve to the fallback
    /// with `code: None`; the received string is always kept in `raw_code`.
    pub fn resolve(&self, code: &str, response: Value) -> RemoteError {
        match self.entries.get(code) {
            Some(message) => RemoteError {
                code: Some(code.to_string()),
                raw_code: code.to_string(),
                message: message.clone(),
                response,
            },
            None => RemoteError {
                code: None,
                raw_code: code.to_string(),
                message: UNKNOWN_ERROR_MESSAGE.to_string(),
                response,
            },
        }
    }
}
