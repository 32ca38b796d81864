use serde::Serialize;
use thiserror::Error;

use crate::rpc::Value;

/// Unified error type for every client operation.
///
/// Validation variants ([`InvalidType`](Self::InvalidType),
/// [`InvalidValue`](Self::InvalidValue), [`Precondition`](Self::Precondition))
/// are raised before any network I/O. [`Remote`](Self::Remote) is raised only
/// after a completed round trip whose response classified as a failure.
/// Transport variants cover everything that prevents a decoded response from
/// arriving at all.
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum LoopiaError {
    /// A field received a value of the wrong primitive type (e.g. a boolean `ttl`).
    #[error("Expected '{field}' to be '{expected}', got '{found}'")]
    InvalidType {
        /// Name of the offending field.
        field: String,
        /// Expected type name.
        expected: &'static str,
        /// Type name actually received.
        found: &'static str,
    },

    /// A field has the right type but an invalid value (e.g. a negative `id`).
    #[error("Invalid value for '{field}': {detail}")]
    InvalidValue {
        /// Name of the offending field.
        field: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// A call-specific precondition on the caller's arguments was violated.
    #[error("Precondition failed: {detail}")]
    Precondition {
        /// Description of the violated precondition.
        detail: String,
    },

    /// The provider answered with a failure status code.
    #[error("{0}")]
    Remote(RemoteError),

    /// Invalid client or registry configuration.
    #[error("Configuration error: {detail}")]
    Config {
        /// Error details.
        detail: String,
    },

    /// A network-level error occurred (connection refused, HTTP 5xx, etc.).
    #[error("Network error: {detail}")]
    Network {
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    #[error("Request timeout: {detail}")]
    Timeout {
        /// Error details.
        detail: String,
    },

    /// The endpoint answered with an XML-RPC `<fault>`.
    #[error("XML-RPC fault {code}: {message}")]
    Fault {
        /// `faultCode` member of the fault struct.
        code: i64,
        /// `faultString` member of the fault struct.
        message: String,
    },

    /// Failed to parse the provider's response.
    #[error("Parse error: {detail}")]
    Parse {
        /// Details about the parse failure.
        detail: String,
    },
}

impl LoopiaError {
    /// Whether this is an expected outcome (bad caller input or a failure
    /// code from the provider) rather than an infrastructure failure.
    ///
    /// `true` is logged at `warn`, `false` at `error`. New variants must be
    /// added here.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidType { .. }
                | Self::InvalidValue { .. }
                | Self::Precondition { .. }
                | Self::Remote(_)
        )
    }

    /// Returns the remote error if this is a provider-reported failure.
    pub fn as_remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote(remote) => Some(remote),
            _ => None,
        }
    }

    pub(crate) fn invalid_type(field: &str, expected: &'static str, found: &Value) -> Self {
        Self::InvalidType {
            field: field.to_string(),
            expected,
            found: found.type_name(),
        }
    }

    pub(crate) fn invalid_value(field: &str, detail: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn parse(detail: impl Into<String>) -> Self {
        Self::Parse {
            detail: detail.into(),
        }
    }
}

/// Typed view of the failure codes the provider is known to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RemoteErrorKind {
    /// `AUTH_ERROR`
    Auth,
    /// `DOMAIN_OCCUPIED`
    DomainOccupied,
    /// `RATE_LIMITED`
    RateLimited,
    /// `BAD_INDATA`
    BadIndata,
    /// `INSUFFICIENT_FUNDS`
    InsufficientFunds,
    /// A code registered at runtime that has no dedicated variant.
    Other,
    /// A code the registry does not know.
    Unknown,
}

impl RemoteErrorKind {
    /// Maps a registered code to its kind. `None` means the code was unknown.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("AUTH_ERROR") => Self::Auth,
            Some("DOMAIN_OCCUPIED") => Self::DomainOccupied,
            Some("RATE_LIMITED") => Self::RateLimited,
            Some("BAD_INDATA") => Self::BadIndata,
            Some("INSUFFICIENT_FUNDS") => Self::InsufficientFunds,
            Some(_) => Self::Other,
            None => Self::Unknown,
        }
    }
}

/// A failure reported by the provider, resolved through the
/// [`ErrorRegistry`](crate::ErrorRegistry).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteError {
    /// Registered code, or `None` when the provider sent a code the registry
    /// does not know.
    pub code: Option<String>,
    /// Status string exactly as received.
    pub raw_code: String,
    /// Human-readable message from the registry.
    pub message: String,
    /// The raw response that triggered the failure.
    pub response: Value,
}

impl RemoteError {
    pub fn kind(&self) -> RemoteErrorKind {
        RemoteErrorKind::from_code(self.code.as_deref())
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(_) => write!(f, "{}", self.message),
            None => write!(f, "{} '{}'", self.message, self.raw_code),
        }
    }
}

impl std::error::Error for RemoteError {}

impl From<RemoteError> for LoopiaError {
    fn from(err: RemoteError) -> Self {
        Self::Remote(err)
    }
}

/// Convenience type alias for `Result<T, LoopiaError>`.
pub type Result<T> = std::result::Result<T, LoopiaError>;
