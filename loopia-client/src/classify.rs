//! Response classification
//!
//! The API is not self-describing: control-flow outcomes come back as a bare
//! string or as a one-element array holding a string, while informational
//! calls return a struct or an array of structs. Every client call funnels
//! its raw response through [`classify`].

use crate::error::Result;
use crate::registry::ErrorRegistry;
use crate::rpc::Value;

/// Status string signalling success.
pub const STATUS_OK: &str = "OK";

/// Shape of one raw RPC response.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcResponse {
    /// Success without payload.
    Ok,
    /// Named failure. `raw` is the complete response as received.
    Failure { code: String, raw: Value },
    /// Success with payload, passed through unchanged.
    Data(Value),
}

impl RpcResponse {
    /// Resolves failures through `registry`; success variants pass through.
    pub fn into_result(self, registry: &ErrorRegistry) -> Result<Self> {
        match self {
            Self::Failure { code, raw } => Err(registry.resolve(&code, raw).into()),
            other => Ok(other),
        }
    }
}

pub fn classify(raw: Value) -> RpcResponse {
    let status = match &raw {
        Value::String(status) => Some(status.clone()),
        Value::Array(items) => match items.as_slice() {
            [Value::String(status)] => Some(status.clone()),
            _ => None,
        },
        _ => None,
    };

    match status {
        Some(status) if status == STATUS_OK => RpcResponse::Ok,
        Some(code) => RpcResponse::Failure { code, raw },
        None => RpcResponse::Data(raw),
    }
}
