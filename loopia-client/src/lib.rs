//! # loopia-client
//!
//! A typed, blocking client for the [Loopia](https://www.loopia.se/api/)
//! XML-RPC domain and DNS management API.
//!
//! The API answers control-flow calls with a bare status string (or a
//! one-element array holding one) and informational calls with structs.
//! This crate classifies every raw response, turns failure codes into typed
//! [`LoopiaError`]s and converts payloads into validated, immutable values
//! ([`DnsRecord`], [`Domain`]).
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls. Recommended for cross-compilation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use loopia_client::{DnsRecord, Loopia, RecordType};
//!
//! fn main() -> loopia_client::Result<()> {
//!     let loopia = Loopia::new("user@loopiaapi", "secret")?;
//!
//!     for domain in loopia.get_domains()? {
//!         println!("{} expires {}", domain.domain, domain.expiration_date);
//!     }
//!
//!     let record = DnsRecord::builder(RecordType::A)
//!         .ttl(300)
//!         .data("192.0.2.1")
//!         .build()?;
//!     loopia.add_zone_record(&record, "example.com", Some("www"))?;
//!
//!     for record in loopia.get_zone_records("example.com", None)? {
//!         println!("{record}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, LoopiaError>`](LoopiaError):
//!
//! - [`LoopiaError::InvalidType`] / [`LoopiaError::InvalidValue`]: a field failed validation
//! - [`LoopiaError::Precondition`]: e.g. adding a record that already has an id
//! - [`LoopiaError::Remote`]: the provider returned a failure code, see [`RemoteErrorKind`]
//! - [`LoopiaError::Network`], [`LoopiaError::Timeout`], [`LoopiaError::Fault`],
//!   [`LoopiaError::Parse`]: the round trip itself failed
//!
//! Nothing is retried.

mod classify;
mod client;
mod config;
mod error;
mod registry;
pub mod rpc;
mod split;
mod types;
mod utils;

pub use classify::{RpcResponse, STATUS_OK, classify};
pub use client::{Loopia, LoopiaBuilder, ROOT_SUBDOMAIN};
pub use config::{
    ClientConfig, Credentials, ENV_PASSWORD, ENV_USERNAME, Endpoint, PRODUCTION_URL, SANDBOX_URL,
};
pub use error::{LoopiaError, RemoteError, RemoteErrorKind, Result};
pub use registry::{ErrorRegistry, UNKNOWN_ERROR_MESSAGE};
pub use rpc::{HttpTransport, RpcTransport, Value};
pub use split::{BuiltinSuffixes, SplitDomain, SuffixResolver, split_domain, split_domain_with};
pub use types::{
    DEFAULT_TTL, DnsRecord, DnsRecordBuilder, Domain, RecordId, RecordType, RenewalStatus,
};
