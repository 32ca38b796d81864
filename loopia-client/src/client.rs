//! The Loopia API client
//!
//! One method per remote procedure. Every method validates its arguments,
//! prepends the account credentials, performs exactly one blocking round
//! trip and funnels the raw response through [`classify`].

use std::sync::Arc;

use crate::classify::{RpcResponse, classify};
use crate::config::{ClientConfig, Credentials, Endpoint};
use crate::error::{LoopiaError, RemoteErrorKind, Result};
use crate::registry::ErrorRegistry;
use crate::rpc::{HttpTransport, RpcTransport, Value};
use crate::types::{DnsRecord, Domain, RecordId};
use crate::utils::log_sanitizer::mask_identifier;

/// Subdomain label addressing the root of a zone.
pub const ROOT_SUBDOMAIN: &str = "@";

/// Blocking client for the Loopia XML-RPC API.
///
/// Holds only credentials, a transport and a read-only error registry, so a
/// single instance can be shared between threads.
pub struct Loopia {
    credentials: Credentials,
    transport: Box<dyn RpcTransport>,
    registry: Option<Arc<ErrorRegistry>>,
}

/// Builder for [`Loopia`].
#[must_use]
pub struct LoopiaBuilder {
    credentials: Credentials,
    config: ClientConfig,
    transport: Option<Box<dyn RpcTransport>>,
    registry: Option<Arc<ErrorRegistry>>,
}

impl LoopiaBuilder {
    fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            config: ClientConfig::default(),
            transport: None,
            registry: None,
        }
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.config.endpoint = endpoint;
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    /// Replaces the HTTP transport; endpoint and timeouts are then ignored.
    pub fn transport(mut self, transport: impl RpcTransport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Uses `registry` instead of the process-wide default.
    pub fn registry(mut self, registry: ErrorRegistry) -> Self {
        self.registry = Some(Arc::new(registry));
        self
    }

    pub fn build(self) -> Result<Loopia> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                self.config.endpoint.validate()?;
                Box::new(HttpTransport::new(
                    self.config.endpoint.url(),
                    &self.config,
                )?)
            }
        };

        Ok(Loopia {
            credentials: self.credentials,
            transport,
            registry: self.registry,
        })
    }
}

impl Loopia {
    /// A client for the production endpoint.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        Self::builder(username, password).build()
    }

    /// A production client with credentials from `LOOPIA_USERNAME` and
    /// `LOOPIA_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        LoopiaBuilder::new(Credentials::from_env()?).build()
    }

    pub fn builder(username: impl Into<String>, password: impl Into<String>) -> LoopiaBuilder {
        LoopiaBuilder::new(Credentials::new(username, password))
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    // The closure shortens `&'static` to the borrow of `self`.
    #[allow(clippy::redundant_closure)]
    fn registry(&self) -> &ErrorRegistry {
        self.registry
            .as_deref()
            .unwrap_or_else(|| ErrorRegistry::global())
    }

    // ============ Call plumbing ============

    fn call(&self, method: &str, args: Vec<Value>) -> Result<RpcResponse> {
        let mut params = Vec::with_capacity(args.len() + 2);
        params.push(Value::from(self.credentials.username.as_str()));
        params.push(Value::from(self.credentials.password.as_str()));
        params.extend(args);

        log::debug!(
            "[loopia] {method} as {}",
            mask_identifier(&self.credentials.username)
        );

        self.transport
            .call(method, &params)
            .and_then(|raw| classify(raw).into_result(self.registry()))
            .inspect_err(|e| {
                if e.is_expected() {
                    log::warn!("[loopia] {method} failed: {e}");
                } else {
                    log::error!("[loopia] {method} failed: {e}");
                }
            })
    }

    /// Calls that only report a status.
    fn call_status(&self, method: &str, args: Vec<Value>) -> Result<()> {
        if let RpcResponse::Data(payload) = self.call(method, args)? {
            log::debug!("[loopia] {method} returned an unexpected {}", payload.type_name());
        }
        Ok(())
    }

    /// Calls that must return a payload.
    fn call_data(&self, method: &str, args: Vec<Value>) -> Result<Value> {
        match self.call(method, args)? {
            RpcResponse::Data(payload) => Ok(payload),
            _ => Err(LoopiaError::parse(format!("{method} returned no data"))),
        }
    }

    fn call_list(&self, method: &str, args: Vec<Value>) -> Result<Vec<Value>> {
        match self.call_data(method, args)? {
            Value::Array(items) => Ok(items),
            other => Err(LoopiaError::parse(format!(
                "{method} returned {} where an array was expected",
                other.type_name()
            ))),
        }
    }

    fn scope(domain: &str, subdomain: Option<&str>) -> Vec<Value> {
        vec![
            Value::from(domain),
            Value::from(subdomain.unwrap_or(ROOT_SUBDOMAIN)),
        ]
    }

    // ============ Domains ============

    /// Information about one domain on the account.
    pub fn get_domain(&self, domain: &str) -> Result<Domain> {
        let payload = self.call_data("getDomain", vec![Value::from(domain)])?;
        Domain::from_value(&payload)
    }

    /// All domains on the account.
    pub fn get_domains(&self) -> Result<Vec<Domain>> {
        self.call_list("getDomains", Vec::new())?
            .iter()
            .map(Domain::from_value)
            .collect()
    }

    /// Checks the credentials with a cheap read-only call.
    ///
    /// `AUTH_ERROR` yields `Ok(false)`; every other failure is returned.
    pub fn validate_credentials(&self) -> Result<bool> {
        match self.call("getDomains", Vec::new()) {
            Ok(_) => Ok(true),
            Err(LoopiaError::Remote(remote)) if remote.kind() == RemoteErrorKind::Auth => Ok(false),
            Err(e) => Err(e),
        }
    }

    // ============ Subdomains ============

    pub fn get_subdomains(&self, domain: &str) -> Result<Vec<String>> {
        self.call_list("getSubdomains", vec![Value::from(domain)])?
            .into_iter()
            .map(|item| match item {
                Value::String(name) => Ok(name),
                other => Err(LoopiaError::invalid_type("subdomain", "string", &other)),
            })
            .collect()
    }

    pub fn add_subdomain(&self, domain: &str, subdomain: &str) -> Result<()> {
        self.call_status("addSubdomain", Self::scope(domain, Some(subdomain)))
    }

    /// Removes `subdomain` (the zone root when `None`).
    pub fn remove_subdomain(&self, domain: &str, subdomain: Option<&str>) -> Result<()> {
        self.call_status("removeSubdomain", Self::scope(domain, subdomain))
    }

    // ============ Zone records ============

    /// Creates `record`. The provider assigns the id, so a record that
    /// already carries one is rejected before any request is made.
    pub fn add_zone_record(
        &self,
        record: &DnsRecord,
        domain: &str,
        subdomain: Option<&str>,
    ) -> Result<()> {
        if record.id() != 0 {
            return Err(LoopiaError::Precondition {
                detail: format!("record must not have an id, got {}", record.id()),
            });
        }

        let mut args = Self::scope(domain, subdomain);
        args.push(record.to_value());
        self.call_status("addZoneRecord", args)
    }

    pub fn get_zone_records(&self, domain: &str, subdomain: Option<&str>) -> Result<Vec<DnsRecord>> {
        self.call_list("getZoneRecords", Self::scope(domain, subdomain))?
            .iter()
            .map(DnsRecord::from_value)
            .collect()
    }

    /// Updates the record identified by `record.id()`.
    pub fn update_zone_record(
        &self,
        record: &DnsRecord,
        domain: &str,
        subdomain: Option<&str>,
    ) -> Result<()> {
        let mut args = Self::scope(domain, subdomain);
        args.push(record.to_value());
        self.call_status("updateZoneRecord", args)
    }

    /// Removes the record with `id`. The id may be a [`RecordId`], an
    /// integer or any other [`Value`]; it is validated before any request is
    /// made.
    pub fn remove_zone_record(
        &self,
        id: impl Into<Value>,
        domain: &str,
        subdomain: Option<&str>,
    ) -> Result<()> {
        let id = RecordId::try_from(id.into())?;

        let mut args = Self::scope(domain, subdomain);
        args.push(id.into());
        self.call_status("removeZoneRecord", args)
    }
}

impl std::fmt::Debug for Loopia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loopia")
            .field("credentials", &self.credentials)
            .field("custom_registry", &self.registry.is_some())
            .finish_non_exhaustive()
    }
}
