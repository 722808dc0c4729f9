//! The seam toward the external CAS protocol library.
//!
//! Everything protocol-shaped lives behind [`CasProtocol`]: ticket
//! validation, session cookie binding, redirect construction, TLS trust.
//! This crate only configures and drives it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::{CasConfig, CasVersion};

/// Where the CAS server lives. Fixed at singleton initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasEndpoint {
    pub version: CasVersion,
    pub hostname: String,
    pub port: u16,
    pub uri: String,
}

impl CasEndpoint {
    pub fn from_config(config: &CasConfig) -> Self {
        Self {
            version: config.version,
            hostname: config.hostname.clone(),
            port: config.port,
            uri: config.uri.clone(),
        }
    }

    /// Base URL of the CAS server (`https://hostname:port/uri`).
    pub fn server_url(&self) -> Result<Url, ClientError> {
        let base = format!("https://{}:{}", self.hostname, self.port);
        let mut url = Url::parse(&base)
            .map_err(|e| ClientError::Protocol(format!("invalid CAS endpoint: {e}")))?;
        if !self.uri.is_empty() {
            url.set_path(&self.uri);
        }
        Ok(url)
    }
}

/// Server certificate validation mode.
///
/// Absence of a CA bundle in the configuration puts the client in explicit
/// insecure mode, mirroring the upstream adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsValidation {
    /// No server certificate validation.
    Insecure,
    /// Validate against the CA bundle at this path.
    CaBundle(PathBuf),
}

/// The identity the CAS server vouched for.
#[derive(Debug, Clone, PartialEq)]
pub struct CasPrincipal {
    /// Login name asserted by the CAS server.
    pub username: String,
    /// Protocol-supplied attributes (empty under CAS 1.0).
    pub attributes: HashMap<String, Value>,
}

impl CasPrincipal {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

/// Outcome of forcing the authentication handshake.
#[derive(Debug, Clone, PartialEq)]
pub enum Handshake {
    /// No valid ticket yet: the browser must be sent to this CAS login URL.
    Redirect(Url),
    /// A valid ticket or session exists: execution continues authenticated.
    Established(CasPrincipal),
}

/// Errors surfaced by the protocol client. The bridge never retries or
/// translates these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The client rejected a transport option.
    #[error("transport option rejected: {name}: {reason}")]
    TransportRejected { name: String, reason: String },

    /// The client rejected the TLS validation configuration.
    #[error("TLS configuration rejected: {0}")]
    TlsRejected(String),

    /// The handshake failed outright (e.g. ticket validation error).
    #[error("authentication handshake failed: {0}")]
    Handshake(String),

    /// Any other protocol-level failure.
    #[error("protocol client error: {0}")]
    Protocol(String),
}

/// Interface of the wrapped CAS client library.
///
/// Implementations own the handshake, HTTP redirect handling, and session
/// binding. All methods take `&self`; implementations carry their own
/// interior state.
pub trait CasProtocol: Send + Sync {
    /// Bind the client to its CAS server endpoint. Called exactly once per
    /// process by the singleton initializer.
    fn configure(&self, endpoint: &CasEndpoint) -> Result<(), ClientError>;

    /// Enable protocol-level debug logging to the given path.
    fn enable_debug_log(&self, path: &Path);

    /// Apply one extra transport option (e.g. an HTTP client tunable).
    fn apply_transport_option(&self, name: &str, value: &str) -> Result<(), ClientError>;

    /// Set the server certificate validation mode.
    fn apply_server_validation(&self, mode: &TlsValidation) -> Result<(), ClientError>;

    /// Enable or disable the client's automatic handling of single-logout
    /// requests arriving from the CAS server.
    fn set_logout_request_handling(&self, enabled: bool);

    /// Force the authentication handshake.
    fn force_authentication(&self) -> Result<Handshake, ClientError>;

    /// Whether the client currently holds an authenticated CAS session.
    fn session_active(&self) -> bool;

    /// Start a CAS logout, asking the server to send the browser back to
    /// `return_url` afterwards. Returns the CAS logout URL to redirect to.
    fn logout(&self, return_url: &Url) -> Result<Url, ClientError>;
}
