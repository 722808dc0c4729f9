//! Configured CAS client handle and its process-wide singleton.

mod singleton;
pub mod protocol;

pub use protocol::{
    CasEndpoint, CasPrincipal, CasProtocol, ClientError, Handshake, TlsValidation,
};
pub use singleton::{CasSingleton, global};

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing::debug;
use url::Url;

/// A CAS client bound to one server endpoint.
///
/// The endpoint is fixed at initialization. TLS validation and transport
/// options are re-applied on every bridge construction, so they live
/// behind locks.
pub struct CasClient {
    endpoint: CasEndpoint,
    protocol: Arc<dyn CasProtocol>,
    tls: RwLock<TlsValidation>,
    transport: RwLock<HashMap<String, String>>,
}

impl CasClient {
    pub(crate) fn new(
        endpoint: CasEndpoint,
        protocol: Arc<dyn CasProtocol>,
    ) -> Result<Self, ClientError> {
        protocol.configure(&endpoint)?;
        debug!(
            hostname = %endpoint.hostname,
            port = endpoint.port,
            version = %endpoint.version,
            "CAS client configured"
        );
        Ok(Self {
            endpoint,
            protocol,
            tls: RwLock::new(TlsValidation::Insecure),
            transport: RwLock::new(HashMap::new()),
        })
    }

    pub fn endpoint(&self) -> &CasEndpoint {
        &self.endpoint
    }

    /// Enable protocol-level debug logging.
    pub fn enable_debug_log(&self, path: &Path) {
        self.protocol.enable_debug_log(path);
    }

    /// Apply extra transport options to the protocol client.
    pub fn apply_transport_options(
        &self,
        options: &HashMap<String, String>,
    ) -> Result<(), ClientError> {
        for (name, value) in options {
            self.protocol.apply_transport_option(name, value)?;
        }
        let mut transport = self
            .transport
            .write()
            .map_err(|_| ClientError::Protocol("transport lock poisoned".to_string()))?;
        transport.extend(options.clone());
        Ok(())
    }

    /// Transport options applied so far.
    pub fn transport_options(&self) -> HashMap<String, String> {
        self.transport
            .read()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    /// Set the server certificate validation mode.
    pub fn set_server_validation(&self, mode: TlsValidation) -> Result<(), ClientError> {
        self.protocol.apply_server_validation(&mode)?;
        let mut tls = self
            .tls
            .write()
            .map_err(|_| ClientError::Protocol("TLS lock poisoned".to_string()))?;
        *tls = mode;
        Ok(())
    }

    /// Current server certificate validation mode.
    pub fn server_validation(&self) -> TlsValidation {
        self.tls
            .read()
            .map(|t| t.clone())
            .unwrap_or(TlsValidation::Insecure)
    }

    pub fn set_logout_request_handling(&self, enabled: bool) {
        self.protocol.set_logout_request_handling(enabled);
    }

    pub fn force_authentication(&self) -> Result<Handshake, ClientError> {
        self.protocol.force_authentication()
    }

    pub fn session_active(&self) -> bool {
        self.protocol.session_active()
    }

    pub fn logout(&self, return_url: &Url) -> Result<Url, ClientError> {
        self.protocol.logout(return_url)
    }
}

impl std::fmt::Debug for CasClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CasClient")
            .field("endpoint", &self.endpoint)
            .field("tls", &self.server_validation())
            .finish_non_exhaustive()
    }
}
