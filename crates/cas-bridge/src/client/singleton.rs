//! Lazily-initialized, process-wide CAS client.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use super::protocol::{CasEndpoint, CasProtocol, ClientError};
use super::CasClient;

/// A synchronized-once holder for the shared [`CasClient`].
///
/// The initialization guard is explicit and idempotent: initializing an
/// already-initialized singleton is a no-op that returns the existing
/// client. Repeated bridge construction (common under test execution)
/// therefore cannot fail on re-initialization.
///
/// Production code shares the [`global`] instance; tests construct their
/// own so static state never leaks between them.
pub struct CasSingleton {
    cell: OnceCell<Arc<CasClient>>,
}

impl CasSingleton {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Whether the client has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Initialize the client, or return the existing one.
    ///
    /// The endpoint and protocol handle are only consulted on the first
    /// call; later calls reuse the client configured then.
    pub fn initialize(
        &self,
        endpoint: CasEndpoint,
        protocol: Arc<dyn CasProtocol>,
    ) -> Result<Arc<CasClient>, ClientError> {
        if let Some(existing) = self.cell.get() {
            debug!("CAS client already initialized, reusing");
            return Ok(existing.clone());
        }
        self.cell
            .get_or_try_init(|| CasClient::new(endpoint, protocol).map(Arc::new))
            .cloned()
    }

    /// The initialized client, if any.
    pub fn get(&self) -> Option<Arc<CasClient>> {
        self.cell.get().cloned()
    }
}

impl Default for CasSingleton {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide singleton shared by all bridges.
pub fn global() -> &'static CasSingleton {
    static GLOBAL: CasSingleton = CasSingleton::new();
    &GLOBAL
}
