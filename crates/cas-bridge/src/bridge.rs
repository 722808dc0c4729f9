//! The CAS bridge adapter.
//!
//! Glue between the process-wide CAS client and the host's auth pipeline:
//! configure the client once, force the handshake, translate the result
//! into a user record, publish lifecycle events, and coordinate the
//! two-phase logout round-trip through the CAS server.

use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::client::{
    CasClient, CasEndpoint, CasProtocol, CasSingleton, Handshake, TlsValidation, global,
};
use crate::config::{CasConfig, CasVersion};
use crate::error::BridgeError;
use crate::events::{AUTHENTICATE_EVENT, EventDispatcher, EventPayload, LOGOUT_EVENT};
use crate::host::{HostContext, LogoutEvent};
use crate::record::UserRecord;

/// Outcome of [`CasBridge::authenticate`].
///
/// The handshake either completes locally or must bounce the browser to
/// the CAS server; there is no implicit non-local exit.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// Handshake established; the final (possibly listener-overridden)
    /// user record.
    Authenticated(UserRecord),
    /// No valid ticket yet: send the browser here.
    Redirect(Url),
}

/// Outcome of [`CasBridge::logout`].
#[derive(Debug, Clone, PartialEq)]
pub enum LogoutOutcome {
    /// Phase one: an active CAS session exists. Send the browser to this
    /// CAS logout URL; the server will redirect back to the same endpoint.
    Redirect(Url),
    /// Phase two: no active CAS session. Nothing to do here; session
    /// teardown belongs to the host's own post-event handling.
    Completed,
}

/// Operations the host dispatcher may bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    Logout,
}

/// The adapter. All bridges in a process share one CAS client.
pub struct CasBridge {
    config: CasConfig,
    client: Arc<CasClient>,
    events: Option<Arc<EventDispatcher>>,
    host: Option<Arc<dyn HostContext>>,
}

impl CasBridge {
    /// Construct a bridge against the process-wide client singleton.
    pub fn new(
        config: CasConfig,
        protocol: Arc<dyn CasProtocol>,
        host: Option<Arc<dyn HostContext>>,
    ) -> Result<Self, BridgeError> {
        Self::with_singleton(global(), config, protocol, host)
    }

    /// Construct a bridge against a specific singleton.
    ///
    /// The singleton initializes its client on the first construction
    /// only; every construction re-applies debug logging, transport
    /// options, and the server validation mode.
    pub fn with_singleton(
        singleton: &CasSingleton,
        config: CasConfig,
        protocol: Arc<dyn CasProtocol>,
        host: Option<Arc<dyn HostContext>>,
    ) -> Result<Self, BridgeError> {
        config.validate()?;

        let client = singleton.initialize(CasEndpoint::from_config(&config), protocol)?;

        if let Some(path) = &config.debug_log {
            client.enable_debug_log(path);
        }

        client.apply_transport_options(&config.transport_options)?;

        match &config.ca_cert {
            None => client.set_server_validation(TlsValidation::Insecure)?,
            Some(path) => client.set_server_validation(TlsValidation::CaBundle(path.clone()))?,
        }

        let events = host.as_ref().and_then(|h| h.events());

        info!(
            hostname = %config.hostname,
            version = %config.version,
            insecure = config.ca_cert.is_none(),
            "CAS bridge ready"
        );

        Ok(Self {
            config,
            client,
            events,
            host,
        })
    }

    pub fn config(&self) -> &CasConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<CasClient> {
        &self.client
    }

    pub fn host(&self) -> Option<&Arc<dyn HostContext>> {
        self.host.as_ref()
    }

    /// Force the authentication handshake and build the user record.
    ///
    /// Single-logout request handling is disabled at this call site;
    /// logout is coordinated separately through [`CasBridge::logout`].
    /// Handshake failures propagate from the client untouched.
    pub fn authenticate(&self) -> Result<AuthOutcome, BridgeError> {
        self.client.set_logout_request_handling(false);

        let principal = match self.client.force_authentication()? {
            Handshake::Redirect(url) => {
                debug!(%url, "no CAS session, redirecting to server");
                return Ok(AuthOutcome::Redirect(url));
            }
            Handshake::Established(principal) => principal,
        };

        let mut user = UserRecord::new(principal.username, principal.attributes);

        if let Some(events) = &self.events {
            // Listeners see the attribute shape their protocol version
            // historically produced: bare record for 2.0, a one-element
            // sequence for everything else.
            let payload = match self.config.version {
                CasVersion::V2 => EventPayload::Record(user.clone()),
                _ => EventPayload::Wrapped(vec![user.clone()]),
            };
            if let Some(overridden) = events.dispatch(AUTHENTICATE_EVENT, &payload) {
                user = overridden;
            }

            if let Some(login_event) = &self.config.login_event {
                events.dispatch(login_event, &EventPayload::PostLogin { user: user.clone() });
            }
        }

        info!(username = user.username().unwrap_or_default(), "CAS handshake established");
        Ok(AuthOutcome::Authenticated(user))
    }

    /// Resolve the current user through the host's own identity pipeline.
    ///
    /// Returns `None` when no host context or auth helper is reachable.
    /// On success the user is stored into the host session immediately:
    /// CAS authentication is redirect-driven, so lazy identification
    /// would leave the session unpopulated.
    pub fn get_user(&self) -> Option<UserRecord> {
        let auth = self.host.as_ref()?.auth()?;
        let user = auth.identify()?;
        auth.store_user(&user);
        Some(user)
    }

    /// Handle the host's logout lifecycle event.
    ///
    /// Two phases, split by a round-trip through the CAS server: while a
    /// CAS session is active, compute the post-logout return URL and start
    /// the server-side logout; after the server redirects back, the
    /// session is gone and the event completes as a no-op.
    pub fn logout(&self, event: &LogoutEvent) -> Result<LogoutOutcome, BridgeError> {
        if !self.client.session_active() {
            debug!("no active CAS session, logout is a no-op");
            return Ok(LogoutOutcome::Completed);
        }

        let target = event.redirect.as_deref().unwrap_or("/");
        let return_url = self.absolute_return_url(target)?;
        let cas_url = self.client.logout(&return_url)?;

        info!(%return_url, "starting CAS logout round-trip");
        Ok(LogoutOutcome::Redirect(cas_url))
    }

    /// The adapter's published interface toward the host dispatcher: one
    /// binding, the host logout event to [`CasBridge::logout`].
    pub fn hooks() -> &'static [(&'static str, HookAction)] {
        &[(LOGOUT_EVENT, HookAction::Logout)]
    }

    fn absolute_return_url(&self, target: &str) -> Result<Url, BridgeError> {
        if let Ok(url) = Url::parse(target) {
            return Ok(url);
        }
        let base = self
            .config
            .service_url
            .as_ref()
            .ok_or(BridgeError::ServiceUrlRequired)?;
        base.join(target)
            .map_err(|_| BridgeError::InvalidRedirectTarget(target.to_string()))
    }
}

impl std::fmt::Debug for CasBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CasBridge")
            .field("endpoint", self.client.endpoint())
            .field("events_bound", &self.events.is_some())
            .finish_non_exhaustive()
    }
}
