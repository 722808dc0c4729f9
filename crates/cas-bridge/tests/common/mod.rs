//! Test utilities and common setup.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{Json, Router, routing::get};
use url::Url;

use cas_bridge::client::{
    CasEndpoint, CasProtocol, CasSingleton, ClientError, Handshake, TlsValidation,
};
use cas_bridge::web::{self, CurrentUser};
use cas_bridge::{CasBridge, CasConfig, CasPrincipal, HostAuth, HostContext, UserRecord};

/// Scripted CAS protocol client for end-to-end flows.
///
/// Starts without a session: the first handshake redirects to the CAS
/// login URL. After `establish` it yields the principal and reports an
/// active session until `drop_session`.
#[derive(Default)]
pub struct ScriptedCas {
    pub configure_calls: AtomicUsize,
    pub transport: Mutex<HashMap<String, String>>,
    pub validation: Mutex<Option<TlsValidation>>,
    principal: Mutex<Option<CasPrincipal>>,
    session_active: AtomicBool,
    pub last_return_url: Mutex<Option<Url>>,
}

impl ScriptedCas {
    pub fn login_url() -> Url {
        Url::parse("https://cas.example.org/cas/login?service=https%3A%2F%2Fapp.example.org%2F")
            .unwrap()
    }

    pub fn logout_url() -> Url {
        Url::parse("https://cas.example.org/cas/logout").unwrap()
    }

    /// Simulate the user completing the CAS login round-trip.
    pub fn establish(&self, principal: CasPrincipal) {
        *self.principal.lock().unwrap() = Some(principal);
        self.session_active.store(true, Ordering::SeqCst);
    }

    /// Simulate the CAS server having torn the session down.
    pub fn drop_session(&self) {
        *self.principal.lock().unwrap() = None;
        self.session_active.store(false, Ordering::SeqCst);
    }
}

impl CasProtocol for ScriptedCas {
    fn configure(&self, _endpoint: &CasEndpoint) -> Result<(), ClientError> {
        self.configure_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn enable_debug_log(&self, _path: &Path) {}

    fn apply_transport_option(&self, name: &str, value: &str) -> Result<(), ClientError> {
        self.transport
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn apply_server_validation(&self, mode: &TlsValidation) -> Result<(), ClientError> {
        *self.validation.lock().unwrap() = Some(mode.clone());
        Ok(())
    }

    fn set_logout_request_handling(&self, _enabled: bool) {}

    fn force_authentication(&self) -> Result<Handshake, ClientError> {
        match self.principal.lock().unwrap().clone() {
            Some(principal) => Ok(Handshake::Established(principal)),
            None => Ok(Handshake::Redirect(Self::login_url())),
        }
    }

    fn session_active(&self) -> bool {
        self.session_active.load(Ordering::SeqCst)
    }

    fn logout(&self, return_url: &Url) -> Result<Url, ClientError> {
        *self.last_return_url.lock().unwrap() = Some(return_url.clone());
        let mut url = Self::logout_url();
        url.query_pairs_mut().append_pair("url", return_url.as_str());
        Ok(url)
    }
}

/// Host context whose auth helper resolves users through the bridge's
/// middleware-produced records.
pub struct TestHost {
    pub auth: Arc<TestAuth>,
}

impl HostContext for TestHost {
    fn events(&self) -> Option<Arc<cas_bridge::EventDispatcher>> {
        None
    }

    fn auth(&self) -> Option<Arc<dyn HostAuth>> {
        Some(self.auth.clone())
    }
}

#[derive(Default)]
pub struct TestAuth {
    pub identified: Mutex<Option<UserRecord>>,
    pub stored: Mutex<Option<UserRecord>>,
    pub logout_redirect: Option<String>,
}

impl HostAuth for TestAuth {
    fn identify(&self) -> Option<UserRecord> {
        self.identified.lock().unwrap().clone()
    }

    fn store_user(&self, user: &UserRecord) {
        *self.stored.lock().unwrap() = Some(user.clone());
    }

    fn logout_redirect(&self) -> Option<String> {
        self.logout_redirect.clone()
    }
}

/// Default test configuration pointed at a scripted CAS server.
pub fn test_config() -> CasConfig {
    CasConfig {
        hostname: "cas.example.org".to_string(),
        uri: "/cas".to_string(),
        service_url: Some(Url::parse("https://app.example.org/").unwrap()),
        ..CasConfig::default()
    }
}

/// Construct a bridge against a fresh singleton and the given scripted
/// client.
pub fn test_bridge(
    cas: Arc<ScriptedCas>,
    config: CasConfig,
    host: Option<Arc<dyn HostContext>>,
) -> Arc<CasBridge> {
    let singleton = CasSingleton::new();
    Arc::new(
        CasBridge::with_singleton(&singleton, config, cas, host).expect("bridge construction"),
    )
}

/// Create a test application: a protected route plus the logout endpoint.
pub fn test_app(bridge: Arc<CasBridge>) -> Router {
    async fn whoami(user: CurrentUser) -> Json<UserRecord> {
        Json(user.record)
    }

    let protected = Router::new()
        .route("/whoami", get(whoami))
        .layer(axum::middleware::from_fn_with_state(
            bridge.clone(),
            web::cas_middleware,
        ));

    Router::new()
        .merge(protected)
        .route("/auth/logout", get(web::logout))
        .with_state(bridge)
}
