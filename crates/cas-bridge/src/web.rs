//! axum integration: middleware, extractor, and logout handler.
//!
//! The host application owns routing and session persistence; this module
//! only adapts bridge outcomes to HTTP. An `AuthOutcome::Redirect` becomes
//! a temporary redirect response, an authenticated record rides along in
//! request extensions.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::bridge::{AuthOutcome, CasBridge, LogoutOutcome};
use crate::error::BridgeError;
use crate::host::LogoutEvent;
use crate::record::UserRecord;

/// Authenticated user extracted from request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The user attribute record the bridge produced.
    pub record: UserRecord,
}

impl CurrentUser {
    /// The `username` attribute.
    pub fn username(&self) -> Option<&str> {
        self.record.username()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = BridgeError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(BridgeError::Unauthenticated)
    }
}

/// Authentication middleware.
///
/// Runs the bridge's forced handshake. An established handshake injects
/// [`CurrentUser`] into request extensions and continues; a pending
/// handshake short-circuits with a redirect to the CAS server.
pub async fn cas_middleware(
    State(bridge): State<Arc<CasBridge>>,
    mut req: Request,
    next: Next,
) -> Response {
    match bridge.authenticate() {
        Ok(AuthOutcome::Authenticated(record)) => {
            req.extensions_mut().insert(CurrentUser { record });
            next.run(req).await
        }
        Ok(AuthOutcome::Redirect(url)) => Redirect::temporary(url.as_str()).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Logout handler driving the two-phase CAS logout.
///
/// Phase one answers with a redirect to the CAS server; phase two (the
/// server's return redirect) answers `204 No Content`, leaving session
/// teardown to the host's own logout handling.
pub async fn logout(State(bridge): State<Arc<CasBridge>>) -> Result<Response, BridgeError> {
    let redirect = bridge
        .host()
        .and_then(|h| h.auth())
        .and_then(|a| a.logout_redirect());
    let event = LogoutEvent::new(redirect);

    match bridge.logout(&event)? {
        LogoutOutcome::Redirect(url) => Ok(Redirect::temporary(url.as_str()).into_response()),
        LogoutOutcome::Completed => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}
