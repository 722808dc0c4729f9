//! Bridge errors and their HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::client::ClientError;
use crate::config::ConfigError;

/// Errors surfaced by bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration was invalid at construction.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The protocol client failed; surfaced verbatim, never retried.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A relative logout target cannot be absolutized without a
    /// configured `service_url`.
    #[error("service_url must be configured to absolutize relative redirect targets")]
    ServiceUrlRequired,

    /// The logout redirect target could not be turned into a URL.
    #[error("invalid redirect target: {0}")]
    InvalidRedirectTarget(String),

    /// No authenticated user on the request.
    #[error("not authenticated")]
    Unauthenticated,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct BridgeErrorResponse {
    pub error: String,
    pub error_code: String,
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            BridgeError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "invalid_config"),
            BridgeError::Client(_) => (StatusCode::BAD_GATEWAY, "cas_client_error"),
            BridgeError::ServiceUrlRequired => {
                (StatusCode::INTERNAL_SERVER_ERROR, "service_url_required")
            }
            BridgeError::InvalidRedirectTarget(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "invalid_redirect_target")
            }
            BridgeError::Unauthenticated => (StatusCode::UNAUTHORIZED, "not_authenticated"),
        };

        let body = Json(BridgeErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
        });

        (status, body).into_response()
    }
}
