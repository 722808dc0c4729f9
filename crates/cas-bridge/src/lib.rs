//! CAS single-sign-on bridge.
//!
//! A thin adapter between an external CAS protocol client and a host
//! application's pluggable authentication pipeline. The bridge configures
//! a process-wide client singleton from layered configuration, forces the
//! redirect-based handshake, maps the server's response into a user
//! attribute record, publishes lifecycle events, and coordinates the
//! two-phase logout round-trip through the CAS server.
//!
//! The protocol itself (ticket validation, session binding, redirect
//! construction) lives behind the [`client::CasProtocol`] trait; the
//! host's session and identity machinery lives behind the traits in
//! [`host`]. This crate implements neither, by design.

pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod record;
pub mod web;

pub use bridge::{AuthOutcome, CasBridge, HookAction, LogoutOutcome};
pub use client::{
    CasClient, CasEndpoint, CasPrincipal, CasProtocol, CasSingleton, ClientError, Handshake,
    TlsValidation,
};
pub use config::{CasConfig, CasConfigOverrides, CasVersion, ConfigError};
pub use error::BridgeError;
pub use events::{AUTHENTICATE_EVENT, EventDispatcher, EventPayload, LOGOUT_EVENT};
pub use host::{HostAuth, HostContext, LogoutEvent};
pub use record::UserRecord;
