//! Seams toward the host application's auth pipeline.
//!
//! The bridge never owns sessions or identity resolution; it reaches the
//! host through these traits. Both are optional at runtime: a bridge
//! without a host context simply reports "no user".

use std::sync::Arc;

use crate::events::EventDispatcher;
use crate::record::UserRecord;

/// The host's own authentication helper (session owner).
pub trait HostAuth: Send + Sync {
    /// Run the host's identity pipeline. Re-enters the bridge's
    /// authenticate operation indirectly.
    fn identify(&self) -> Option<UserRecord>;

    /// Persist the identified user into the host's session mechanism.
    fn store_user(&self, user: &UserRecord);

    /// The host's configured post-logout redirect target, if any.
    fn logout_redirect(&self) -> Option<String> {
        None
    }
}

/// The enclosing registry/controller the bridge was constructed under.
pub trait HostContext: Send + Sync {
    /// The host's event dispatcher, when one is reachable.
    fn events(&self) -> Option<Arc<EventDispatcher>>;

    /// The host's auth helper, when one is reachable.
    fn auth(&self) -> Option<Arc<dyn HostAuth>>;
}

/// Payload of the host's logout lifecycle event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogoutEvent {
    /// Post-logout redirect target configured by the host. Falls back to
    /// the root path when unset.
    pub redirect: Option<String>,
}

impl LogoutEvent {
    pub fn new(redirect: Option<String>) -> Self {
        Self { redirect }
    }
}
