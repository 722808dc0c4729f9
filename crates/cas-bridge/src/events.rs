//! Event dispatch between the bridge and the host application.
//!
//! A small named-observer registry rather than a full event bus: listeners
//! subscribe under an event name, and a dispatched payload collects an
//! optional override record from them.

use dashmap::DashMap;
use tracing::debug;

use crate::record::UserRecord;

/// Event published after every successful handshake.
pub const AUTHENTICATE_EVENT: &str = "cas.authenticate";

/// Host lifecycle event the bridge consumes for logout.
pub const LOGOUT_EVENT: &str = "host.logout";

/// Payload shapes carried by bridge events.
///
/// The authenticate payload is version-dependent: a bare record under CAS
/// 2.0, a one-element sequence under every other protocol version. The
/// split exists for compatibility with listeners written against either
/// attribute shape and is preserved deliberately.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// The user record itself (CAS 2.0 authenticate shape).
    Record(UserRecord),
    /// The record wrapped in a one-element sequence (other versions).
    Wrapped(Vec<UserRecord>),
    /// Post-login payload: `{ user: <record> }`.
    PostLogin { user: UserRecord },
}

impl EventPayload {
    /// The record carried by this payload, regardless of shape.
    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            Self::Record(record) => Some(record),
            Self::Wrapped(records) => records.first(),
            Self::PostLogin { user } => Some(user),
        }
    }
}

type Listener = Box<dyn Fn(&EventPayload) -> Option<UserRecord> + Send + Sync>;

/// Registry of event listeners, keyed by event name.
///
/// Listeners run in subscription order; the last non-empty result wins as
/// the override. A listener returning `None` or an empty record leaves the
/// record untouched.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: DashMap<String, Vec<Listener>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            listeners: DashMap::new(),
        }
    }

    /// Register a listener for an event name.
    pub fn subscribe<F>(&self, event: &str, listener: F)
    where
        F: Fn(&EventPayload) -> Option<UserRecord> + Send + Sync + 'static,
    {
        self.listeners
            .entry(event.to_string())
            .or_default()
            .push(Box::new(listener));
    }

    /// Publish a payload to all listeners of `event`.
    ///
    /// Returns the last non-empty override any listener produced.
    pub fn dispatch(&self, event: &str, payload: &EventPayload) -> Option<UserRecord> {
        let listeners = self.listeners.get(event)?;
        let mut result = None;
        for listener in listeners.iter() {
            if let Some(record) = listener(payload)
                && !record.is_empty()
            {
                result = Some(record);
            }
        }
        debug!(
            event,
            listeners = listeners.len(),
            overridden = result.is_some(),
            "dispatched event"
        );
        result
    }

    /// Number of listeners registered for an event.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map(|l| l.len()).unwrap_or(0)
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("events", &self.listeners.len())
            .finish()
    }
}
