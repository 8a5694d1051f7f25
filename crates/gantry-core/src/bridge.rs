//! Host-side event bridge: named callbacks plus the non-owning handle a
//! plugin instance keeps as its back-reference.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

/// Opaque event payload, always passed by reference.
///
/// Payloads stay valid for the duration of the synchronous callback or the
/// awaited delivery; there is no ownership transfer and no serialization
/// format. Receivers downcast to the concrete type they expect.
pub type EventData = dyn Any + Send + Sync;

/// Host callback invoked when a plugin emits the matching event.
pub type EventCallback = Arc<dyn Fn(&EventData) + Send + Sync>;

/// Event-name to callback mapping shared between a builder and the handles
/// held by its plugin instance.
///
/// At most one callback per event name; registering again replaces the
/// previous one.
pub struct EventBridge {
    callbacks: Mutex<HashMap<String, EventCallback>>,
}

impl EventBridge {
    pub(crate) fn new() -> Self {
        Self {
            callbacks: Mutex::new(HashMap::new()),
        }
    }

    /// Register `callback` under `name`, replacing any prior registration.
    pub fn register<F>(&self, name: impl Into<String>, callback: F)
    where
        F: Fn(&EventData) + Send + Sync + 'static,
    {
        self.callbacks.lock().insert(name.into(), Arc::new(callback));
    }

    /// Invoke the callback registered under `name`, if any.
    ///
    /// An event with no registered callback is silently dropped; that is
    /// the normal "host does not care" case, not an error. The callback
    /// runs outside the map lock, so it may re-enter the bridge.
    pub fn dispatch(&self, name: &str, data: &EventData) {
        let callback = self.callbacks.lock().get(name).cloned();
        match callback {
            Some(callback) => callback(data),
            None => debug!(event = name, "No callback registered, dropping event"),
        }
    }

    /// Remove every registered callback.
    pub fn clear(&self) {
        self.callbacks.lock().clear();
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.callbacks.lock().len()
    }

    /// Whether no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Non-owning back-reference from a plugin instance to its builder's
/// bridge.
///
/// The builder outlives its instance by construction, but handles may be
/// cloned into places with looser lifetimes, so every use checks liveness
/// and degrades to a no-op once the bridge is gone.
#[derive(Clone)]
pub struct BridgeHandle {
    bridge: Weak<EventBridge>,
}

impl BridgeHandle {
    pub(crate) fn new(bridge: Weak<EventBridge>) -> Self {
        Self { bridge }
    }

    /// Emit an event toward the host.
    ///
    /// No-op when the bridge is gone or no callback is registered under
    /// `name`.
    pub fn send(&self, name: &str, data: &EventData) {
        if let Some(bridge) = self.bridge.upgrade() {
            bridge.dispatch(name, data);
        }
    }

    /// Whether the owning bridge is still alive.
    pub fn is_live(&self) -> bool {
        self.bridge.strong_count() > 0
    }
}

/// Transient registration facade handed to load hooks, so host callbacks
/// are in place before any event round-trip can occur.
pub struct EventRegistrar<'a> {
    bridge: &'a EventBridge,
}

impl<'a> EventRegistrar<'a> {
    pub(crate) fn new(bridge: &'a EventBridge) -> Self {
        Self { bridge }
    }

    /// Register `callback` under `name`, replacing any prior registration.
    pub fn register<F>(&self, name: impl Into<String>, callback: F)
    where
        F: Fn(&EventData) + Send + Sync + 'static,
    {
        self.bridge.register(name, callback);
    }
}
