//! Plugin builders: the bridge objects that own a plugin instance and its
//! host event callbacks.

use std::sync::Arc;

use tracing::debug;

use crate::bridge::{BridgeHandle, EventBridge, EventData, EventRegistrar};
use crate::plugin::Plugin;

/// Shared state every plugin builder embeds: the event bridge and the
/// owned plugin instance.
///
/// The instance slot is `Some` exactly while the plugin is active.
/// Dropping a core with a live instance runs [`destroy`](Self::destroy),
/// so the unload notification is never skipped.
pub struct BuilderCore {
    bridge: Arc<EventBridge>,
    instance: Option<Box<dyn Plugin>>,
}

impl BuilderCore {
    /// Empty core: no instance, no callbacks.
    pub fn new() -> Self {
        Self {
            bridge: Arc::new(EventBridge::new()),
            instance: None,
        }
    }

    /// Non-owning handle for the plugin instance to emit events through.
    pub fn handle(&self) -> BridgeHandle {
        BridgeHandle::new(Arc::downgrade(&self.bridge))
    }

    /// Transient registration facade for host callbacks.
    pub fn registrar(&self) -> EventRegistrar<'_> {
        EventRegistrar::new(&self.bridge)
    }

    /// Synchronously dispatch an event to the host callback registered
    /// under `name`, if any.
    pub fn send(&self, name: &str, data: &EventData) {
        self.bridge.dispatch(name, data);
    }

    /// Forward a custom event to the owned plugin instance and wait for
    /// its handler to finish.
    ///
    /// No-op once the instance has been torn down; delivering to a
    /// destroyed builder is not a fault.
    pub async fn receive(&mut self, event: &str, data: &EventData) {
        if let Some(instance) = self.instance.as_mut() {
            instance.on_event(event, data).await;
        }
    }

    /// Store the constructed instance, then immediately fire its load
    /// notification.
    ///
    /// A previously stored instance is first retired through its unload
    /// notification, so every instance sees a balanced load/unload pair
    /// even when a builder stores twice. Host callbacks stay registered
    /// across the replacement.
    pub fn store_plugin(&mut self, plugin: Box<dyn Plugin>) {
        debug!(plugin = plugin.name(), "Storing plugin instance");
        if let Some(mut previous) = self.instance.take() {
            previous.on_unload();
        }
        let instance = self.instance.insert(plugin);
        instance.on_load();
    }

    /// Tear the builder down: fire the unload notification on the current
    /// instance, drop it, then clear the callback map.
    ///
    /// Idempotent; the order matters, since unload handlers may still emit
    /// events through the not-yet-cleared callbacks.
    pub fn destroy(&mut self) {
        if let Some(mut instance) = self.instance.take() {
            instance.on_unload();
        }
        self.bridge.clear();
    }

    /// Currently stored plugin instance, if the builder is active.
    pub fn instance(&self) -> Option<&dyn Plugin> {
        self.instance.as_deref()
    }

    /// Whether an instance is currently stored.
    pub fn is_active(&self) -> bool {
        self.instance.is_some()
    }
}

impl Default for BuilderCore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BuilderCore {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Bridge object obtained from a plugin's entry point.
///
/// Implementations embed a [`BuilderCore`] and override
/// [`build`](Self::build) to construct their plugin instance, optionally
/// running extra initialization first. [`BasicPluginBuilder`] covers
/// plugins with no custom initialization.
pub trait PluginBuilder: Send {
    /// Shared builder state.
    fn core(&self) -> &BuilderCore;

    /// Shared builder state, mutably.
    fn core_mut(&mut self) -> &mut BuilderCore;

    /// Construct exactly one plugin instance and hand it to
    /// [`BuilderCore::store_plugin`]. Invoked once, immediately after the
    /// builder crosses the entry point.
    ///
    /// The default body panics: a builder that never implemented its
    /// construction step is a non-recoverable configuration error.
    fn build(&mut self) {
        panic!("PluginBuilder::build() is not implemented");
    }
}

/// Constructor closure producing the plugin instance for a
/// [`BasicPluginBuilder`].
pub type PluginConstructor = Box<dyn FnOnce(BridgeHandle) -> Box<dyn Plugin> + Send>;

/// Builder for plugins that need no initialization beyond constructing
/// their instance.
pub struct BasicPluginBuilder {
    core: BuilderCore,
    constructor: Option<PluginConstructor>,
}

impl BasicPluginBuilder {
    /// Builder that will construct its plugin with `constructor`.
    ///
    /// The constructor receives the bridge handle the instance keeps as
    /// its back-reference to the host.
    pub fn new<F>(constructor: F) -> Self
    where
        F: FnOnce(BridgeHandle) -> Box<dyn Plugin> + Send + 'static,
    {
        Self {
            core: BuilderCore::new(),
            constructor: Some(Box::new(constructor)),
        }
    }
}

impl PluginBuilder for BasicPluginBuilder {
    fn core(&self) -> &BuilderCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BuilderCore {
        &mut self.core
    }

    fn build(&mut self) {
        let constructor = self
            .constructor
            .take()
            .expect("BasicPluginBuilder::build() may only be called once");
        let handle = self.core.handle();
        self.core.store_plugin(constructor(handle));
    }
}
