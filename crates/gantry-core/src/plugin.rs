//! The plugin-side contract.

use async_trait::async_trait;

use crate::bridge::EventData;

/// Logic object living inside a loaded plugin library.
///
/// Instances are constructed by their builder during `build()` and owned by
/// it until teardown. A plugin that emits events toward the host keeps the
/// [`BridgeHandle`](crate::bridge::BridgeHandle) its constructor receives.
///
/// The identity getters are read once, right after construction, to form
/// the plugin's [`PluginDetails`](crate::details::PluginDetails).
#[async_trait]
pub trait Plugin: Send {
    /// Declared plugin name.
    fn name(&self) -> &str;

    /// Declared version string.
    fn version(&self) -> &str;

    /// Declared author.
    fn author(&self) -> &str;

    /// Lifecycle notification, fired exactly once immediately after the
    /// instance is stored in its builder.
    fn on_load(&mut self) {}

    /// Lifecycle notification, fired exactly once at the start of
    /// teardown, while host callbacks are still registered.
    fn on_unload(&mut self) {}

    /// Custom event delivered from the host. Runs to completion before the
    /// delivery call returns; the default ignores the event.
    async fn on_event(&mut self, event: &str, data: &EventData) {
        let _ = (event, data);
    }
}
