//! Gantry Plugin SDK
//!
//! Everything a plugin author needs to produce a conforming Gantry plugin:
//! the [`Plugin`] trait, the builder types and the [`export_plugin!`]
//! macro emitting the entry point symbol.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use gantry_sdk::prelude::*;
//!
//! struct MyPlugin {
//!     bridge: BridgeHandle,
//! }
//!
//! #[async_trait]
//! impl Plugin for MyPlugin {
//!     fn name(&self) -> &str { "MyPlugin" }
//!     fn version(&self) -> &str { "1.0.0" }
//!     fn author(&self) -> &str { "Me" }
//!
//!     async fn on_event(&mut self, event: &str, data: &EventData) {
//!         if event == "ping" {
//!             self.bridge.send("pong", data);
//!         }
//!     }
//! }
//!
//! export_plugin!(BasicPluginBuilder::new(|bridge| Box::new(MyPlugin { bridge })));
//! ```
//!
//! Build with `crate-type = ["cdylib"]` and point the host's
//! `PluginManager` at the resulting library.
//!
//! The macro is convenience, not contract: a hand-written
//! `#[no_mangle] pub extern "C" fn createPlugin() -> *mut c_void` that
//! heap-allocates a `Box<dyn PluginBuilder>` and leaks the outer box
//! satisfies the host equally well. Host and plugin must be built with the
//! same Rust toolchain.

pub use async_trait::async_trait;

pub use gantry_core::{
    BasicPluginBuilder, BridgeHandle, BuilderCore, EventData, Plugin, PluginBuilder,
    PluginConstructor,
};

/// Common imports for plugin authors.
pub mod prelude {
    pub use crate::export_plugin;
    pub use crate::{
        async_trait, BasicPluginBuilder, BridgeHandle, BuilderCore, EventData, Plugin,
        PluginBuilder,
    };
}

/// Emit the plugin entry point symbol.
///
/// Expands to `createPlugin`, the default symbol the host resolves: a
/// zero-argument `extern "C"` function that constructs the given builder
/// on the heap and transfers sole ownership of it to the caller.
///
/// ```rust,ignore
/// export_plugin!(BasicPluginBuilder::new(|bridge| Box::new(MyPlugin { bridge })));
/// ```
#[macro_export]
macro_rules! export_plugin {
    ($builder:expr) => {
        #[no_mangle]
        #[allow(non_snake_case)]
        pub extern "C" fn createPlugin() -> *mut ::std::ffi::c_void {
            let builder: ::std::boxed::Box<dyn $crate::PluginBuilder> =
                ::std::boxed::Box::new($builder);
            ::std::boxed::Box::into_raw(::std::boxed::Box::new(builder)).cast()
        }
    };
}
