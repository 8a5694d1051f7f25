//! Gantry: a native plugin runtime.
//!
//! Gantry lets a host process load, message, reload and unload native
//! plugin libraries at runtime, while controlling which binaries are
//! allowed to execute.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                    PluginManager                     │
//! │    registry · load/unload/reload · event delivery    │
//! └──────────────────────────────────────────────────────┘
//!        │ hash gate · dlopen · entry point
//!        ▼
//! ┌──────────────────┐       ┌───────────────────────────┐
//! │ IntegrityChecker │       │   PluginBuilder bridge    │
//! │   allow-list /   │       │ callbacks ⇄ Plugin trait  │
//! │  whitelist file  │       │   lifecycle + teardown    │
//! └──────────────────┘       └───────────────────────────┘
//! ```
//!
//! A plugin library exports a single entry point symbol (default
//! `createPlugin`) returning a heap-allocated builder; everything else,
//! event exchange, lifecycle notifications and teardown, flows through
//! that builder. Plugin authors should depend on `gantry-sdk`, which
//! re-exports the contract types and provides the `export_plugin!` macro.
//!
//! Host and plugins must be built with the same Rust toolchain: the entry
//! point hands a `Box<dyn PluginBuilder>` across the library boundary.
//!
//! # Example
//!
//! ```rust,ignore
//! use gantry_core::{PluginManager, WhitelistChecker};
//!
//! let checker = WhitelistChecker::load_default()?;
//! let mut manager = PluginManager::new().with_integrity_checker(checker);
//!
//! let details = manager.load_with("plugins/example", |registrar| {
//!     registrar.register("pong", |data| {
//!         if let Some(msg) = data.downcast_ref::<String>() {
//!             println!("pong: {msg}");
//!         }
//!     });
//! })?;
//!
//! let payload = String::from("hello world");
//! manager.send("ping", &payload, |d| d.name == details.name).await;
//! manager.unload(|d| d.name == details.name);
//! ```

pub mod bridge;
pub mod builder;
pub mod details;
pub mod error;
pub mod integrity;
pub mod library;
pub mod manager;
pub mod plugin;

// Re-exports
pub use bridge::{BridgeHandle, EventBridge, EventCallback, EventData, EventRegistrar};
pub use builder::{BasicPluginBuilder, BuilderCore, PluginBuilder, PluginConstructor};
pub use details::PluginDetails;
pub use error::{PluginError, Result};
pub use integrity::{
    compute_md5, AllowListChecker, IntegrityChecker, PluginView, WhitelistChecker, WhitelistEntry,
    WhitelistError, DEFAULT_WHITELIST_PATH, RECORDING_ENV_VAR,
};
pub use library::{is_library_file, platform_library_extension, CreatePluginFn};
pub use manager::{LoadedPlugin, PluginManager, DEFAULT_ENTRY_SYMBOL};
pub use plugin::Plugin;
