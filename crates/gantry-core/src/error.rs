//! Error types for the plugin runtime.

use std::path::PathBuf;

/// Result type for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;

/// Errors surfaced by plugin loading and management.
///
/// Every variant is reported synchronously to the caller of the failing
/// operation; nothing is retried or deferred internally.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// A plugin from this path is already registered.
    #[error("Plugin already loaded: {}", .0.display())]
    AlreadyLoaded(PathBuf),

    /// The path does not denote a readable file.
    #[error("Invalid plugin path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// The entry point symbol could not be resolved in the library.
    #[error("Entry point symbol not found: {0}")]
    LoadingSymbolNotFound(String),

    /// The plugin could not be loaded; carries the underlying diagnostic.
    #[error("Failed to load plugin: {0}")]
    UnknownError(String),

    /// An integrity checker rejected the plugin.
    #[error("Security violation: {0}")]
    SecurityError(String),
}
