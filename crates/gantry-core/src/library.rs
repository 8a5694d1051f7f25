//! Thin wrapper over the operating system's dynamic-library loader.

use std::ffi::c_void;
use std::path::Path;

use libloading::{Library, Symbol};
use tracing::warn;

use crate::error::{PluginError, Result};

/// Signature of a plugin entry point: zero arguments, returning an opaque
/// pointer to a heap-allocated builder whose sole ownership transfers to
/// the caller. Null signals construction failure.
pub type CreatePluginFn = unsafe extern "C" fn() -> *mut c_void;

/// Dynamic-library file extension for the current platform.
pub fn platform_library_extension() -> &'static str {
    match std::env::consts::OS {
        "macos" => "dylib",
        "windows" => "dll",
        _ => "so",
    }
}

/// Whether `path` looks like a dynamic library for the current platform.
pub fn is_library_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == platform_library_extension())
        .unwrap_or(false)
}

/// Open a library file, mapping loader failures to
/// [`PluginError::UnknownError`] with the loader's diagnostic preserved.
pub(crate) fn open_library(path: &Path) -> Result<Library> {
    // SAFETY: opening a library runs its initializers. The caller has
    // already gated the file through the integrity checker.
    unsafe { Library::new(path) }.map_err(|e| PluginError::UnknownError(e.to_string()))
}

/// Resolve the entry point symbol and copy the raw function pointer out of
/// the symbol handle.
///
/// The returned pointer is only valid while `library` stays open; the
/// loader invokes it once, immediately, and never stores it.
pub(crate) fn resolve_entry(library: &Library, symbol: &str) -> Result<CreatePluginFn> {
    // SAFETY: the symbol is declared with the entry point signature; a
    // mismatch is the plugin's contract violation, surfaced at call time.
    let sym: Symbol<'_, CreatePluginFn> = unsafe {
        library
            .get(symbol.as_bytes())
            .map_err(|_| PluginError::LoadingSymbolNotFound(symbol.to_string()))?
    };
    Ok(*sym)
}

/// Close a library handle, logging rather than propagating failures.
///
/// Teardown paths must not fail; a handle the OS refuses to close is
/// reported and leaked.
pub(crate) fn close_library(library: Library) {
    if let Err(e) = library.close() {
        warn!("Failed to close plugin library: {}", e);
    }
}
