//! Top-level plugin registry and load/unload/reload orchestration.

use std::fs;
use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::{debug, info, warn};

use crate::bridge::{EventData, EventRegistrar};
use crate::builder::PluginBuilder;
use crate::details::PluginDetails;
use crate::error::{PluginError, Result};
use crate::integrity::{compute_md5, AllowListChecker, IntegrityChecker, PluginView};
use crate::library::{
    close_library, is_library_file, open_library, platform_library_extension, resolve_entry,
};

/// Default entry point symbol resolved in plugin libraries.
pub const DEFAULT_ENTRY_SYMBOL: &str = "createPlugin";

/// A registry entry: the builder, its identity, and the owned library
/// handle.
///
/// Field order is load-bearing: the builder, and transitively the plugin
/// instance whose vtable lives inside the library, must drop before the
/// library handle.
pub struct LoadedPlugin {
    builder: Box<dyn PluginBuilder>,
    details: PluginDetails,
    library: Option<Library>,
}

impl LoadedPlugin {
    /// Identity of the loaded plugin.
    pub fn details(&self) -> &PluginDetails {
        &self.details
    }

    /// Registration facade for host callbacks on this plugin's bridge,
    /// for callbacks added after the load completed.
    pub fn registrar(&self) -> EventRegistrar<'_> {
        self.builder.core().registrar()
    }

    /// Destroys the instance, drops the builder, then closes the library.
    ///
    /// The builder box must be gone before the handle closes: its vtable
    /// and drop glue live inside the plugin image, so dropping it after
    /// `close_library` would run unmapped code.
    fn teardown(mut self) {
        self.builder.core_mut().destroy();
        let LoadedPlugin { builder, library, .. } = self;
        drop(builder);
        if let Some(library) = library {
            close_library(library);
        }
    }
}

impl std::fmt::Debug for LoadedPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedPlugin")
            .field("details", &self.details)
            .field("library_open", &self.library.is_some())
            .finish()
    }
}

/// Registry of loaded plugins and the host-facing entry point for load,
/// unload and reload sequencing.
///
/// The registry is a plain sequence with no internal locking; callers
/// serialize access to one manager themselves. Event delivery is
/// cooperative and sequential, one plugin at a time.
pub struct PluginManager {
    plugins: Vec<LoadedPlugin>,
    integrity: Box<dyn IntegrityChecker>,
    entry_symbol: String,
}

impl PluginManager {
    /// Manager with the permissive default policy and the default entry
    /// symbol.
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            integrity: Box::new(AllowListChecker::new()),
            entry_symbol: DEFAULT_ENTRY_SYMBOL.to_string(),
        }
    }

    /// Replace the integrity policy consulted on every load.
    pub fn with_integrity_checker(mut self, checker: impl IntegrityChecker + 'static) -> Self {
        self.integrity = Box::new(checker);
        self
    }

    /// Override the entry point symbol resolved in plugin libraries.
    pub fn with_entry_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.entry_symbol = symbol.into();
        self
    }

    /// Number of loaded plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether no plugins are loaded.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Load the plugin at `path` without registering host callbacks.
    ///
    /// See [`load_with`](Self::load_with).
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<PluginDetails> {
        self.load_with(path, |_| {})
    }

    /// Load the plugin at `path`, handing a transient [`EventRegistrar`]
    /// to `on_loaded` so host callbacks are registered before any event
    /// round-trip can occur.
    ///
    /// A path without an extension gets the platform library extension
    /// appended first. The sequence and its failure modes:
    ///
    /// 1. duplicate registered path: [`PluginError::AlreadyLoaded`]
    /// 2. unreadable file: [`PluginError::InvalidPath`]
    /// 3. content hash rejected: [`PluginError::SecurityError`], before
    ///    any plugin code runs
    /// 4. library cannot be opened: [`PluginError::UnknownError`]
    /// 5. entry symbol missing: [`PluginError::LoadingSymbolNotFound`]
    /// 6. identity rejected after construction:
    ///    [`PluginError::SecurityError`], with the instance destroyed and
    ///    the library closed first
    pub fn load_with<F>(&mut self, path: impl AsRef<Path>, on_loaded: F) -> Result<PluginDetails>
    where
        F: FnOnce(&EventRegistrar<'_>),
    {
        let path = resolve_load_path(path.as_ref());

        if self.plugins.iter().any(|p| p.details.path == path) {
            return Err(PluginError::AlreadyLoaded(path));
        }
        if !path.is_file() {
            return Err(PluginError::InvalidPath(path));
        }
        let Ok(contents) = fs::read(&path) else {
            return Err(PluginError::InvalidPath(path));
        };
        let content_hash = compute_md5(&contents);

        if !self.integrity.can_open_plugin(&content_hash) {
            warn!(path = %path.display(), hash = %content_hash, "Plugin rejected before opening");
            return Err(PluginError::SecurityError(format!(
                "content hash {content_hash} is not allowed to load"
            )));
        }

        let library = open_library(&path)?;
        let create = resolve_entry(&library, &self.entry_symbol)?;

        // SAFETY: entry point contract. `create` takes no arguments and
        // returns a heap pointer to a `Box<dyn PluginBuilder>` whose sole
        // ownership transfers to us, or null on failure.
        let raw = unsafe { create() };
        if raw.is_null() {
            close_library(library);
            return Err(PluginError::UnknownError(
                "entry point returned a null builder".to_string(),
            ));
        }
        // SAFETY: non-null per the check above; ownership transferred per
        // the entry point contract.
        let mut builder: Box<dyn PluginBuilder> =
            unsafe { *Box::from_raw(raw.cast::<Box<dyn PluginBuilder>>()) };

        builder.build();
        on_loaded(&builder.core().registrar());

        let details = builder.core().instance().map(|instance| {
            PluginDetails::new(
                instance.name(),
                instance.version(),
                instance.author(),
                path.clone(),
            )
        });
        let Some(details) = details else {
            builder.core_mut().destroy();
            drop(builder);
            close_library(library);
            return Err(PluginError::UnknownError(
                "builder did not store a plugin instance".to_string(),
            ));
        };

        let accepted = self.integrity.accept_plugin(PluginView {
            name: &details.name,
            version: &details.version,
            author: &details.author,
            content_hash: &content_hash,
        });
        if !accepted {
            warn!(plugin = %details, "Plugin rejected after construction, unwinding");
            builder.core_mut().destroy();
            drop(builder);
            close_library(library);
            return Err(PluginError::SecurityError(format!(
                "plugin {} was rejected by the integrity checker",
                details.name
            )));
        }

        info!(plugin = %details, path = %details.path.display(), "Loaded plugin");
        self.plugins.push(LoadedPlugin {
            builder,
            details: details.clone(),
            library: Some(library),
        });
        Ok(details)
    }

    /// Load every dynamic library in `dir`, sequentially, without
    /// registering host callbacks.
    pub fn load_from_directory(&mut self, dir: impl AsRef<Path>) -> Result<Vec<PluginDetails>> {
        self.load_from_directory_with(dir, |_| {})
    }

    /// Load every dynamic library in `dir`, handing each load's registrar
    /// to `on_loaded`.
    ///
    /// Files are visited in sorted order for reproducibility; anything
    /// without the platform library extension is skipped. Fail-fast: the
    /// first failing file aborts the remainder and its error is returned,
    /// while plugins loaded before the failure stay loaded.
    pub fn load_from_directory_with<F>(
        &mut self,
        dir: impl AsRef<Path>,
        mut on_loaded: F,
    ) -> Result<Vec<PluginDetails>>
    where
        F: FnMut(&EventRegistrar<'_>),
    {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|_| PluginError::InvalidPath(dir.to_path_buf()))?;

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_library_file(path))
            .collect();
        paths.sort();

        info!(dir = %dir.display(), candidates = paths.len(), "Loading plugins from directory");
        let mut loaded = Vec::with_capacity(paths.len());
        for path in paths {
            loaded.push(self.load_with(&path, &mut on_loaded)?);
        }
        Ok(loaded)
    }

    /// First loaded plugin whose details satisfy `predicate`.
    pub fn find<F>(&self, predicate: F) -> Option<&LoadedPlugin>
    where
        F: Fn(&PluginDetails) -> bool,
    {
        self.plugins.iter().find(|p| predicate(&p.details))
    }

    /// Every loaded plugin whose details satisfy `predicate`, in registry
    /// order.
    pub fn find_all<F>(&self, predicate: F) -> Vec<&LoadedPlugin>
    where
        F: Fn(&PluginDetails) -> bool,
    {
        self.plugins.iter().filter(|p| predicate(&p.details)).collect()
    }

    /// Unload the first plugin matching `predicate`: destroy its builder,
    /// close its library handle and remove it from the registry.
    ///
    /// Returns whether anything was unloaded; no match is not an error.
    pub fn unload<F>(&mut self, predicate: F) -> bool
    where
        F: Fn(&PluginDetails) -> bool,
    {
        let Some(index) = self.plugins.iter().position(|p| predicate(&p.details)) else {
            return false;
        };
        let entry = self.plugins.remove(index);
        info!(plugin = %entry.details, "Unloading plugin");
        entry.teardown();
        true
    }

    /// Unload every plugin: destroy each builder and close each library
    /// handle, leaving the registry empty.
    pub fn unload_all(&mut self) {
        for entry in self.plugins.drain(..) {
            info!(plugin = %entry.details, "Unloading plugin");
            entry.teardown();
        }
    }

    /// Reload the first plugin matching `predicate` from its original
    /// path: a full unload followed by a fresh load.
    ///
    /// Returns whether a match existed; a load failure after the unload
    /// propagates as the usual load error. Host callbacks registered on
    /// the old builder are not carried over.
    pub fn reload<F>(&mut self, predicate: F) -> Result<bool>
    where
        F: Fn(&PluginDetails) -> bool,
    {
        let Some(index) = self.plugins.iter().position(|p| predicate(&p.details)) else {
            return Ok(false);
        };
        let path = self.plugins[index].details.path.clone();
        info!(path = %path.display(), "Reloading plugin");
        self.plugins.remove(index).teardown();
        self.load(&path)?;
        Ok(true)
    }

    /// Deliver `event` with `data` to every plugin matching `predicate`,
    /// sequentially, in registry order.
    ///
    /// Each receiving plugin's handler runs to completion before the next
    /// plugin is notified; there is no fan-out and no timeout.
    pub async fn send<F>(&mut self, event: &str, data: &EventData, predicate: F)
    where
        F: Fn(&PluginDetails) -> bool,
    {
        for entry in self.plugins.iter_mut() {
            if predicate(&entry.details) {
                debug!(plugin = %entry.details.name, event, "Delivering event");
                entry.builder.core_mut().receive(event, data).await;
            }
        }
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_load_path(path: &Path) -> PathBuf {
    if path.extension().is_none() {
        path.with_extension(platform_library_extension())
    } else {
        path.to_path_buf()
    }
}
