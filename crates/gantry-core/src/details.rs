//! Plugin identity metadata.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identity of a loaded plugin, read once from the instance right after
/// construction.
///
/// Immutable afterwards. `path` is the library file the plugin was loaded
/// from and doubles as the registry uniqueness key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDetails {
    /// Declared plugin name.
    pub name: String,
    /// Declared version string.
    pub version: String,
    /// Declared author.
    pub author: String,
    /// Library file the plugin was loaded from.
    pub path: PathBuf,
}

impl PluginDetails {
    /// Create plugin details.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        author: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            author: author.into(),
            path: path.into(),
        }
    }

    /// Library file name without its extension, for display purposes.
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl fmt::Display for PluginDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{} by {}", self.name, self.version, self.author)
    }
}
