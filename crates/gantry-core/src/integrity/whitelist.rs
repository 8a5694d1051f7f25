//! File-backed whitelist checker.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{IntegrityChecker, PluginView};

/// Default whitelist location, relative to the process working directory.
pub const DEFAULT_WHITELIST_PATH: &str = "plugin_whitelist.json";

/// Environment variable a host consults to switch into recording mode;
/// only the literal value `1` enables it. The checker itself never reads
/// the environment, see [`WhitelistChecker::recording_enabled_by_env`].
pub const RECORDING_ENV_VAR: &str = "GANTRY_WHITELIST_RECORD";

/// Whitelist construction failure.
///
/// These are startup configuration errors: a host is expected to abort
/// rather than run without the whitelist it was configured with.
#[derive(Debug, thiserror::Error)]
pub enum WhitelistError {
    /// The whitelist file could not be read.
    #[error("Whitelist file unreadable: {0}")]
    Io(#[from] io::Error),

    /// The whitelist file exists but is not JSON in the expected shape.
    #[error("Whitelist file malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One approved plugin record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub name: String,
    pub version: String,
    pub author: String,
    /// Hex MD5 digest of the approved library file.
    pub md5: String,
}

/// On-disk shape of the whitelist file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct WhitelistFile {
    plugins: Vec<WhitelistEntry>,
}

/// Checker validating plugins against a persisted whitelist.
///
/// In validating mode, [`can_open_plugin`](IntegrityChecker::can_open_plugin)
/// requires some record with an exactly matching `md5`, and
/// [`accept_plugin`](IntegrityChecker::accept_plugin) some record with an
/// exactly matching name, version and author. In recording mode every load
/// is accepted and its record appended to the file; that is how a
/// whitelist gets bootstrapped on a trusted machine.
#[derive(Debug)]
pub struct WhitelistChecker {
    path: PathBuf,
    entries: Mutex<Vec<WhitelistEntry>>,
    recording: bool,
}

impl WhitelistChecker {
    /// Load a validating checker from `path`.
    ///
    /// A missing or malformed file is a construction error, not a
    /// per-plugin one.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, WhitelistError> {
        let path = path.into();
        let entries = read_entries(&path)?;
        info!(
            path = %path.display(),
            entries = entries.len(),
            "Loaded plugin whitelist"
        );
        Ok(Self {
            path,
            entries: Mutex::new(entries),
            recording: false,
        })
    }

    /// Load a validating checker from [`DEFAULT_WHITELIST_PATH`].
    pub fn load_default() -> Result<Self, WhitelistError> {
        Self::load(DEFAULT_WHITELIST_PATH)
    }

    /// Construct a recording-mode checker writing to `path`.
    ///
    /// A missing file starts an empty whitelist (the bootstrap case); an
    /// existing but malformed file is still a construction error.
    pub fn recording(path: impl Into<PathBuf>) -> Result<Self, WhitelistError> {
        let path = path.into();
        let entries = if path.exists() {
            read_entries(&path)?
        } else {
            Vec::new()
        };
        info!(path = %path.display(), "Plugin whitelist in recording mode");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
            recording: true,
        })
    }

    /// Whether the process environment requests recording mode, meaning
    /// [`RECORDING_ENV_VAR`] is set to the literal value `1`.
    pub fn recording_enabled_by_env() -> bool {
        std::env::var(RECORDING_ENV_VAR).map(|v| v == "1").unwrap_or(false)
    }

    /// Whether this checker records instead of validating.
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Snapshot of the current records.
    pub fn entries(&self) -> Vec<WhitelistEntry> {
        self.entries.lock().clone()
    }

    fn record(&self, entry: WhitelistEntry) {
        let snapshot = {
            let mut entries = self.entries.lock();
            if entries.contains(&entry) {
                return;
            }
            info!(
                name = %entry.name,
                version = %entry.version,
                "Recording plugin in whitelist"
            );
            entries.push(entry);
            entries.clone()
        };
        if let Err(e) = persist(&self.path, &WhitelistFile { plugins: snapshot }) {
            warn!(path = %self.path.display(), "Failed to persist whitelist: {}", e);
        }
    }
}

fn read_entries(path: &Path) -> Result<Vec<WhitelistEntry>, WhitelistError> {
    let raw = fs::read_to_string(path)?;
    let file: WhitelistFile = serde_json::from_str(&raw)?;
    Ok(file.plugins)
}

fn persist(path: &Path, file: &WhitelistFile) -> Result<(), WhitelistError> {
    let raw = serde_json::to_string_pretty(file)?;
    fs::write(path, raw)?;
    Ok(())
}

impl IntegrityChecker for WhitelistChecker {
    fn can_open_plugin(&self, content_hash: &str) -> bool {
        if self.recording {
            return true;
        }
        self.entries.lock().iter().any(|e| e.md5 == content_hash)
    }

    fn accept_plugin(&self, view: PluginView<'_>) -> bool {
        if self.recording {
            self.record(WhitelistEntry {
                name: view.name.to_string(),
                version: view.version.to_string(),
                author: view.author.to_string(),
                md5: view.content_hash.to_string(),
            });
            return true;
        }
        self.entries
            .lock()
            .iter()
            .any(|e| e.name == view.name && e.version == view.version && e.author == view.author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> WhitelistEntry {
        WhitelistEntry {
            name: "ExamplePlugin".to_string(),
            version: "1.0.0".to_string(),
            author: "John Doe".to_string(),
            md5: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
        }
    }

    fn view(entry: &WhitelistEntry) -> PluginView<'_> {
        PluginView {
            name: &entry.name,
            version: &entry.version,
            author: &entry.author,
            content_hash: &entry.md5,
        }
    }

    fn write_whitelist(dir: &tempfile::TempDir, entries: Vec<WhitelistEntry>) -> PathBuf {
        let path = dir.path().join("whitelist.json");
        let raw = serde_json::to_string_pretty(&WhitelistFile { plugins: entries }).unwrap();
        fs::write(&path, raw).unwrap();
        path
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = WhitelistChecker::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, WhitelistError::Io(_)));
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whitelist.json");
        fs::write(&path, "{ not json").unwrap();
        let err = WhitelistChecker::load(&path).unwrap_err();
        assert!(matches!(err, WhitelistError::Malformed(_)));
    }

    #[test]
    fn test_validating_mode_matches_hash_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_whitelist(&dir, vec![entry()]);
        let checker = WhitelistChecker::load(path).unwrap();

        assert!(!checker.is_recording());
        assert!(checker.can_open_plugin("d41d8cd98f00b204e9800998ecf8427e"));
        assert!(!checker.can_open_plugin("00000000000000000000000000000000"));
    }

    #[test]
    fn test_validating_mode_matches_identity_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_whitelist(&dir, vec![entry()]);
        let checker = WhitelistChecker::load(path).unwrap();

        let approved = entry();
        assert!(checker.accept_plugin(view(&approved)));

        let mut bumped = entry();
        bumped.version = "1.0.1".to_string();
        assert!(!checker.accept_plugin(view(&bumped)));
    }

    #[test]
    fn test_recording_mode_accepts_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whitelist.json");

        let checker = WhitelistChecker::recording(&path).unwrap();
        assert!(checker.is_recording());
        assert!(checker.can_open_plugin("anything"));
        assert!(checker.accept_plugin(view(&entry())));

        // a fresh validating checker sees the recorded entry
        let validating = WhitelistChecker::load(&path).unwrap();
        assert_eq!(validating.entries(), vec![entry()]);
        assert!(validating.can_open_plugin(&entry().md5));
    }

    #[test]
    fn test_recording_mode_skips_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whitelist.json");

        let checker = WhitelistChecker::recording(&path).unwrap();
        assert!(checker.accept_plugin(view(&entry())));
        assert!(checker.accept_plugin(view(&entry())));

        assert_eq!(checker.entries().len(), 1);
    }

    #[test]
    fn test_recording_mode_extends_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_whitelist(&dir, vec![entry()]);

        let checker = WhitelistChecker::recording(&path).unwrap();
        let mut other = entry();
        other.name = "OtherPlugin".to_string();
        assert!(checker.accept_plugin(view(&other)));

        assert_eq!(WhitelistChecker::load(&path).unwrap().entries().len(), 2);
    }

    #[test]
    fn test_recording_mode_rejects_malformed_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whitelist.json");
        fs::write(&path, "[]").unwrap();
        let err = WhitelistChecker::recording(&path).unwrap_err();
        assert!(matches!(err, WhitelistError::Malformed(_)));
    }

    #[test]
    fn test_env_switch_requires_literal_one() {
        std::env::remove_var(RECORDING_ENV_VAR);
        assert!(!WhitelistChecker::recording_enabled_by_env());

        std::env::set_var(RECORDING_ENV_VAR, "true");
        assert!(!WhitelistChecker::recording_enabled_by_env());

        std::env::set_var(RECORDING_ENV_VAR, "1");
        assert!(WhitelistChecker::recording_enabled_by_env());

        std::env::remove_var(RECORDING_ENV_VAR);
    }
}
