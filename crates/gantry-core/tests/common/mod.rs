//! Shared helpers for the integration tests.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

// Build-order dependency: keeps the smoke plugin cdylib built before these
// tests run.
use gantry_smoke_plugin as _;

/// Locate the built smoke-plugin cdylib under the workspace target
/// directory, preferring the freshest artifact.
///
/// Returns `None` when no artifact exists yet; callers skip their test
/// with a notice in that case.
pub fn smoke_plugin_path() -> Option<PathBuf> {
    let stem = format!("{}gantry_smoke_plugin", std::env::consts::DLL_PREFIX);
    let file_name = format!("{stem}.{}", std::env::consts::DLL_EXTENSION);

    let target_dir = match std::env::var_os("CARGO_TARGET_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => Path::new(env!("CARGO_MANIFEST_DIR")).join("../../target"),
    };

    let mut candidates = Vec::new();
    for profile in ["debug", "release"] {
        let dir = target_dir.join(profile);

        let direct = dir.join(&file_name);
        if direct.is_file() {
            candidates.push(direct);
        }

        // dependency builds land in deps/ with a metadata hash suffix
        let Ok(entries) = std::fs::read_dir(dir.join("deps")) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let stem_matches = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s == stem || s.starts_with(&format!("{stem}-")))
                .unwrap_or(false);
            let ext_matches = path.extension().and_then(|e| e.to_str())
                == Some(std::env::consts::DLL_EXTENSION);
            if stem_matches && ext_matches {
                candidates.push(path);
            }
        }
    }

    candidates.into_iter().max_by_key(|path| {
        std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH)
    })
}
