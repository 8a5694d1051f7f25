//! Integrity verification gating plugin loads.
//!
//! Two gates run per load: [`IntegrityChecker::can_open_plugin`] against
//! the binary's content hash, before any plugin code runs, and
//! [`IntegrityChecker::accept_plugin`] against the declared identity once
//! the instance exists. Two policies are provided: [`AllowListChecker`]
//! for tests and tooling, and the file-backed [`WhitelistChecker`] for
//! production hosts.

mod allow_list;
mod whitelist;

pub use allow_list::AllowListChecker;
pub use whitelist::{
    WhitelistChecker, WhitelistEntry, WhitelistError, DEFAULT_WHITELIST_PATH, RECORDING_ENV_VAR,
};

use md5::{Digest, Md5};

/// Identity of a just-constructed plugin, borrowed from the load in
/// progress.
#[derive(Debug, Clone, Copy)]
pub struct PluginView<'a> {
    pub name: &'a str,
    pub version: &'a str,
    pub author: &'a str,
    /// Hex MD5 digest of the library file's contents.
    pub content_hash: &'a str,
}

/// Policy object consulted before and after loading a plugin.
pub trait IntegrityChecker: Send + Sync {
    /// Gate on the binary's content hash. Returning `false` prevents the
    /// library from being opened, so none of its code ever runs.
    fn can_open_plugin(&self, content_hash: &str) -> bool;

    /// Gate on the loaded plugin's declared identity. Returning `false`
    /// forces immediate teardown of the just-constructed plugin.
    fn accept_plugin(&self, view: PluginView<'_>) -> bool;
}

/// Hex MD5 digest of `data`.
pub fn compute_md5(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
