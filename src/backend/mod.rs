//! Backend module — the four primitives vault-util needs from a secret store.
//!
//! This module provides:
//! - The `SecretBackend` trait (write, read, list, describe mounts)
//! - A typed `BackendError` whose `NotFound` variant is the "path absent" signal
//! - `HttpBackend`, talking to a real Vault server (`http`)
//! - `MemoryBackend`, an in-process store for tests and dry runs (`memory`)

pub mod http;
pub mod memory;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::engine::KvVersion;

// Re-export the most commonly used items.
pub use http::HttpBackend;
pub use memory::MemoryBackend;

/// Key/value payload of a single secret.
pub type SecretData = BTreeMap<String, serde_json::Value>;

/// Raw mount map as returned by the store, keyed by mount name (`"secret/"`).
pub type MountMap = serde_json::Map<String, serde_json::Value>;

/// Which KV mount a call is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountContext<'a> {
    /// Mount name, always ending with `/`.
    pub mount: &'a str,
    pub version: KvVersion,
}

/// Errors surfaced by a backend call.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The path does not exist. For listings this means "empty subtree".
    #[error("no such path '{path}'")]
    NotFound { path: String },

    #[error("HTTP {status} for '{path}': {message}")]
    Status {
        status: u16,
        path: String,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    /// The path does not belong to the mount, or lacks the v2 `data/` infix.
    #[error("path '{path}' is not laid out for mount '{mount}'")]
    Misaddressed { path: String, mount: String },
}

impl BackendError {
    /// Whether this error means the path simply does not exist.
    ///
    /// Every other variant is a genuine fault and must never be treated as
    /// an empty listing.
    pub fn is_path_absent(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// The operations vault-util performs against a secret store.
pub trait SecretBackend {
    /// Write `data` at the physical `path` (v2 paths carry the `data/` infix).
    fn write_at(
        &self,
        path: &str,
        data: &SecretData,
        mount: MountContext<'_>,
    ) -> Result<(), BackendError>;

    /// Read the secret stored at the physical `path`.
    fn read_at(&self, path: &str, mount: MountContext<'_>) -> Result<SecretData, BackendError>;

    /// List the children of the physical directory `path`.
    ///
    /// Like every other path, a v2 directory carries the `data/` infix
    /// (`"secret/data/app/"`); see `kv_physical_path`.
    fn list_at(&self, path: &str, mount: MountContext<'_>) -> Result<Vec<String>, BackendError>;

    /// Fetch the full mount table in one call.
    fn describe_mounts(&self) -> Result<MountMap, BackendError>;
}

/// Path segment v2 mounts insert between the mount and the secret path.
pub const V2_DATA_INFIX: &str = "data/";

/// Physical path of `relative` (a path inside the mount) for `mount`.
///
/// `"app/"` under a v2 `"secret/"` mount becomes `"secret/data/app/"`.
pub fn kv_physical_path(mount: MountContext<'_>, relative: &str) -> String {
    match mount.version {
        KvVersion::V2 => format!("{}{V2_DATA_INFIX}{relative}", mount.mount),
        KvVersion::V1 => format!("{}{relative}", mount.mount),
    }
}

/// Inverse of `kv_physical_path`: strip the mount name and, for v2, the
/// `data/` infix, which must be present.
///
/// `"secret/data/app/db"` under a v2 `"secret/"` mount becomes `"app/db"`.
pub fn kv_relative_path<'p>(
    path: &'p str,
    mount: MountContext<'_>,
) -> Result<&'p str, BackendError> {
    let relative = path.strip_prefix(mount.mount);
    let relative = match mount.version {
        KvVersion::V2 => relative.and_then(|r| r.strip_prefix(V2_DATA_INFIX)),
        KvVersion::V1 => relative,
    };
    relative.ok_or_else(|| BackendError::Misaddressed {
        path: path.to_string(),
        mount: mount.mount.to_string(),
    })
}
