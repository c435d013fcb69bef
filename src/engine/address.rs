//! Key resolution — turning `"<mount>/<path>"` into a physical path.
//!
//! KV v2 mounts keep secret payloads under a `data/` infix
//! (`secret/app/db` is stored at `secret/data/app/db`). KV v1 and every
//! other engine use the logical path unchanged.

use tracing::debug;

use crate::backend::{MountContext, SecretBackend};
use crate::errors::{Result, VaultUtilError};

use super::mount::{resolve_mount, KvVersion, SecretEngine};

/// What the caller already knows about a key's mount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeyHint {
    /// Ask the store for the mount's engine.
    #[default]
    Unknown,
    /// Trust this engine verbatim and skip the mount lookup.
    Known(SecretEngine),
}

/// The resolved identity of one secret.
///
/// Only `resolve` builds these, so `normalized_path` always matches the
/// key and engine it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretAddress {
    raw_key: String,
    mount_name: String,
    engine: SecretEngine,
    normalized_path: String,
}

impl SecretAddress {
    pub fn raw_key(&self) -> &str {
        &self.raw_key
    }

    pub fn mount_name(&self) -> &str {
        &self.mount_name
    }

    pub fn engine(&self) -> &SecretEngine {
        &self.engine
    }

    pub fn normalized_path(&self) -> &str {
        &self.normalized_path
    }

    /// Backend addressing for this secret, or `None` for non-KV engines.
    pub fn mount_context(&self) -> Option<MountContext<'_>> {
        self.engine.kv_version().map(|version| MountContext {
            mount: &self.mount_name,
            version,
        })
    }
}

/// Resolve `raw_key` into a `SecretAddress`.
///
/// With `KeyHint::Unknown` the mount table is fetched to learn the engine;
/// with `KeyHint::Known` no backend call is made at all.
pub fn resolve(backend: &dyn SecretBackend, raw_key: &str, hint: KeyHint) -> Result<SecretAddress> {
    let (mount_segment, _) = split_key(raw_key)?;
    let mount_name = format!("{mount_segment}/");

    let engine = match hint {
        KeyHint::Known(engine) => {
            debug!(key = %raw_key, engine = engine.engine_type(), "engine supplied by caller");
            engine
        }
        KeyHint::Unknown => resolve_mount(backend, &mount_name)?,
    };

    let normalized_path = normalize_path(raw_key, &engine)?;
    debug!(key = %raw_key, path = %normalized_path, "normalized secret path");

    Ok(SecretAddress {
        raw_key: raw_key.to_string(),
        mount_name,
        engine,
        normalized_path,
    })
}

/// Compute the physical path of `raw_key` under `engine`.
///
/// Normalizing an already-normalized v2 path is a no-op.
pub fn normalize_path(raw_key: &str, engine: &SecretEngine) -> Result<String> {
    let (mount_segment, relative) = split_key(raw_key)?;

    match engine {
        SecretEngine::Kv(KvVersion::V2) => {
            let (first, rest) = relative.split_once('/').unwrap_or((relative, ""));
            if first == "data" {
                // Already normalized, but the infix alone names no secret.
                if rest.is_empty() {
                    return Err(VaultUtilError::MalformedKey(raw_key.to_string()));
                }
                Ok(raw_key.to_string())
            } else {
                Ok(format!("{mount_segment}/data/{relative}"))
            }
        }
        SecretEngine::Kv(KvVersion::V1) | SecretEngine::Other(_) => Ok(raw_key.to_string()),
    }
}

/// Split a key on its first `/` into mount segment and relative path.
fn split_key(raw_key: &str) -> Result<(&str, &str)> {
    match raw_key.split_once('/') {
        Some((mount, relative)) if !mount.is_empty() && !relative.is_empty() => {
            Ok((mount, relative))
        }
        _ => Err(VaultUtilError::MalformedKey(raw_key.to_string())),
    }
}
