//! Secret mounts and the engine each one runs.
//!
//! The store only exposes the full mount table, so every lookup fetches the
//! whole map and picks one entry out of it. Nothing is cached: a CLI
//! invocation is short-lived and always sees the current table.

use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::backend::SecretBackend;
use crate::errors::{Result, VaultUtilError};

/// Engine type string of the key/value secrets engine.
pub const KV_ENGINE: &str = "kv";

/// Storage layout of a KV mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KvVersion {
    V1,
    V2,
}

impl KvVersion {
    /// Decode the `options.version` string of a mount record.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "1" => Some(Self::V1),
            "2" => Some(Self::V2),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "1",
            Self::V2 => "2",
        }
    }
}

impl fmt::Display for KvVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The secrets engine behind a mount.
///
/// Only KV mounts carry a version; every other engine type is opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretEngine {
    Kv(KvVersion),
    Other(String),
}

impl SecretEngine {
    pub fn engine_type(&self) -> &str {
        match self {
            Self::Kv(_) => KV_ENGINE,
            Self::Other(engine_type) => engine_type,
        }
    }

    pub fn kv_version(&self) -> Option<KvVersion> {
        match self {
            Self::Kv(version) => Some(*version),
            Self::Other(_) => None,
        }
    }

    /// Build an engine from caller-supplied type and version strings.
    ///
    /// Returns `None` when the type is `kv` but the version is missing or
    /// not one of `"1"`/`"2"`, since such a hint cannot be trusted.
    pub fn from_parts(engine_type: &str, kv_version: Option<&str>) -> Option<Self> {
        if engine_type == KV_ENGINE {
            kv_version.and_then(KvVersion::parse).map(Self::Kv)
        } else {
            Some(Self::Other(engine_type.to_string()))
        }
    }
}

/// A namespace root in the secret store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    name: String,
    engine: SecretEngine,
    description: Option<String>,
}

impl Mount {
    /// Create a mount, normalizing `name` to end with `/`.
    pub fn new(name: &str, engine: SecretEngine, description: Option<String>) -> Self {
        Self {
            name: normalize_mount_name(name),
            engine,
            description,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn engine(&self) -> &SecretEngine {
        &self.engine
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Append the trailing `/` a mount name needs, if missing.
pub fn normalize_mount_name(name: &str) -> String {
    if name.ends_with('/') {
        name.to_string()
    } else {
        format!("{name}/")
    }
}

/// Look up the engine behind `mount_name` (which must end with `/`).
pub fn resolve_mount(backend: &dyn SecretBackend, mount_name: &str) -> Result<SecretEngine> {
    debug!(mount = %mount_name, "fetching mount table to resolve engine");
    let mounts = backend.describe_mounts()?;

    let record = mounts
        .get(mount_name)
        .ok_or_else(|| VaultUtilError::MountNotFound(mount_name.to_string()))?;

    let engine = decode_engine(mount_name, record)?;
    debug!(mount = %mount_name, engine = engine.engine_type(), version = ?engine.kv_version(), "resolved mount");
    Ok(engine)
}

/// Resolve a user-supplied mount name into a full `Mount`.
///
/// The name may omit its trailing `/`.
pub fn lookup_mount(backend: &dyn SecretBackend, name: &str) -> Result<Mount> {
    let name = normalize_mount_name(name);
    let mounts = backend.describe_mounts()?;

    let record = mounts
        .get(&name)
        .ok_or_else(|| VaultUtilError::MountNotFound(name.clone()))?;

    let engine = decode_engine(&name, record)?;
    Ok(Mount::new(&name, engine, decode_description(record)))
}

/// Decode the whole mount table, sorted by mount name.
pub fn list_mounts(backend: &dyn SecretBackend) -> Result<Vec<Mount>> {
    let mounts = backend.describe_mounts()?;

    let mut decoded = mounts
        .iter()
        .map(|(name, record)| {
            let engine = decode_engine(name, record)?;
            Ok(Mount::new(name, engine, decode_description(record)))
        })
        .collect::<Result<Vec<_>>>()?;

    decoded.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(count = decoded.len(), "decoded mount table");
    Ok(decoded)
}

fn decode_engine(mount_name: &str, record: &Value) -> Result<SecretEngine> {
    let malformed = |reason: &str| VaultUtilError::MountDataMalformed {
        mount: mount_name.to_string(),
        reason: reason.to_string(),
    };

    let record = record
        .as_object()
        .ok_or_else(|| malformed("mount record is not an object"))?;

    let engine_type = record
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("mount record has no type"))?;

    if engine_type != KV_ENGINE {
        return Ok(SecretEngine::Other(engine_type.to_string()));
    }

    let version = record
        .get("options")
        .and_then(Value::as_object)
        .ok_or_else(|| malformed("kv mount has no options"))?
        .get("version")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("kv mount has no version option"))?;

    KvVersion::parse(version)
        .map(SecretEngine::Kv)
        .ok_or_else(|| malformed(&format!("unknown kv version '{version}'")))
}

fn decode_description(record: &Value) -> Option<String> {
    record
        .get("description")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}
