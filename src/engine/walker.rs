//! Tree walker — enumerate every leaf secret under a KV mount.
//!
//! Listings mark directories with a trailing `/`. A directory can show up in
//! its parent's listing and still answer "path absent" when listed (its last
//! secret was deleted in between, or only a marker is left behind). Such a
//! branch contributes nothing. Any other listing failure aborts the walk.

use tracing::debug;

use crate::backend::{kv_physical_path, MountContext, SecretBackend};
use crate::errors::Result;

use super::list_directory;
use super::mount::{Mount, SecretEngine};

/// Enumerate the leaf secrets of `mount`, as paths relative to the mount.
///
/// Non-KV mounts have no generic listing and yield nothing. The order of
/// the returned paths is unspecified.
pub fn walk(backend: &dyn SecretBackend, mount: &Mount) -> Result<Vec<String>> {
    let SecretEngine::Kv(version) = mount.engine() else {
        debug!(mount = %mount.name(), engine = mount.engine().engine_type(), "not a kv mount, nothing to walk");
        return Ok(Vec::new());
    };
    let context = MountContext {
        mount: mount.name(),
        version: *version,
    };

    // Directories still to list, relative to the mount.
    let mut pending = vec![String::new()];
    let mut leaves = Vec::new();

    while let Some(dir) = pending.pop() {
        let path = kv_physical_path(context, &dir);
        for child in list_directory(backend, &path, context)? {
            if child.is_empty() {
                continue;
            }
            let child_path = format!("{dir}{child}");
            if child.ends_with('/') {
                pending.push(child_path);
            } else {
                leaves.push(child_path);
            }
        }
    }

    debug!(mount = %mount.name(), count = leaves.len(), "walk complete");
    Ok(leaves)
}
