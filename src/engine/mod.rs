//! Engine module — secret addressing and discovery.
//!
//! This module provides:
//! - Mount lookup and the `SecretEngine`/`KvVersion` model (`mount`)
//! - Key resolution and path normalization (`address`)
//! - Recursive leaf enumeration of a KV mount (`walker`)
//! - Secret existence checks (`exists`)
//! - Secret read/write (`secret`) and bulk loading (`bulk`)

pub mod address;
pub mod bulk;
pub mod exists;
pub mod mount;
pub mod secret;
pub mod walker;

use tracing::debug;

use crate::backend::{MountContext, SecretBackend};
use crate::errors::{Result, VaultUtilError};

// Re-export the most commonly used items.
pub use address::{normalize_path, resolve, KeyHint, SecretAddress};
pub use bulk::{load_bulk_file, load_secrets, BulkFile, BulkOutcome, SecretFailure};
pub use exists::exists;
pub use mount::{list_mounts, lookup_mount, resolve_mount, KvVersion, Mount, SecretEngine};
pub use secret::{lookup_secret, read_secret, write_secret};
pub use walker::walk;

/// List one directory, treating "path absent" as an empty directory.
///
/// Every other backend failure becomes `VaultUtilError::Listing`.
fn list_directory(
    backend: &dyn SecretBackend,
    path: &str,
    context: MountContext<'_>,
) -> Result<Vec<String>> {
    match backend.list_at(path, context) {
        Ok(children) => Ok(children),
        Err(e) if e.is_path_absent() => {
            debug!(%path, "path absent, treating as empty");
            Ok(Vec::new())
        }
        Err(source) => Err(VaultUtilError::Listing {
            path: path.to_string(),
            source,
        }),
    }
}
