//! Existence check — is a resolved secret present in its parent listing?

use tracing::debug;

use crate::backend::SecretBackend;
use crate::errors::Result;

use super::address::SecretAddress;
use super::list_directory;

/// Check whether the secret at `address` exists.
///
/// A missing parent directory means the secret cannot exist and is not an
/// error. Directory entries (trailing `/`) never match.
pub fn exists(backend: &dyn SecretBackend, address: &SecretAddress) -> Result<bool> {
    let Some(context) = address.mount_context() else {
        debug!(key = %address.raw_key(), "not a kv secret, cannot list its parent");
        return Ok(false);
    };

    let (parent_dir, leaf_name) = split_leaf(address.normalized_path());
    debug!(dir = %parent_dir, name = %leaf_name, "checking secret presence");

    let listing = list_directory(backend, &parent_dir, context)?;
    Ok(listing.iter().any(|entry| entry == leaf_name))
}

/// Split a path into its parent directory (with trailing `/`) and last segment.
fn split_leaf(path: &str) -> (String, &str) {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, leaf)) => (format!("{parent}/"), leaf),
        None => (String::new(), trimmed),
    }
}
