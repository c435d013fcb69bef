//! `MemoryBackend` — an in-process secret store.
//!
//! Secrets are kept under their logical path (`"secret/app/db"`, without
//! the v2 `data/` infix) so the same store can be addressed through either
//! KV layout. Listings follow Vault's behaviour: a directory with no
//! children does not exist.
//!
//! Paths handed to the trait methods are physical: v2 paths must carry
//! the `data/` infix, as they would on a real server.
//!
//! Kinds of trouble that can be staged for tests:
//! - dangling directories, which show up in their parent's listing but
//!   answer "path absent" when listed themselves
//! - listing faults, which answer with an HTTP status error
//! - deleted secrets, which are still listed but have no readable data

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Value};

use super::{kv_relative_path, BackendError, MountContext, MountMap, SecretBackend, SecretData};
use crate::engine::KvVersion;

#[derive(Debug, Default)]
pub struct MemoryBackend {
    mounts: MountMap,
    secrets: RefCell<BTreeMap<String, SecretData>>,
    dangling_dirs: BTreeSet<String>,
    listing_faults: BTreeMap<String, u16>,
    deleted: BTreeSet<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a KV mount of the given version.
    pub fn with_kv_mount(self, name: &str, version: KvVersion) -> Self {
        let record = json!({
            "type": "kv",
            "description": format!("key/value secret storage ({name})"),
            "options": { "version": version.as_str() },
        });
        self.with_mount_record(name, record)
    }

    /// Register a mount of an arbitrary engine type.
    pub fn with_engine_mount(self, name: &str, engine_type: &str) -> Self {
        let record = json!({ "type": engine_type, "description": "", "options": null });
        self.with_mount_record(name, record)
    }

    /// Register a mount with a raw record, well-formed or not.
    pub fn with_mount_record(mut self, name: &str, record: Value) -> Self {
        self.mounts.insert(name.to_string(), record);
        self
    }

    /// Store a secret under its logical path.
    pub fn with_secret(self, path: &str, data: SecretData) -> Self {
        self.secrets.borrow_mut().insert(path.to_string(), data);
        self
    }

    /// Make `dir` appear in its parent's listing while listing as absent.
    pub fn add_dangling_dir(mut self, dir: &str) -> Self {
        self.dangling_dirs.insert(ensure_dir(dir));
        self
    }

    /// Make listing `dir` fail with the given HTTP status.
    pub fn fail_listing(mut self, dir: &str, status: u16) -> Self {
        self.listing_faults.insert(ensure_dir(dir), status);
        self
    }

    /// Keep `path` in listings but answer "path absent" when it is read,
    /// like a v2 secret whose latest version was deleted.
    pub fn with_deleted_secret(mut self, path: &str) -> Self {
        self.deleted.insert(path.to_string());
        self
    }

    /// Look up a secret by logical path.
    pub fn secret(&self, path: &str) -> Option<SecretData> {
        self.secrets.borrow().get(path).cloned()
    }

    fn logical_path(path: &str, mount: MountContext<'_>) -> Result<String, BackendError> {
        Ok(format!("{}{}", mount.mount, kv_relative_path(path, mount)?))
    }

    fn require_mount(&self, path: &str, mount: MountContext<'_>) -> Result<(), BackendError> {
        if self.mounts.contains_key(mount.mount) {
            Ok(())
        } else {
            Err(BackendError::NotFound {
                path: path.to_string(),
            })
        }
    }
}

impl SecretBackend for MemoryBackend {
    fn write_at(
        &self,
        path: &str,
        data: &SecretData,
        mount: MountContext<'_>,
    ) -> Result<(), BackendError> {
        self.require_mount(path, mount)?;
        self.secrets
            .borrow_mut()
            .insert(Self::logical_path(path, mount)?, data.clone());
        Ok(())
    }

    fn read_at(&self, path: &str, mount: MountContext<'_>) -> Result<SecretData, BackendError> {
        self.require_mount(path, mount)?;
        let logical = Self::logical_path(path, mount)?;
        if self.deleted.contains(&logical) {
            return Err(BackendError::NotFound {
                path: path.to_string(),
            });
        }
        self.secret(&logical)
            .ok_or_else(|| BackendError::NotFound {
                path: path.to_string(),
            })
    }

    fn list_at(&self, path: &str, mount: MountContext<'_>) -> Result<Vec<String>, BackendError> {
        let dir = ensure_dir(&Self::logical_path(path, mount)?);

        if let Some(&status) = self.listing_faults.get(&dir) {
            return Err(BackendError::Status {
                status,
                path: path.to_string(),
                message: "injected listing fault".into(),
            });
        }
        if self.dangling_dirs.contains(&dir) {
            return Err(BackendError::NotFound {
                path: path.to_string(),
            });
        }

        let mut children = BTreeSet::new();
        let secrets = self.secrets.borrow();
        for key in secrets.keys().chain(self.deleted.iter()) {
            if let Some(rest) = key.strip_prefix(dir.as_str()) {
                match rest.split_once('/') {
                    Some((head, _)) => children.insert(format!("{head}/")),
                    None => children.insert(rest.to_string()),
                };
            }
        }
        for staged in self.dangling_dirs.iter().chain(self.listing_faults.keys()) {
            if let Some(name) = child_dir_name(&dir, staged) {
                children.insert(name);
            }
        }

        if children.is_empty() {
            return Err(BackendError::NotFound {
                path: path.to_string(),
            });
        }
        Ok(children.into_iter().collect())
    }

    fn describe_mounts(&self) -> Result<MountMap, BackendError> {
        Ok(self.mounts.clone())
    }
}

fn ensure_dir(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// The listing entry `staged` contributes to `dir`, if `dir` is its parent.
fn child_dir_name(dir: &str, staged: &str) -> Option<String> {
    let (parent, name) = staged.trim_end_matches('/').rsplit_once('/')?;
    (format!("{parent}/") == dir).then(|| format!("{name}/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(value: &str) -> SecretData {
        let mut map = SecretData::new();
        map.insert("value".into(), json!(value));
        map
    }

    const V2: MountContext<'static> = MountContext {
        mount: "secret/",
        version: KvVersion::V2,
    };

    #[test]
    fn listing_groups_children_into_directories() {
        let backend = MemoryBackend::new()
            .with_kv_mount("secret/", KvVersion::V2)
            .with_secret("secret/a", data("1"))
            .with_secret("secret/dir/b", data("2"))
            .with_secret("secret/dir/sub/c", data("3"));

        assert_eq!(backend.list_at("secret/data/", V2).unwrap(), vec!["a", "dir/"]);
        assert_eq!(
            backend.list_at("secret/data/dir/", V2).unwrap(),
            vec!["b", "sub/"]
        );
    }

    #[test]
    fn v2_listing_requires_the_infix() {
        let backend = MemoryBackend::new()
            .with_kv_mount("secret/", KvVersion::V2)
            .with_secret("secret/dir/b", data("2"));

        let err = backend.list_at("secret/dir/", V2).unwrap_err();
        assert!(matches!(err, BackendError::Misaddressed { .. }));
    }

    #[test]
    fn directory_named_data_is_an_ordinary_directory() {
        let backend = MemoryBackend::new()
            .with_kv_mount("secret/", KvVersion::V2)
            .with_secret("secret/a", data("1"))
            .with_secret("secret/data/x", data("2"));

        assert_eq!(
            backend.list_at("secret/data/", V2).unwrap(),
            vec!["a", "data/"]
        );
        assert_eq!(backend.list_at("secret/data/data/", V2).unwrap(), vec!["x"]);
        assert_eq!(
            backend.read_at("secret/data/data/x", V2).unwrap(),
            data("2")
        );
    }

    #[test]
    fn deleted_secret_is_listed_but_unreadable() {
        let backend = MemoryBackend::new()
            .with_kv_mount("secret/", KvVersion::V2)
            .with_deleted_secret("secret/app/old");

        assert_eq!(backend.list_at("secret/data/app/", V2).unwrap(), vec!["old"]);
        assert!(backend
            .read_at("secret/data/app/old", V2)
            .unwrap_err()
            .is_path_absent());
    }

    #[test]
    fn empty_directory_is_absent() {
        let backend = MemoryBackend::new().with_kv_mount("secret/", KvVersion::V2);
        let err = backend.list_at("secret/data/nothing/", V2).unwrap_err();
        assert!(err.is_path_absent());
    }

    #[test]
    fn dangling_dir_is_listed_but_absent() {
        let backend = MemoryBackend::new()
            .with_kv_mount("secret/", KvVersion::V2)
            .add_dangling_dir("secret/gone");

        assert_eq!(backend.list_at("secret/data/", V2).unwrap(), vec!["gone/"]);
        assert!(backend
            .list_at("secret/data/gone/", V2)
            .unwrap_err()
            .is_path_absent());
    }

    #[test]
    fn listing_fault_is_a_status_error() {
        let backend = MemoryBackend::new()
            .with_kv_mount("secret/", KvVersion::V2)
            .fail_listing("secret/locked/", 403);

        assert_eq!(backend.list_at("secret/data/", V2).unwrap(), vec!["locked/"]);
        match backend.list_at("secret/data/locked/", V2).unwrap_err() {
            BackendError::Status { status, .. } => assert_eq!(status, 403),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn write_requires_existing_mount() {
        let backend = MemoryBackend::new();
        let err = backend
            .write_at("missing/data/x", &data("1"), V2)
            .unwrap_err();
        assert!(err.is_path_absent());
    }
}
