//! Reading and writing a resolved secret.

use tracing::debug;

use crate::backend::{MountContext, SecretBackend, SecretData};
use crate::errors::{Result, VaultUtilError};

use super::address::SecretAddress;
use super::exists::exists;

/// Write `data` to the secret at `address`, replacing what was there.
pub fn write_secret(
    backend: &dyn SecretBackend,
    address: &SecretAddress,
    data: &SecretData,
) -> Result<()> {
    let context = kv_context(address)?;
    debug!(path = %address.normalized_path(), keys = data.len(), "writing secret");
    backend.write_at(address.normalized_path(), data, context)?;
    Ok(())
}

/// Read the secret at `address`.
pub fn read_secret(backend: &dyn SecretBackend, address: &SecretAddress) -> Result<SecretData> {
    let context = kv_context(address)?;
    debug!(path = %address.normalized_path(), "reading secret");
    Ok(backend.read_at(address.normalized_path(), context)?)
}

/// Read the secret at `address` if it exists.
///
/// A v2 secret whose latest version is deleted is still listed, but reading
/// it answers 404. Both that and a missing listing entry give `None`.
pub fn lookup_secret(
    backend: &dyn SecretBackend,
    address: &SecretAddress,
) -> Result<Option<SecretData>> {
    if !exists(backend, address)? {
        return Ok(None);
    }

    match read_secret(backend, address) {
        Ok(data) => Ok(Some(data)),
        Err(VaultUtilError::Backend(e)) if e.is_path_absent() => {
            debug!(path = %address.normalized_path(), "listed but unreadable, treating as absent");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn kv_context(address: &SecretAddress) -> Result<MountContext<'_>> {
    address
        .mount_context()
        .ok_or_else(|| VaultUtilError::UnsupportedEngine(address.engine().engine_type().to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::backend::MemoryBackend;
    use crate::engine::address::{resolve, KeyHint};
    use crate::engine::mount::{KvVersion, SecretEngine};

    fn payload() -> SecretData {
        let mut data = SecretData::new();
        data.insert("username".into(), json!("admin"));
        data.insert("port".into(), json!(5432));
        data
    }

    #[test]
    fn write_then_read_returns_same_data() {
        for version in [KvVersion::V1, KvVersion::V2] {
            let backend = MemoryBackend::new().with_kv_mount("secret/", version);
            let address = resolve(&backend, "secret/app/db", KeyHint::Unknown).unwrap();

            write_secret(&backend, &address, &payload()).unwrap();
            assert_eq!(read_secret(&backend, &address).unwrap(), payload());
        }
    }

    #[test]
    fn v2_write_lands_under_logical_path() {
        let backend = MemoryBackend::new().with_kv_mount("secret/", KvVersion::V2);
        let address = resolve(&backend, "secret/app/db", KeyHint::Unknown).unwrap();
        write_secret(&backend, &address, &payload()).unwrap();
        assert_eq!(backend.secret("secret/app/db"), Some(payload()));
    }

    #[test]
    fn reading_missing_secret_fails() {
        let backend = MemoryBackend::new().with_kv_mount("secret/", KvVersion::V2);
        let address = resolve(&backend, "secret/missing", KeyHint::Unknown).unwrap();
        assert!(matches!(
            read_secret(&backend, &address),
            Err(VaultUtilError::Backend(_))
        ));
    }

    #[test]
    fn lookup_returns_present_secret() {
        let backend = MemoryBackend::new()
            .with_kv_mount("secret/", KvVersion::V2)
            .with_secret("secret/app/db", payload());
        let address = resolve(&backend, "secret/app/db", KeyHint::Unknown).unwrap();
        assert_eq!(lookup_secret(&backend, &address).unwrap(), Some(payload()));
    }

    #[test]
    fn lookup_of_missing_secret_is_none() {
        let backend = MemoryBackend::new().with_kv_mount("secret/", KvVersion::V2);
        let address = resolve(&backend, "secret/missing", KeyHint::Unknown).unwrap();
        assert_eq!(lookup_secret(&backend, &address).unwrap(), None);
    }

    #[test]
    fn lookup_of_deleted_secret_is_none() {
        let backend = MemoryBackend::new()
            .with_kv_mount("secret/", KvVersion::V2)
            .with_deleted_secret("secret/app/old");
        let address = resolve(&backend, "secret/app/old", KeyHint::Unknown).unwrap();

        assert!(exists(&backend, &address).unwrap());
        assert!(read_secret(&backend, &address).is_err());
        assert_eq!(lookup_secret(&backend, &address).unwrap(), None);
    }

    #[test]
    fn non_kv_engine_is_unsupported() {
        let backend = MemoryBackend::new();
        let address = resolve(
            &backend,
            "transit/keys/app",
            KeyHint::Known(SecretEngine::Other("transit".into())),
        )
        .unwrap();

        let err = write_secret(&backend, &address, &payload()).unwrap_err();
        assert!(matches!(err, VaultUtilError::UnsupportedEngine(ref e) if e == "transit"));
        assert!(read_secret(&backend, &address).is_err());
    }
}
