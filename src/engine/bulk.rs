//! Bulk loading — write many secrets described in one JSON file.
//!
//! File layout:
//!
//! ```json
//! {
//!   "secrets": {
//!     "database": {
//!       "key": "secret/app/database",
//!       "data": { "username": "app", "password": "s3cret" }
//!     }
//!   }
//! }
//! ```
//!
//! An entry may also carry `secretType` and `kvVersion` to skip the mount
//! lookup. Each secret is resolved and written on its own; one failure does
//! not stop the others.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::{SecretBackend, SecretData};
use crate::errors::{Result, VaultUtilError};

use super::address::{resolve, KeyHint};
use super::mount::SecretEngine;
use super::secret::write_secret;

/// Parsed contents of a bulk-load file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkFile {
    #[serde(default)]
    pub secrets: BTreeMap<String, BulkSecret>,
}

/// One secret to write.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSecret {
    pub key: String,
    #[serde(default)]
    pub data: SecretData,
    #[serde(default)]
    pub secret_type: Option<String>,
    #[serde(default)]
    pub kv_version: Option<String>,
}

impl BulkSecret {
    /// The resolution hint this entry carries, if complete.
    pub fn hint(&self) -> KeyHint {
        self.secret_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .and_then(|t| SecretEngine::from_parts(t, self.kv_version.as_deref()))
            .map_or(KeyHint::Unknown, KeyHint::Known)
    }
}

/// A secret that could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretFailure {
    pub secret_key: String,
    pub error: String,
}

/// Result of a bulk load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Entry names that were written.
    pub written: Vec<String>,
    pub failures: Vec<SecretFailure>,
}

/// Read and parse a bulk-load file.
pub fn load_bulk_file(path: &Path) -> Result<BulkFile> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| VaultUtilError::Serialization(format!("{}: {e}", path.display())))
}

/// Resolve and write every secret in `file`, in entry-name order.
pub fn load_secrets(backend: &dyn SecretBackend, file: &BulkFile) -> BulkOutcome {
    let mut outcome = BulkOutcome::default();

    for (name, secret) in &file.secrets {
        debug!(%name, key = %secret.key, "loading secret");
        let written = resolve(backend, &secret.key, secret.hint())
            .and_then(|address| write_secret(backend, &address, &secret.data));

        match written {
            Ok(()) => {
                info!(%name, "secret created/updated");
                outcome.written.push(name.clone());
            }
            Err(e) => {
                warn!(%name, error = %e, "failed to write secret");
                outcome.failures.push(SecretFailure {
                    secret_key: secret.key.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::backend::MemoryBackend;
    use crate::engine::mount::KvVersion;

    fn parse(raw: &str) -> BulkFile {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn parses_file_from_disk() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(
            file,
            r#"{{"secrets": {{"db": {{"key": "secret/db", "data": {{"user": "app"}}}}}}}}"#
        )
        .unwrap();

        let bulk = load_bulk_file(file.path()).unwrap();
        assert_eq!(bulk.secrets["db"].key, "secret/db");
        assert_eq!(bulk.secrets["db"].data["user"], json!("app"));
    }

    #[test]
    fn invalid_json_is_a_serialization_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(
            load_bulk_file(file.path()),
            Err(VaultUtilError::Serialization(_))
        ));
    }

    #[test]
    fn hint_requires_complete_kv_information() {
        let bulk = parse(
            r#"{"secrets": {
                "full": {"key": "a/b", "secretType": "kv", "kvVersion": "2"},
                "partial": {"key": "a/b", "secretType": "kv"},
                "other": {"key": "a/b", "secretType": "transit"},
                "none": {"key": "a/b", "secretType": ""}
            }}"#,
        );
        assert_eq!(
            bulk.secrets["full"].hint(),
            KeyHint::Known(SecretEngine::Kv(KvVersion::V2))
        );
        assert_eq!(bulk.secrets["partial"].hint(), KeyHint::Unknown);
        assert_eq!(
            bulk.secrets["other"].hint(),
            KeyHint::Known(SecretEngine::Other("transit".into()))
        );
        assert_eq!(bulk.secrets["none"].hint(), KeyHint::Unknown);
    }

    #[test]
    fn failures_do_not_stop_the_load() {
        let backend = MemoryBackend::new().with_kv_mount("secret/", KvVersion::V2);
        let bulk = parse(
            r#"{"secrets": {
                "a-good": {"key": "secret/app/one", "data": {"v": "1"}},
                "b-badkey": {"key": "flat", "data": {"v": "2"}},
                "c-nomount": {"key": "missing/app", "data": {"v": "3"}},
                "d-good": {"key": "secret/app/two", "data": {"v": "4"}}
            }}"#,
        );

        let outcome = load_secrets(&backend, &bulk);
        assert_eq!(outcome.written, vec!["a-good", "d-good"]);
        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(outcome.failures[0].secret_key, "flat");
        assert!(outcome.failures[1].error.contains("missing/"));
        assert_eq!(backend.secret("secret/app/two").unwrap()["v"], json!("4"));
    }
}
