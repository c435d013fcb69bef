use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Result, VaultUtilError};

/// Connection details for one Vault server.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultInstance {
    pub url: String,
    pub token: String,
    #[serde(default)]
    pub skip_tls_verify: bool,
    /// PEM certificate presented to the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<String>,
    /// PEM private key matching `ca_cert`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert_key: Option<String>,
}

impl std::fmt::Debug for VaultInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultInstance")
            .field("url", &self.url)
            .field("skip_tls_verify", &self.skip_tls_verify)
            .field("ca_cert", &self.ca_cert.is_some())
            .finish_non_exhaustive()
    }
}

impl VaultInstance {
    /// Create a vault instance, reading certificate files if both are given.
    pub fn new(
        url: &str,
        token: &str,
        skip_tls_verify: bool,
        cert_file: Option<&Path>,
        key_file: Option<&Path>,
    ) -> Result<Self> {
        if url.is_empty() {
            return Err(VaultUtilError::InvalidConnection("vault url is empty".into()));
        }
        if token.is_empty() {
            return Err(VaultUtilError::InvalidConnection("vault token is empty".into()));
        }

        let mut instance = Self {
            url: url.to_string(),
            token: token.to_string(),
            skip_tls_verify,
            ca_cert: None,
            ca_cert_key: None,
        };

        match (cert_file, key_file) {
            (Some(cert), Some(key)) => {
                debug!(cert = %cert.display(), key = %key.display(), "reading certificate files");
                instance.ca_cert = Some(read_pem(cert, "certificate")?);
                instance.ca_cert_key = Some(read_pem(key, "certificate key")?);
            }
            _ => debug!("certificate file or key not given, skipping"),
        }

        Ok(instance)
    }
}

fn read_pem(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        VaultUtilError::InvalidConnection(format!("cannot read {what} {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn new_vault_without_certs() {
        let vault = VaultInstance::new("https://testvault.com", "faketoken", true, None, None)
            .unwrap();
        assert_eq!(vault.url, "https://testvault.com");
        assert_eq!(vault.token, "faketoken");
        assert!(vault.skip_tls_verify);
        assert_eq!(vault.ca_cert, None);
        assert_eq!(vault.ca_cert_key, None);
    }

    #[test]
    fn empty_url_or_token_rejected() {
        assert!(VaultInstance::new("", "faketoken", false, None, None).is_err());
        let err = VaultInstance::new("https://testvault.com", "", false, None, None).unwrap_err();
        assert_eq!(err.exit_code(), 150);
    }

    #[test]
    fn reads_cert_and_key_contents() {
        let tmp = TempDir::new().unwrap();
        let cert = tmp.path().join("test-ca-cert");
        let key = tmp.path().join("test-ca-key");
        fs::write(&cert, "testcertcontent").unwrap();
        fs::write(&key, "testkeycontent").unwrap();

        let vault =
            VaultInstance::new("https://testvault.com", "faketoken", false, Some(&cert), Some(&key))
                .unwrap();
        assert!(!vault.skip_tls_verify);
        assert_eq!(vault.ca_cert.as_deref(), Some("testcertcontent"));
        assert_eq!(vault.ca_cert_key.as_deref(), Some("testkeycontent"));
    }

    #[test]
    fn cert_without_key_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let cert = tmp.path().join("test-ca-cert");
        fs::write(&cert, "testcertcontent").unwrap();

        let vault =
            VaultInstance::new("https://testvault.com", "faketoken", false, Some(&cert), None)
                .unwrap();
        assert_eq!(vault.ca_cert, None);
    }

    #[test]
    fn missing_cert_file_fails() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        let result =
            VaultInstance::new("https://x", "t", false, Some(&missing), Some(&missing));
        assert!(matches!(result, Err(VaultUtilError::InvalidConnection(_))));
    }

    #[test]
    fn debug_output_hides_token() {
        let vault = VaultInstance::new("https://x", "s.supersecret", false, None, None).unwrap();
        assert!(!format!("{vault:?}").contains("supersecret"));
    }
}
