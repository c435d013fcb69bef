//! `vault-util get-secret` — read one secret.

use serde::Serialize;
use tracing::info;

use crate::backend::SecretData;
use crate::cli::machine::{emit, Report};
use crate::cli::{connect, output, Cli};
use crate::engine::{lookup_secret, resolve, KeyHint};
use crate::errors::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretReport {
    pub secret_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_data: Option<SecretData>,
    #[serde(skip)]
    requested_key: String,
}

impl Report for SecretReport {
    fn print_console(&self) {
        match &self.secret_data {
            Some(data) if self.secret_exists => {
                output::info(&format!("Secret {}", self.requested_key));
                output::print_secret_table(data);
            }
            _ => output::warning(&format!("Secret {} does not exist", self.requested_key)),
        }
    }
}

/// Execute the `get-secret` command.
pub fn execute(cli: &Cli, secret_key: &str) -> Result<()> {
    let backend = connect(cli)?;
    let address = resolve(&backend, secret_key, KeyHint::Unknown)?;

    let report = if let Some(data) = lookup_secret(&backend, &address)? {
        info!(key = %secret_key, fields = data.len(), "secret read");
        SecretReport {
            secret_exists: true,
            secret_key: Some(secret_key.to_string()),
            secret_data: Some(data),
            requested_key: secret_key.to_string(),
        }
    } else {
        info!(key = %secret_key, "secret does not exist");
        SecretReport {
            secret_exists: false,
            secret_key: None,
            secret_data: None,
            requested_key: secret_key.to_string(),
        }
    };

    emit(cli, &report)
}
