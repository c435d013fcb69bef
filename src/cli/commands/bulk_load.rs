//! `vault-util bulk-load` — write every secret in a JSON file.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::cli::machine::{emit, Report};
use crate::cli::{connect, output, Cli};
use crate::engine::{load_bulk_file, load_secrets, BulkOutcome, SecretFailure};
use crate::errors::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReport {
    pub secrets_added: Vec<String>,
    pub errors: Vec<SecretFailure>,
}

impl From<BulkOutcome> for BulkReport {
    fn from(outcome: BulkOutcome) -> Self {
        Self {
            secrets_added: outcome.written,
            errors: outcome.failures,
        }
    }
}

impl Report for BulkReport {
    fn print_console(&self) {
        output::success(&format!(
            "{} secret(s) added/updated",
            self.secrets_added.len()
        ));
        output::print_list(&self.secrets_added);

        if !self.errors.is_empty() {
            output::warning(&format!("{} secret(s) had errors", self.errors.len()));
            for failure in &self.errors {
                output::warning(&format!("{}: {}", failure.secret_key, failure.error));
            }
        }
    }
}

/// Execute the `bulk-load` command.
pub fn execute(cli: &Cli, secrets_file: &Path) -> Result<()> {
    // Parse the file before connecting so a bad file fails fast.
    let file = load_bulk_file(secrets_file)?;
    info!(path = %secrets_file.display(), count = file.secrets.len(), "secrets file read");

    let backend = connect(cli)?;
    let report = BulkReport::from(load_secrets(&backend, &file));

    emit(cli, &report)
}
