//! `vault-util list-secrets` — list every secret under a KV mount.

use serde::Serialize;
use tracing::info;

use crate::cli::machine::{emit, Report};
use crate::cli::{connect, output, Cli};
use crate::engine::{lookup_mount, walk};
use crate::errors::Result;

#[derive(Debug, Serialize)]
pub struct SecretList {
    #[serde(skip)]
    pub mount: String,
    pub secrets: Vec<String>,
}

impl Report for SecretList {
    fn print_console(&self) {
        if self.secrets.is_empty() {
            output::info(&format!("No secrets under mount {}", self.mount));
            return;
        }
        output::info(&format!(
            "{} secret(s) under mount {}",
            self.secrets.len(),
            self.mount
        ));
        output::print_list(&self.secrets);
    }
}

/// Execute the `list-secrets` command.
pub fn execute(cli: &Cli, secret_mount: &str) -> Result<()> {
    let backend = connect(cli)?;
    let mount = lookup_mount(&backend, secret_mount)?;

    let mut secrets = walk(&backend, &mount)?;
    secrets.sort();
    info!(mount = %mount.name(), count = secrets.len(), "secrets listed");

    emit(
        cli,
        &SecretList {
            mount: mount.name().to_string(),
            secrets,
        },
    )
}
