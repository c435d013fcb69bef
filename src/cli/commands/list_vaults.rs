//! `vault-util list-vaults` — show saved vault connections.

use serde::Serialize;

use crate::cli::machine::{emit, Report};
use crate::cli::{output, settings_path, Cli};
use crate::config::Settings;
use crate::errors::Result;

#[derive(Debug, Serialize)]
pub struct VaultList {
    pub vaults: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Report for VaultList {
    fn print_console(&self) {
        if let Some(message) = &self.message {
            output::info(message);
            output::tip("Run `vault-util add-vault --vault-name <NAME>` to save one.");
            return;
        }
        if self.vaults.is_empty() {
            output::info("No vaults configured.");
            return;
        }
        output::info(&format!("{} vault(s) configured", self.vaults.len()));
        output::print_list(&self.vaults);
    }
}

/// Execute the `list-vaults` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let path = settings_path(cli)?;

    let report = if Settings::exists(&path) {
        VaultList {
            vaults: Settings::load(&path)?.vault_names(),
            message: None,
        }
    } else {
        VaultList {
            vaults: Vec::new(),
            message: Some(format!(
                "No settings file at {}, no vaults configured",
                path.display()
            )),
        }
    };

    emit(cli, &report)
}
