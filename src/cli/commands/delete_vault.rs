//! `vault-util delete-vault` — remove a saved vault connection.

use std::io::IsTerminal;

use dialoguer::Confirm;
use tracing::info;

use crate::cli::commands::MessageReport;
use crate::cli::machine::emit;
use crate::cli::{output, require_vault_name, settings_path, Cli};
use crate::config::Settings;
use crate::errors::{Result, VaultUtilError};

/// Execute the `delete-vault` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let name = require_vault_name(cli)?;
    let path = settings_path(cli)?;

    if !Settings::exists(&path) {
        info!(path = %path.display(), "no settings file, nothing to delete");
        return emit(
            cli,
            &MessageReport {
                message: "No settings file present, nothing to delete".into(),
            },
        );
    }

    let mut settings = Settings::load(&path)?;
    if !settings.vaults.contains_key(name) {
        return emit(
            cli,
            &MessageReport {
                message: format!("Vault '{name}' is not configured, nothing to delete"),
            },
        );
    }

    // Only ask when someone is there to answer.
    let interactive = !cli.machine_output && std::io::stdin().is_terminal();
    if !force && interactive {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete saved vault '{name}'?"))
            .default(false)
            .interact()
            .map_err(|e| VaultUtilError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    settings.delete_vault(name);
    settings.save(&path)?;
    info!(vault = %name, "vault removed from settings");

    emit(
        cli,
        &MessageReport {
            message: format!("Vault '{name}' deleted"),
        },
    )
}
