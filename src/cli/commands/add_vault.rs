//! `vault-util add-vault` — save a vault connection to the settings file.

use tracing::info;

use crate::cli::commands::MessageReport;
use crate::cli::machine::emit;
use crate::cli::{instance_from_flags, prompt_token, require_vault_name, settings_path, Cli};
use crate::config::Settings;
use crate::errors::Result;

/// Execute the `add-vault` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let name = require_vault_name(cli)?;

    let prompted = match cli.token.as_deref() {
        Some(token) if !token.is_empty() => None,
        _ => prompt_token(cli)?,
    };
    let instance = instance_from_flags(cli, prompted.as_deref().map(String::as_str))?;

    let path = settings_path(cli)?;
    let mut settings = Settings::load_or_default(&path)?;
    let replaced = settings.add_vault(name, instance);
    settings.save(&path)?;

    info!(vault = %name, path = %path.display(), replaced, "vault saved to settings");

    let verb = if replaced { "updated" } else { "added" };
    emit(
        cli,
        &MessageReport {
            message: format!("Vault '{name}' {verb} in {}", path.display()),
        },
    )
}
