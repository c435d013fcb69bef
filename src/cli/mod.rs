//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod machine;
pub mod output;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing::debug;
use zeroize::Zeroizing;

use crate::backend::HttpBackend;
use crate::config::{Settings, VaultInstance};
use crate::errors::{Result, VaultUtilError};

/// vault-util: manage secrets in HashiCorp Vault KV mounts.
#[derive(Parser)]
#[command(
    name = "vault-util",
    about = "Read, write and list secrets in HashiCorp Vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Colorize console output
    #[arg(long, global = true, default_value_t = true, action = ArgAction::Set)]
    pub colorize: bool,

    /// Print one JSON document instead of console output
    #[arg(short, long, global = true)]
    pub machine_output: bool,

    /// Saved vault to use (see `add-vault`)
    #[arg(long, global = true)]
    pub vault_name: Option<String>,

    /// Vault server URL
    #[arg(long, global = true, env = "VAULT_ADDR")]
    pub vault_url: Option<String>,

    /// Vault token
    #[arg(long, global = true, env = "VAULT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub skip_tls_verify: bool,

    /// PEM certificate presented to the vault server
    #[arg(long, global = true)]
    pub ca_cert_file: Option<PathBuf>,

    /// PEM private key for --ca-cert-file
    #[arg(long, global = true)]
    pub ca_key_file: Option<PathBuf>,

    /// Settings file (default: ~/.vault-util-settings.json)
    #[arg(long, global = true, env = "VAULT_UTIL_SETTINGS_FILE")]
    pub settings_file: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Save a vault connection under --vault-name
    AddVault,

    /// Remove a saved vault connection
    DeleteVault {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List saved vault connections
    ListVaults,

    /// List secret mounts on the vault
    ListMounts {
        /// Show type, version and description for each mount
        #[arg(long)]
        detail: bool,
    },

    /// List every secret under a KV mount
    ListSecrets {
        /// Mount to walk (e.g. secret/)
        #[arg(long)]
        secret_mount: String,
    },

    /// Read one secret
    GetSecret {
        /// Secret key: <mount>/<path>
        #[arg(long)]
        secret_key: String,
    },

    /// Write every secret described in a JSON file
    BulkLoad {
        /// Path to the secrets file
        #[arg(long)]
        secrets_file: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Settings file path: `--settings-file` if given, else the home default.
pub fn settings_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.settings_file {
        Some(path) => Ok(path.clone()),
        None => Settings::default_path(),
    }
}

/// The `--vault-name` value, for commands that require it.
pub fn require_vault_name(cli: &Cli) -> Result<&str> {
    cli.vault_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| VaultUtilError::CommandFailed("--vault-name is required".into()))
}

/// Build a vault instance from the ad-hoc connection flags.
///
/// `token` overrides `--token` when given (used after prompting).
pub fn instance_from_flags(cli: &Cli, token: Option<&str>) -> Result<VaultInstance> {
    let url = cli.vault_url.as_deref().unwrap_or_default();
    let token = token.or(cli.token.as_deref()).unwrap_or_default();
    VaultInstance::new(
        url,
        token,
        cli.skip_tls_verify,
        cli.ca_cert_file.as_deref(),
        cli.ca_key_file.as_deref(),
    )
}

/// Resolve the vault connection for a command.
///
/// `--vault-name` selects a saved vault; otherwise the URL, token and TLS
/// flags describe one directly.
pub fn connection(cli: &Cli) -> Result<VaultInstance> {
    match cli.vault_name.as_deref() {
        Some(name) => {
            let path = settings_path(cli)?;
            debug!(vault = %name, settings = %path.display(), "using saved vault");
            let settings = Settings::load(&path)?;
            Ok(settings.vault(name)?.clone())
        }
        None => {
            debug!("using vault connection flags");
            instance_from_flags(cli, None)
        }
    }
}

/// Open an HTTP backend for the selected vault.
pub fn connect(cli: &Cli) -> Result<HttpBackend> {
    HttpBackend::connect(&connection(cli)?)
}

/// Ask for a vault token, if stdin is a terminal and console output is on.
///
/// Returns `Zeroizing<String>` so the token is wiped from memory on drop.
pub fn prompt_token(cli: &Cli) -> Result<Option<Zeroizing<String>>> {
    if cli.machine_output || !std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let token = dialoguer::Password::new()
        .with_prompt("Vault token")
        .interact()
        .map_err(|e| VaultUtilError::CommandFailed(format!("token prompt: {e}")))?;
    Ok(Some(Zeroizing::new(token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["vault-util"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn completions_shell_is_parsed_by_clap() {
        let cli = parse(&["completions", "zsh"]);
        assert!(matches!(
            cli.command,
            Commands::Completions {
                shell: clap_complete::Shell::Zsh
            }
        ));

        let err = Cli::try_parse_from(["vault-util", "completions", "csh"]).err().expect("csh is not a supported shell");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn colorize_defaults_to_true() {
        let cli = parse(&["list-vaults"]);
        assert!(cli.colorize);
        let cli = parse(&["list-vaults", "--colorize", "false"]);
        assert!(!cli.colorize);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["get-secret", "--secret-key", "secret/app", "-m", "-d"]);
        assert!(cli.machine_output);
        assert!(cli.debug);
        assert!(matches!(
            cli.command,
            Commands::GetSecret { ref secret_key } if secret_key == "secret/app"
        ));
    }

    #[test]
    fn require_vault_name_errors_when_absent() {
        let cli = parse(&["add-vault"]);
        assert!(require_vault_name(&cli).is_err());
        let cli = parse(&["add-vault", "--vault-name", "dev"]);
        assert_eq!(require_vault_name(&cli).unwrap(), "dev");
    }

    #[test]
    fn explicit_settings_file_wins() {
        let cli = parse(&["list-vaults", "--settings-file", "/tmp/s.json"]);
        assert_eq!(settings_path(&cli).unwrap(), PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn flags_connection_requires_url() {
        let mut cli = parse(&["list-mounts", "--token", "t"]);
        cli.vault_url = None;
        let err = connection(&cli).unwrap_err();
        assert_eq!(err.exit_code(), 150);
    }

    #[test]
    fn prompted_token_overrides_flag() {
        let cli = parse(&["add-vault", "--vault-url", "https://v:8200", "--token", "flag"]);
        let instance = instance_from_flags(&cli, Some("prompted")).unwrap();
        assert_eq!(instance.token, "prompted");
    }

    #[test]
    fn saved_vault_requires_settings_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("none.json");
        let cli = parse(&[
            "list-mounts",
            "--vault-name",
            "dev",
            "--settings-file",
            missing.to_str().unwrap(),
        ]);
        assert_eq!(connection(&cli).unwrap_err().exit_code(), 200);
    }
}
